//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use quill_infra::{JwtConfig, RemoteStorageConfig};
use quill_infra::database::DatabaseConfig;

/// Which backend persists uploaded files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    Remote,
    Database,
}

/// Upload storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Where in-flight uploads are spooled before a backend consumes them.
    pub staging_dir: PathBuf,
    /// Where the local backend keeps stored files.
    pub local_root: PathBuf,
    pub remote: Option<RemoteStorageConfig>,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    pub database: Option<DatabaseConfig>,
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            database,
            storage: Self::storage_from_env(),
            jwt: Self::jwt_from_env(),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10 * 1024 * 1024),
        }
    }

    fn jwt_from_env() -> JwtConfig {
        let defaults = JwtConfig::default();

        let secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            let is_production = env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!(
                    "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
            }
            defaults.secret.clone()
        });

        JwtConfig {
            secret,
            issuer: env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            ttl_hours: env::var("JWT_TTL_HOURS").ok().and_then(|s| s.parse().ok()),
        }
    }

    /// Parse storage settings from environment.
    ///
    /// An unknown `STORAGE_BACKEND`, or `remote` without the object store
    /// variables, falls back to local storage with a warning rather than
    /// refusing to boot.
    fn storage_from_env() -> StorageConfig {
        let mut backend = match env::var("STORAGE_BACKEND").as_deref() {
            Ok("local") | Err(_) => StorageBackend::Local,
            Ok("remote") => StorageBackend::Remote,
            Ok("database") => StorageBackend::Database,
            Ok(other) => {
                tracing::warn!(backend = other, "Unknown STORAGE_BACKEND, defaulting to local");
                StorageBackend::Local
            }
        };

        let remote = match (
            env::var("OBJECT_STORE_ENDPOINT"),
            env::var("OBJECT_STORE_API_KEY"),
            env::var("OBJECT_STORE_PUBLIC_URL"),
        ) {
            (Ok(endpoint), Ok(api_key), Ok(public_base_url)) => Some(RemoteStorageConfig {
                endpoint,
                api_key,
                public_base_url,
            }),
            _ => None,
        };

        if backend == StorageBackend::Remote && remote.is_none() {
            tracing::warn!(
                "STORAGE_BACKEND=remote but OBJECT_STORE_* variables are missing, defaulting to local"
            );
            backend = StorageBackend::Local;
        }

        StorageConfig {
            backend,
            staging_dir: env::var("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/staging")),
            local_root: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/uploads")),
            remote,
        }
    }
}
