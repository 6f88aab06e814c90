//! Application state - shared across all handlers.

use std::sync::Arc;

use anyhow::Context;

use quill_core::ports::{FileStore, PasswordService, PostRepository, TokenService, UserRepository};
use quill_infra::auth::{Argon2PasswordService, JwtTokenService};
use quill_infra::database::{
    self, InMemoryPostRepository, InMemoryUserRepository, PostgresPostRepository,
    PostgresUserRepository,
};
use quill_infra::storage::{DbFileStore, LocalFileStore, RemoteFileStore};

use crate::config::{AppConfig, StorageBackend};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub files: Arc<dyn FileStore>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// Repositories fall back to in-memory mode when no database is
    /// configured or reachable; the database storage backend cannot, since
    /// it has nowhere else to put the bytes.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let db = match config.database.as_ref() {
            Some(db_config) => match database::connect(db_config).await {
                Ok(conn) => Some(conn),
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    None
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                None
            }
        };

        let (users, posts): (Arc<dyn UserRepository>, Arc<dyn PostRepository>) = match &db {
            Some(conn) => (
                Arc::new(PostgresUserRepository::new(conn.clone())),
                Arc::new(PostgresPostRepository::new(conn.clone())),
            ),
            None => {
                let users = InMemoryUserRepository::new();
                let posts = InMemoryPostRepository::new(&users);
                (Arc::new(users), Arc::new(posts))
            }
        };

        std::fs::create_dir_all(&config.storage.staging_dir)
            .context("creating upload staging directory")?;

        let files: Arc<dyn FileStore> = match config.storage.backend {
            StorageBackend::Local => {
                // The static /uploads mount resolves this directory when the
                // server starts, so it has to exist up front.
                std::fs::create_dir_all(&config.storage.local_root)
                    .context("creating upload directory")?;
                Arc::new(LocalFileStore::new(config.storage.local_root.clone()))
            }
            StorageBackend::Remote => {
                let remote = config
                    .storage
                    .remote
                    .clone()
                    .context("STORAGE_BACKEND=remote requires the OBJECT_STORE_* variables")?;
                Arc::new(RemoteFileStore::new(remote))
            }
            StorageBackend::Database => {
                let conn = db
                    .clone()
                    .context("STORAGE_BACKEND=database requires a reachable DATABASE_URL")?;
                Arc::new(DbFileStore::new(conn))
            }
        };

        tracing::info!("Application state initialized");

        Ok(Self {
            users,
            posts,
            files,
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            passwords: Arc::new(Argon2PasswordService::new()),
        })
    }
}
