//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! SeaORM repositories, JWT and Argon2 authentication services, and the
//! pluggable upload storage backends.

pub mod auth;
pub mod database;
pub mod storage;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{
    DatabaseConfig, InMemoryPostRepository, InMemoryUserRepository, PostgresPostRepository,
    PostgresUserRepository,
};
pub use storage::{DbFileStore, LocalFileStore, RemoteFileStore, RemoteStorageConfig};
