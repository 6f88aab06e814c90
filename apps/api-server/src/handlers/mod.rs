//! HTTP handlers and route configuration.

mod auth;
mod files;
mod health;
mod posts;

use actix_multipart::form::MultipartFormConfig;
use actix_multipart::form::tempfile::TempFileConfig;
use actix_web::web;

use crate::config::{AppConfig, StorageBackend};

/// Configure all application routes and upload limits.
pub fn configure_routes(cfg: &mut web::ServiceConfig, config: &AppConfig) {
    cfg.app_data(TempFileConfig::default().directory(&config.storage.staging_dir))
        .app_data(MultipartFormConfig::default().total_limit(config.max_upload_bytes))
        // Public routes
        .route("/health", web::get().to(health::health_check))
        .route("/post", web::get().to(posts::list))
        .route("/post/{id}", web::get().to(posts::get))
        .route("/files/{id}", web::get().to(files::serve))
        // Account and session routes
        .route("/register", web::post().to(auth::register))
        .route("/login", web::post().to(auth::login))
        .route("/profile", web::get().to(auth::profile))
        .route("/logout", web::post().to(auth::logout))
        // Authoring routes
        .route("/post", web::post().to(posts::create))
        .route("/post", web::put().to(posts::update));

    // Local storage serves its files straight off the disk.
    if config.storage.backend == StorageBackend::Local {
        cfg.service(actix_files::Files::new(
            "/uploads",
            &config.storage.local_root,
        ));
    }
}
