//! # Quill API Server
//!
//! Actix-web HTTP server exposing the blog API: accounts and cookie
//! sessions, post publishing with cover uploads, and the public feed.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod telemetry;
