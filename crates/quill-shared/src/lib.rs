//! # Quill Shared
//!
//! Wire-level types shared between the API server and Rust clients.
//! Everything here is plain serde data; no server-side logic.

pub mod dto;
pub mod response;

pub use response::ProblemDetails;
