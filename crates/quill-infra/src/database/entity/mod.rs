//! SeaORM entities mirroring the migration schema.

pub mod file_chunk;
pub mod post;
pub mod stored_file;
pub mod user;
