//! Domain entities - the core business objects.

mod post;
mod user;

pub use post::{Author, Post, PostChanges, PostWithAuthor};
pub use user::{MIN_CREDENTIAL_LEN, User};
