use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, PostWithAuthor, User};
use crate::error::RepoError;

/// User repository.
///
/// IDs are generated by the domain layer, so creation and update are separate
/// operations rather than an upsert-style save.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user. Fails with [`RepoError::Constraint`] when the
    /// username is already taken.
    async fn insert(&self, user: User) -> Result<User, RepoError>;

    /// Find a user by their unique ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Persist a new post.
    async fn insert(&self, post: Post) -> Result<Post, RepoError>;

    /// Replace an existing post. Fails with [`RepoError::NotFound`] when the
    /// post no longer exists.
    async fn update(&self, post: Post) -> Result<Post, RepoError>;

    /// Find a post by its unique ID, without expanding the author.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// Find a post with its author expanded to `{id, username}`.
    async fn find_with_author(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError>;

    /// The most recent posts, newest first by creation time, authors expanded.
    async fn list_recent(&self, limit: u64) -> Result<Vec<PostWithAuthor>, RepoError>;
}
