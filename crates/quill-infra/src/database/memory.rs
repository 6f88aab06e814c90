//! In-memory repositories - used as fallback when Postgres is unavailable.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Author, Post, PostWithAuthor, User};
use quill_core::error::RepoError;
use quill_core::ports::{PostRepository, UserRepository};

type SharedUsers = Arc<RwLock<HashMap<Uuid, User>>>;

/// In-memory user repository using a simple HashMap with async RwLock.
///
/// This is the fallback implementation when Postgres is not available.
/// Note: Data is lost on process restart.
pub struct InMemoryUserRepository {
    users: SharedUsers,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint("already exists".to_string()));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }
}

/// In-memory post repository.
///
/// Shares the user map of the [`InMemoryUserRepository`] it is built from,
/// so author expansion sees the same accounts.
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<Uuid, Post>>,
    users: SharedUsers,
}

impl InMemoryPostRepository {
    pub fn new(users: &InMemoryUserRepository) -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
            users: Arc::clone(&users.users),
        }
    }
}

fn author_of(user: &User) -> Author {
    Author {
        id: user.id,
        username: user.username.clone(),
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        self.posts.write().await.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;

        if !posts.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }

        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn find_with_author(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError> {
        let Some(post) = self.posts.read().await.get(&id).cloned() else {
            return Ok(None);
        };

        let users = self.users.read().await;
        Ok(users
            .get(&post.author_id)
            .map(|user| PostWithAuthor {
                author: author_of(user),
                post,
            }))
    }

    async fn list_recent(&self, limit: u64) -> Result<Vec<PostWithAuthor>, RepoError> {
        let posts = self.posts.read().await;
        let users = self.users.read().await;

        let mut feed: Vec<PostWithAuthor> = posts
            .values()
            .filter_map(|post| {
                users.get(&post.author_id).map(|user| PostWithAuthor {
                    post: post.clone(),
                    author: author_of(user),
                })
            })
            .collect();

        feed.sort_by(|a, b| b.post.created_at.cmp(&a.post.created_at));
        feed.truncate(limit as usize);

        Ok(feed)
    }
}
