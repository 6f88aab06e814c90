use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a published article.
///
/// `cover`, when present, is the stored-file reference minted by whichever
/// upload backend was active when the file was ingested (a relative path, a
/// public URL, or a `files/<id>` blob reference). It is opaque to the
/// repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub cover: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post with generated ID and timestamps.
    pub fn new(
        author_id: Uuid,
        title: String,
        summary: String,
        content: String,
        cover: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            summary,
            content,
            cover,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an edit to this post.
    ///
    /// Text fields are replaced only when provided non-empty; the cover is
    /// replaced only when the edit carried a newly stored file. Everything
    /// else, including the prior cover, is preserved.
    pub fn apply(&mut self, changes: PostChanges) {
        if let Some(title) = changes.title.filter(|t| !t.is_empty()) {
            self.title = title;
        }
        if let Some(summary) = changes.summary.filter(|s| !s.is_empty()) {
            self.summary = summary;
        }
        if let Some(content) = changes.content.filter(|c| !c.is_empty()) {
            self.content = content;
        }
        if let Some(cover) = changes.cover {
            self.cover = Some(cover);
        }
        self.updated_at = Utc::now();
    }
}

/// Field replacements carried by an edit request.
///
/// `cover` must only be set when a new file was stored for this edit.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub cover: Option<String>,
}

/// The public slice of a post's author: identity and display name only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub username: String,
}

/// A post joined with its author, as returned by listing and lookup queries.
#[derive(Debug, Clone)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: Author,
}
