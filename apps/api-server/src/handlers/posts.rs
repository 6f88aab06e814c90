//! Post authoring and feed handlers.

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::{Author, Post, PostChanges};
use quill_core::error::RepoError;
use quill_core::ports::StagedUpload;
use quill_shared::dto::{PostAuthor, PostResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// The feed never returns more than this many posts.
const FEED_LIMIT: u64 = 20;

/// Multipart form shared by post creation and editing. `id` is required for
/// edits only; `file` is the cover image, required when creating and
/// optional when editing.
#[derive(Debug, MultipartForm)]
pub struct PostForm {
    pub id: Option<Text<Uuid>>,
    pub title: Text<String>,
    pub summary: Text<String>,
    pub content: Text<String>,
    pub file: Option<TempFile>,
}

/// Hand the spooled temp file over to upload staging. The temp file stops
/// deleting itself; the staged upload cleans up from here on.
fn stage(file: TempFile) -> Result<StagedUpload, AppError> {
    let original_filename = file.file_name.clone().unwrap_or_default();
    let content_type = file.content_type.as_ref().map(|m| m.to_string());

    let path = file
        .file
        .into_temp_path()
        .keep()
        .map_err(|e| AppError::Internal(format!("failed to keep staged upload: {e}")))?;

    Ok(StagedUpload::new(path, original_filename, content_type))
}

fn author_dto(author: Author) -> PostAuthor {
    PostAuthor {
        id: author.id,
        username: author.username,
    }
}

fn post_response(post: Post, author: PostAuthor) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        summary: post.summary,
        content: post.content,
        cover: post.cover,
        author,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

/// POST /post - publish a new post with its cover image.
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    MultipartForm(form): MultipartForm<PostForm>,
) -> AppResult<HttpResponse> {
    let title = form.title.into_inner();
    let summary = form.summary.into_inner();
    let content = form.content.into_inner();

    if title.is_empty() || summary.is_empty() || content.is_empty() {
        return Err(AppError::BadRequest(
            "title, summary and content are required".to_string(),
        ));
    }

    let Some(file) = form.file else {
        return Err(AppError::BadRequest("a cover file is required".to_string()));
    };

    let cover = state.files.store(stage(file)?).await?.into_inner();

    let post = Post::new(identity.user_id, title, summary, content, Some(cover));
    let saved = state.posts.insert(post).await?;

    let author = PostAuthor {
        id: identity.user_id,
        username: identity.username,
    };
    Ok(HttpResponse::Created().json(post_response(saved, author)))
}

/// PUT /post - edit an existing post. Any live session may edit any post;
/// fields arrive alongside an optional replacement cover.
pub async fn update(
    state: web::Data<AppState>,
    _identity: Identity,
    MultipartForm(form): MultipartForm<PostForm>,
) -> AppResult<HttpResponse> {
    let id = form
        .id
        .ok_or_else(|| AppError::BadRequest("missing post id".to_string()))?
        .into_inner();

    let existing = state
        .posts
        .find_with_author(id)
        .await?
        .ok_or_else(|| AppError::BadRequest("post not found".to_string()))?;

    let cover = match form.file {
        Some(file) => Some(state.files.store(stage(file)?).await?.into_inner()),
        None => None,
    };

    let mut post = existing.post;
    post.apply(PostChanges {
        title: Some(form.title.into_inner()),
        summary: Some(form.summary.into_inner()),
        content: Some(form.content.into_inner()),
        cover,
    });

    let saved = match state.posts.update(post).await {
        Err(RepoError::NotFound) => {
            return Err(AppError::BadRequest("post not found".to_string()));
        }
        other => other?,
    };

    Ok(HttpResponse::Ok().json(post_response(saved, author_dto(existing.author))))
}

/// GET /post - the public feed, newest first.
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let feed = state.posts.list_recent(FEED_LIMIT).await?;

    let body: Vec<PostResponse> = feed
        .into_iter()
        .map(|row| post_response(row.post, author_dto(row.author)))
        .collect();

    Ok(HttpResponse::Ok().json(body))
}

/// GET /post/{id} - a single post with its author expanded.
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let found = state
        .posts
        .find_with_author(id)
        .await?
        .ok_or_else(|| AppError::NotFound("post not found".to_string()))?;

    Ok(HttpResponse::Ok().json(post_response(found.post, author_dto(found.author))))
}
