//! Stored file serving.
//!
//! Only the database backend holds file bytes itself; its references point
//! here. Local files are served by the static mount and remote files by
//! their public URL, so those backends answer 404.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /files/{id}
pub async fn serve(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let data = state
        .files
        .load(id)
        .await?
        .ok_or_else(|| AppError::NotFound("file not found".to_string()))?;

    let mut response = HttpResponse::Ok();
    if let Some(content_type) = data.content_type.as_deref() {
        response.content_type(content_type);
    }

    Ok(response.body(data.bytes))
}
