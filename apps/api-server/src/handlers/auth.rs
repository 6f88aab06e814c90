//! Registration, login, and session handlers.

use actix_web::{
    HttpResponse,
    cookie::{Cookie, SameSite},
    web,
};

use quill_core::domain::{MIN_CREDENTIAL_LEN, User};
use quill_core::error::RepoError;
use quill_core::ports::TokenClaims;
use quill_shared::dto::{LoginRequest, RegisterRequest, SessionUser, UserResponse};

use crate::middleware::auth::{Identity, SESSION_COOKIE};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

/// POST /register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.username.chars().count() < MIN_CREDENTIAL_LEN
        || req.password.chars().count() < MIN_CREDENTIAL_LEN
    {
        return Err(AppError::BadRequest(format!(
            "username and password must be at least {MIN_CREDENTIAL_LEN} characters"
        )));
    }

    let password_hash = state.passwords.hash(&req.password)?;

    let user = User::new(req.username, password_hash);
    let saved = match state.users.insert(user).await {
        Err(RepoError::Constraint(_)) => {
            return Err(AppError::BadRequest("username already taken".to_string()));
        }
        other => other?,
    };

    Ok(HttpResponse::Created().json(UserResponse {
        id: saved.id,
        username: saved.username,
        created_at: saved.created_at,
    }))
}

/// POST /login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_username(&req.username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let valid = state.passwords.verify(&req.password, &user.password_hash)?;
    if !valid {
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue(&TokenClaims {
        user_id: user.id,
        username: user.username.clone(),
    })?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(token))
        .json(SessionUser {
            id: user.id,
            username: user.username,
        }))
}

/// GET /profile - the identity bound to the session cookie.
pub async fn profile(identity: Identity) -> HttpResponse {
    HttpResponse::Ok().json(SessionUser {
        id: identity.user_id,
        username: identity.username,
    })
}

/// POST /logout
pub async fn logout() -> HttpResponse {
    // The JWT itself is stateless; clearing the cookie ends the session.
    let mut cookie = session_cookie(String::new());
    cookie.make_removal();

    HttpResponse::Ok().cookie(cookie).json("ok")
}
