//! Authentication middleware and extractors.

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use std::future::{Ready, ready};

use quill_core::ports::AuthError;
use quill_shared::ProblemDetails;

use crate::state::AppState;

/// Name of the session cookie carrying the JWT.
pub const SESSION_COOKIE: &str = "token";

/// Authenticated user identity extractor.
///
/// Use this in handlers to require a live session:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub username: String,
}

/// Error type for authentication failures.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match &self.0 {
            AuthError::Hashing(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
            _ => actix_web::http::StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        let error = match &self.0 {
            AuthError::TokenExpired => ProblemDetails::new(401, "Token Expired")
                .with_detail("Your session has expired. Please log in again."),
            AuthError::InvalidToken(msg) => {
                ProblemDetails::new(401, "Invalid Token").with_detail(msg.clone())
            }
            AuthError::MissingToken => ProblemDetails::new(401, "Authentication Required")
                .with_detail("Log in to receive a session cookie."),
            AuthError::Hashing(_) => ProblemDetails::internal_error(),
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = match req.app_data::<web::Data<AppState>>() {
            Some(state) => state,
            None => {
                tracing::error!("AppState not found in app data");
                return ready(Err(AuthenticationError(AuthError::InvalidToken(
                    "Server configuration error".to_string(),
                ))));
            }
        };

        // The session rides in a cookie, not an Authorization header.
        let cookie = match req.cookie(SESSION_COOKIE) {
            Some(cookie) => cookie,
            None => return ready(Err(AuthenticationError(AuthError::MissingToken))),
        };

        match state.tokens.verify(cookie.value()) {
            Ok(claims) => ready(Ok(Identity {
                user_id: claims.user_id,
                username: claims.username,
            })),
            Err(e) => ready(Err(AuthenticationError(e))),
        }
    }
}
