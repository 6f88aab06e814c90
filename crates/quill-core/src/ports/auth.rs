//! Authentication ports: session tokens and password hashing.

use uuid::Uuid;

/// Identity claims embedded in a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub username: String,
}

/// Session token service: issues and verifies signed identity tokens.
///
/// Verification is a typed result - an invalid or expired token is an error
/// value, never a panic, so protected routes can answer with a 401.
pub trait TokenService: Send + Sync {
    /// Sign a token embedding the given claims.
    fn issue(&self, claims: &TokenClaims) -> Result<String, AuthError>;

    /// Verify a token and recover the claims it embeds.
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plaintext password with a fresh salt.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a plaintext password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("No session token presented")]
    MissingToken,

    #[error("Session token expired")]
    TokenExpired,

    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("Hashing error: {0}")]
    Hashing(String),
}
