//! Authentication primitives shared between middleware and handlers.

use thiserror::Error;

use super::UserId;

/// Identity attached to a request after successful token validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

impl AuthenticatedUser {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}

/// Errors produced while authenticating a request.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer token was supplied.
    #[error("Missing bearer token")]
    MissingToken,

    /// Token was supplied but failed validation.
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}
