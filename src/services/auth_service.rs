//! Domain service for token authentication.
//!
//! Handles login, logout, and resolving a request token to its user.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Unable to log in with provided credentials.")]
    InvalidCredentials,

    #[error("Invalid token.")]
    InvalidToken,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// The account a request is acting as.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i32,
    pub username: String,
    pub email: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and returns the user's token, issuing one if needed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, email: &str, password: &str) -> Result<String, AuthError>;

    /// Revokes the user's token.
    async fn logout(&self, user_id: i32) -> Result<(), AuthError>;

    /// Resolves a token to its user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] for unknown keys.
    async fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError>;
}
