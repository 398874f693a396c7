//! Domain service for accounts and subscriptions.
//!
//! Handles registration, profile reads, password changes, and following
//! other authors.

use thiserror::Error;

use crate::api::types::{RegisteredUserDto, UserDto, UserWithRecipesDto};
use crate::api::validation::ValidationErrors;
use crate::models::user::NewUser;
use crate::models::{PageRequest, Paged};

/// Errors specific to user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User {0} not found")]
    NotFound(i32),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Already subscribed to user {0}")]
    AlreadySubscribed(i32),

    #[error("Cannot subscribe to yourself")]
    SelfSubscription,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

impl From<ValidationErrors> for UserError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Domain service trait for users.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::Validation`] when the email or username is taken.
    async fn register(&self, user: NewUser) -> Result<RegisteredUserDto, UserError>;

    async fn list(
        &self,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<Paged<UserDto>, UserError>;

    async fn get(&self, id: i32, viewer: Option<i32>) -> Result<UserDto, UserError>;

    /// Changes a user's password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::Validation`] if the current password is wrong or
    /// the new one is too weak.
    async fn set_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), UserError>;

    /// Follows `author_id` and returns the author with a recipe preview.
    async fn subscribe(
        &self,
        subscriber_id: i32,
        author_id: i32,
        recipes_limit: Option<usize>,
    ) -> Result<UserWithRecipesDto, UserError>;

    async fn unsubscribe(&self, subscriber_id: i32, author_id: i32) -> Result<(), UserError>;

    /// Authors followed by `subscriber_id`.
    async fn subscriptions(
        &self,
        subscriber_id: i32,
        page: PageRequest,
        recipes_limit: Option<usize>,
    ) -> Result<Paged<UserWithRecipesDto>, UserError>;
}
