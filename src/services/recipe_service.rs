//! Domain service for recipes and the per-user recipe lists.
//!
//! Covers recipe CRUD with author-only mutation, favorites and shopping cart
//! membership, and the aggregated shopping list download.

use thiserror::Error;

use super::image::ImageError;
use crate::api::types::{RecipeDto, RecipeShortDto};
use crate::api::validation::ValidationErrors;
use crate::models::recipe::{RecipeFilter, RecipeInput, RecipeList};
use crate::models::{PageRequest, Paged};

/// Errors specific to recipe operations.
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("Recipe {0} not found")]
    NotFound(i32),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Only the author may modify recipe {0}")]
    NotAuthor(i32),

    #[error("Recipe {recipe_id} is already in {list}")]
    AlreadyInList { list: RecipeList, recipe_id: i32 },

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for RecipeError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for RecipeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

impl From<ValidationErrors> for RecipeError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Domain service trait for recipes.
#[async_trait::async_trait]
pub trait RecipeService: Send + Sync {
    /// Lists recipes newest first, annotated for `viewer`.
    async fn list(
        &self,
        filter: RecipeFilter,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<Paged<RecipeDto>, RecipeError>;

    async fn get(&self, id: i32, viewer: Option<i32>) -> Result<RecipeDto, RecipeError>;

    /// Creates a recipe authored by `author_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::Validation`] when a referenced ingredient or tag
    /// does not exist or the image cannot be decoded.
    async fn create(&self, author_id: i32, input: RecipeInput) -> Result<RecipeDto, RecipeError>;

    /// Replaces a recipe's fields, ingredients and tags.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::NotAuthor`] when `editor_id` did not write the recipe.
    async fn update(
        &self,
        id: i32,
        editor_id: i32,
        input: RecipeInput,
    ) -> Result<RecipeDto, RecipeError>;

    async fn delete(&self, id: i32, editor_id: i32) -> Result<(), RecipeError>;

    /// Fails with `NotFound` or `NotAuthor` unless `editor_id` wrote recipe `id`.
    async fn ensure_author(&self, id: i32, editor_id: i32) -> Result<(), RecipeError>;

    /// Adds a recipe to one of the user's lists.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::AlreadyInList`] on a repeated add.
    async fn add_to_list(
        &self,
        list: RecipeList,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<RecipeShortDto, RecipeError>;

    /// Removes a recipe from one of the user's lists. Absent membership is not an error.
    async fn remove_from_list(
        &self,
        list: RecipeList,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<(), RecipeError>;

    /// Renders the aggregated shopping list for the user's cart.
    async fn shopping_list(&self, user_id: i32) -> Result<String, RecipeError>;
}
