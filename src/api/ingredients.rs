use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::types::IngredientDto;
use super::{ApiError, ApiQuery, AppState};

#[derive(Debug, Deserialize)]
pub struct IngredientQuery {
    /// Case-insensitive name prefix.
    pub name: Option<String>,
}

/// GET /ingredients?name=<prefix>
pub async fn list_ingredients(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<IngredientQuery>,
) -> Result<Json<Vec<IngredientDto>>, ApiError> {
    let ingredients = state
        .catalog_service()
        .list_ingredients(query.name.as_deref().map(str::trim))
        .await?;
    Ok(Json(ingredients))
}

/// GET /ingredients/{id}
pub async fn get_ingredient(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<IngredientDto>, ApiError> {
    state
        .catalog_service()
        .get_ingredient(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Ingredient", id))
}
