use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::types::TagDto;
use super::{ApiError, AppState};

/// GET /tags
pub async fn list_tags(State(state): State<Arc<AppState>>) -> Result<Json<Vec<TagDto>>, ApiError> {
    let tags = state.catalog_service().list_tags().await?;
    Ok(Json(tags))
}

/// GET /tags/{id}
pub async fn get_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<TagDto>, ApiError> {
    state
        .catalog_service()
        .get_tag(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Tag", id))
}
