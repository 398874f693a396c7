use axum::{
    Extension, Json,
    extract::{OriginalUri, Path, RawQuery, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use std::str::FromStr;
use std::sync::Arc;
use url::form_urlencoded;

use super::auth::Viewer;
use super::pagination::{Page, PageParams};
use super::types::{RecipeDto, RecipeShortDto, RecipeWriteRequest};
use super::{ApiError, ApiJson, AppState};
use crate::models::recipe::{RecipeFilter, RecipeList};
use crate::services::{ImageError, RecipeError};

impl From<RecipeError> for ApiError {
    fn from(err: RecipeError) -> Self {
        match err {
            RecipeError::NotFound(id) => Self::not_found("Recipe", id),
            RecipeError::Validation(errors) => Self::ValidationError(errors),
            RecipeError::NotAuthor(_) => Self::forbidden(),
            RecipeError::AlreadyInList { .. } => Self::Conflict(err.to_string()),
            RecipeError::Image(ImageError::Storage(msg)) => Self::InternalError(msg),
            RecipeError::Image(image_err) => Self::field("image", image_err.to_string()),
            RecipeError::Database(msg) => Self::DatabaseError(msg),
            RecipeError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

// ============================================================================
// Query parsing
// ============================================================================

/// Recipe list query. `tags` may repeat, which the plain `Query` extractor
/// cannot express, so the raw query string is parsed here.
#[derive(Debug, Default)]
pub struct RecipeQuery {
    pub filter: RecipeFilter,
    pub page: PageParams,
}

impl RecipeQuery {
    pub fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
        let mut query = Self::default();

        for (key, value) in form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "author" => query.filter.author = Some(parse_number("author", &value)?),
                "tags" => {
                    let slug = value.trim();
                    if !slug.is_empty() && !query.filter.tags.iter().any(|t| t == slug) {
                        query.filter.tags.push(slug.to_string());
                    }
                }
                "is_favorited" => query.filter.favorited_only = parse_flag("is_favorited", &value)?,
                "is_in_shopping_cart" => {
                    query.filter.in_shopping_cart_only = parse_flag("is_in_shopping_cart", &value)?;
                }
                other => {
                    query.page.accept(other, &value)?;
                }
            }
        }

        Ok(query)
    }
}

fn parse_flag(field: &str, value: &str) -> Result<bool, ApiError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "" | "0" | "false" => Ok(false),
        _ => Err(ApiError::field(field, "Must be a valid boolean.")),
    }
}

fn parse_number<T: FromStr>(field: &str, value: &str) -> Result<T, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::field(field, "A valid integer is required."))
}

// ============================================================================
// CRUD
// ============================================================================

/// GET /recipes
pub async fn list_recipes(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    OriginalUri(uri): OriginalUri,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<RecipeDto>>, ApiError> {
    let query = RecipeQuery::parse(raw.as_deref())?;
    let request = query.page.resolve(&state.config().recipes);

    let recipes = state
        .recipe_service()
        .list(query.filter, viewer.id(), request)
        .await?;

    Ok(Json(Page::build(recipes, request, &uri)?))
}

/// GET /recipes/{id}
pub async fn get_recipe(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<i32>,
) -> Result<Json<RecipeDto>, ApiError> {
    let recipe = state.recipe_service().get(id, viewer.id()).await?;
    Ok(Json(recipe))
}

/// POST /recipes
pub async fn create_recipe(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    ApiJson(payload): ApiJson<RecipeWriteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = viewer.require()?;
    let input = payload.into_input(true)?;

    let recipe = state.recipe_service().create(user.id, input).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

/// PATCH|PUT /recipes/{id}
pub async fn update_recipe(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<RecipeWriteRequest>,
) -> Result<Json<RecipeDto>, ApiError> {
    let user = viewer.require()?;
    state.recipe_service().ensure_author(id, user.id).await?;

    let input = payload.into_input(false)?;
    let recipe = state.recipe_service().update(id, user.id, input).await?;
    Ok(Json(recipe))
}

/// DELETE /recipes/{id}
pub async fn delete_recipe(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let user = viewer.require()?;
    state.recipe_service().delete(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Favorites & shopping cart
// ============================================================================

async fn add_to_list(
    state: &AppState,
    viewer: &Viewer,
    list: RecipeList,
    recipe_id: i32,
) -> Result<(StatusCode, Json<RecipeShortDto>), ApiError> {
    let user = viewer.require()?;
    let recipe = state
        .recipe_service()
        .add_to_list(list, user.id, recipe_id)
        .await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

async fn remove_from_list(
    state: &AppState,
    viewer: &Viewer,
    list: RecipeList,
    recipe_id: i32,
) -> Result<StatusCode, ApiError> {
    let user = viewer.require()?;
    state
        .recipe_service()
        .remove_from_list(list, user.id, recipe_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /recipes/{id}/favorite
pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    add_to_list(&state, &viewer, RecipeList::Favorites, id).await
}

/// DELETE /recipes/{id}/favorite
pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    remove_from_list(&state, &viewer, RecipeList::Favorites, id).await
}

/// POST /recipes/{id}/shopping_cart
pub async fn add_to_shopping_cart(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    add_to_list(&state, &viewer, RecipeList::ShoppingCart, id).await
}

/// DELETE /recipes/{id}/shopping_cart
pub async fn remove_from_shopping_cart(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    remove_from_list(&state, &viewer, RecipeList::ShoppingCart, id).await
}

/// GET /recipes/download_shopping_cart
/// Plain-text shopping list served as a file download
pub async fn download_shopping_cart(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
) -> Result<impl IntoResponse, ApiError> {
    let user = viewer.require()?;
    let content = state.recipe_service().shopping_list(user.id).await?;

    let filename = &state.config().recipes.shopping_list_filename;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "text/plain; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}.txt\""),
            ),
        ],
        content,
    ))
}
