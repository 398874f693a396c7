use axum::{
    Extension, Json,
    extract::{OriginalUri, Path, RawQuery, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use url::form_urlencoded;

use super::auth::Viewer;
use super::pagination::{Page, PageParams};
use super::types::{RegisterRequest, SetPasswordRequest, UserDto, UserWithRecipesDto};
use super::validation::{ValidationErrors, required_text};
use super::{ApiError, ApiJson, AppState};
use crate::services::UserError;

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => Self::not_found("User", id),
            UserError::Validation(errors) => Self::ValidationError(errors),
            UserError::AlreadySubscribed(_) => Self::Conflict(err.to_string()),
            UserError::SelfSubscription => Self::validation("You cannot subscribe to yourself."),
            UserError::Database(msg) => Self::DatabaseError(msg),
            UserError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

/// `?page=&limit=&recipes_limit=` for endpoints returning authors with a
/// recipe preview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsersQuery {
    pub page: PageParams,
    pub recipes_limit: Option<usize>,
}

impl UsersQuery {
    pub fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
        let mut query = Self::default();

        for (key, value) in form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "recipes_limit" => {
                    let limit = value.trim().parse().map_err(|_| {
                        ApiError::field("recipes_limit", "A valid integer is required.")
                    })?;
                    query.recipes_limit = Some(limit);
                }
                other => {
                    query.page.accept(other, &value)?;
                }
            }
        }

        Ok(query)
    }
}

/// GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    OriginalUri(uri): OriginalUri,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<UserDto>>, ApiError> {
    let request = PageParams::parse(raw.as_deref())?.resolve(&state.config().recipes);
    let users = state.user_service().list(viewer.id(), request).await?;
    Ok(Json(Page::build(users, request, &uri)?))
}

/// POST /users
/// Public sign-up
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new_user = payload.into_new_user(state.config().security.min_password_length)?;
    let user = state.user_service().register(new_user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<i32>,
) -> Result<Json<UserDto>, ApiError> {
    let user = state.user_service().get(id, viewer.id()).await?;
    Ok(Json(user))
}

/// GET /users/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
) -> Result<Json<UserDto>, ApiError> {
    let user = viewer.require()?;
    let profile = state.user_service().get(user.id, Some(user.id)).await?;
    Ok(Json(profile))
}

/// POST /users/set_password
pub async fn set_password(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    ApiJson(payload): ApiJson<SetPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = viewer.require()?;

    let mut errors = ValidationErrors::new();
    let current = required_text(&mut errors, "current_password", payload.current_password);
    let new = required_text(&mut errors, "new_password", payload.new_password);
    errors.into_result()?;

    let (Some(current), Some(new)) = (current, new) else {
        return Err(ApiError::validation("Both passwords are required."));
    };

    state
        .user_service()
        .set_password(user.id, &current, &new)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/subscriptions
/// Authors the current user follows, each with a recipe preview
pub async fn subscriptions(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    OriginalUri(uri): OriginalUri,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<UserWithRecipesDto>>, ApiError> {
    let user = viewer.require()?;
    let params = UsersQuery::parse(raw.as_deref())?;
    let request = params.page.resolve(&state.config().recipes);

    let authors = state
        .user_service()
        .subscriptions(user.id, request, params.recipes_limit)
        .await?;

    Ok(Json(Page::build(authors, request, &uri)?))
}

/// POST /users/{id}/subscribe
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    Path(author_id): Path<i32>,
    RawQuery(raw): RawQuery,
) -> Result<impl IntoResponse, ApiError> {
    let user = viewer.require()?;
    let params = UsersQuery::parse(raw.as_deref())?;

    let author = state
        .user_service()
        .subscribe(user.id, author_id, params.recipes_limit)
        .await?;

    Ok((StatusCode::CREATED, Json(author)))
}

/// DELETE /users/{id}/subscribe
pub async fn unsubscribe(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
    Path(author_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let user = viewer.require()?;
    state.user_service().unsubscribe(user.id, author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error_mapping() {
        assert!(matches!(
            ApiError::from(UserError::AlreadySubscribed(2)),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(UserError::NotFound(2)),
            ApiError::NotFound(_)
        ));

        let ApiError::ValidationError(errors) = ApiError::from(UserError::SelfSubscription) else {
            panic!("self subscription should be a validation error");
        };
        assert!(errors.get("non_field_errors").is_some());
    }

    #[test]
    fn test_users_query_parse() {
        let query = UsersQuery::parse(Some("recipes_limit=2&page=2&limit=x")).unwrap();
        assert_eq!(query.recipes_limit, Some(2));
        assert_eq!(query.page.page, Some(2));
        assert_eq!(query.page.limit, None);

        let ApiError::ValidationError(errors) =
            UsersQuery::parse(Some("recipes_limit=many")).unwrap_err()
        else {
            panic!("bad recipes_limit should be a validation error");
        };
        assert!(errors.get("recipes_limit").is_some());

        assert!(matches!(
            UsersQuery::parse(Some("page=abc")),
            Err(ApiError::NotFound(_))
        ));
    }
}
