use axum::{
    Extension, Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::types::{LoginRequest, TokenDto};
use super::validation::{ValidationErrors, required_text};
use super::{ApiError, ApiJson, AppState};
use crate::services::{AuthError, AuthUser};

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::validation(err.to_string()),
            AuthError::InvalidToken => Self::Unauthorized(err.to_string()),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

/// Who is making the request. Inserted by [`auth_middleware`] on every API
/// route; anonymous requests carry `Viewer(None)`.
#[derive(Debug, Clone, Default)]
pub struct Viewer(pub Option<AuthUser>);

impl Viewer {
    #[must_use]
    pub fn id(&self) -> Option<i32> {
        self.0.as_ref().map(|u| u.id)
    }

    /// The authenticated user, or 401.
    pub fn require(&self) -> Result<&AuthUser, ApiError> {
        self.0.as_ref().ok_or_else(ApiError::unauthenticated)
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves `Authorization: Token <key>` (or `Bearer <key>`) to a [`Viewer`].
/// A missing header means an anonymous request; a key that matches no user is
/// rejected with 401 even on public endpoints.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let viewer = match extract_token(&headers) {
        Some(token) => {
            let user = state.auth_service().authenticate(&token).await?;
            tracing::Span::current().record("user_id", user.id);
            Viewer(Some(user))
        }
        None => Viewer(None),
    };

    request.extensions_mut().insert(viewer);
    Ok(next.run(request).await)
}

/// Extract the token key from the Authorization header
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;

    let (scheme, key) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("token") && !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let key = key.trim();
    (!key.is_empty()).then(|| key.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/token/login
/// Exchange email and password for the account's token
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<TokenDto>, ApiError> {
    let mut errors = ValidationErrors::new();
    let email = required_text(&mut errors, "email", payload.email);
    let password = required_text(&mut errors, "password", payload.password);
    errors.into_result()?;

    let (Some(email), Some(password)) = (email, password) else {
        return Err(ApiError::validation("Email and password are required."));
    };

    let auth_token = state
        .auth_service()
        .login(email.trim(), &password)
        .await?;

    Ok(Json(TokenDto { auth_token }))
}

/// POST /auth/token/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(viewer): Extension<Viewer>,
) -> Result<impl IntoResponse, ApiError> {
    let user = viewer.require()?;
    state.auth_service().logout(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_token_schemes() {
        assert_eq!(
            extract_token(&headers_with("Token abc123")).as_deref(),
            Some("abc123")
        );
        assert_eq!(
            extract_token(&headers_with("Bearer abc123")).as_deref(),
            Some("abc123")
        );
        assert_eq!(
            extract_token(&headers_with("token   abc123 ")).as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn test_extract_token_ignores_other_schemes() {
        assert!(extract_token(&headers_with("Basic dXNlcjpwYXNz")).is_none());
        assert!(extract_token(&headers_with("Token")).is_none());
        assert!(extract_token(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_viewer_require() {
        assert!(Viewer(None).require().is_err());

        let viewer = Viewer(Some(AuthUser {
            id: 4,
            username: "cook".to_string(),
            email: "cook@example.com".to_string(),
        }));
        assert_eq!(viewer.id(), Some(4));
        assert!(viewer.require().is_ok());
    }
}
