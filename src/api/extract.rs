use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Query, Request,
        rejection::{JsonRejection, QueryRejection},
    },
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use super::ApiError;

/// `Json` whose rejections come back as 400 field maps instead of axum's
/// plain-text 415/422 responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// `Query` with the same error shape as [`ApiJson`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let msg = match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                "Expected a request body with Content-Type: application/json.".to_string()
            }
            JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON.".to_string(),
            other => other.body_text(),
        };
        Self::validation(msg)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http, http::header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Line {
        #[allow(dead_code)]
        amount: i64,
    }

    fn json_request(body: &str) -> Request {
        http::Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_field_is_validation_error() {
        let result = ApiJson::<Line>::from_request(json_request("{}"), &()).await;
        let Err(ApiError::ValidationError(errors)) = result else {
            panic!("expected a validation error");
        };
        assert!(errors.to_string().contains("amount"));
    }

    #[tokio::test]
    async fn test_missing_content_type_is_validation_error() {
        let req = http::Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from("{\"amount\": 1}"))
            .unwrap();
        let result = ApiJson::<Line>::from_request(req, &()).await;
        assert!(matches!(result, Err(ApiError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_valid_body_is_extracted() {
        let result = ApiJson::<Line>::from_request(json_request("{\"amount\": 3}"), &()).await;
        assert!(matches!(result, Ok(ApiJson(Line { amount: 3 }))));
    }
}
