use axum::http::Uri;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::ApiError;
use crate::config::RecipesConfig;
use crate::models::{PageRequest, Paged};

/// `?page=&limit=` as sent by clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PageParams {
    /// Read `page` and `limit` out of a raw query string, ignoring other keys.
    pub fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            params.accept(&key, &value)?;
        }
        Ok(params)
    }

    /// Apply one query pair. Returns whether the key was a paging key.
    pub fn accept(&mut self, key: &str, value: &str) -> Result<bool, ApiError> {
        match key {
            "page" => {
                let page = value
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::NotFound("Invalid page.".to_string()))?;
                self.page = Some(page);
                Ok(true)
            }
            // An unusable limit falls back to the default page size.
            "limit" => {
                self.limit = value.trim().parse().ok();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    #[must_use]
    pub fn resolve(self, config: &RecipesConfig) -> PageRequest {
        PageRequest::resolve(self.page, self.limit, config.page_size, config.max_page_size)
    }
}

/// Paginated response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Wrap one page of results. Links reuse the request's path and query
    /// with only `page` replaced.
    pub fn build(paged: Paged<T>, request: PageRequest, uri: &Uri) -> Result<Self, ApiError> {
        if request.is_out_of_range(paged.total) {
            return Err(ApiError::NotFound("Invalid page.".to_string()));
        }

        let next = request
            .page
            .checked_mul(request.size)
            .is_some_and(|seen| seen < paged.total)
            .then(|| page_link(uri, request.page + 1));
        let previous = (request.page > 1).then(|| page_link(uri, request.page - 1));

        Ok(Self {
            count: paged.total,
            next,
            previous,
            results: paged.items,
        })
    }
}

fn page_link(uri: &Uri, page: u64) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());

    if let Some(raw) = uri.query() {
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            if key != "page" {
                query.append_pair(&key, &value);
            }
        }
    }

    if page > 1 {
        query.append_pair("page", &page.to_string());
    }

    let query = query.finish();
    if query.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{query}", uri.path())
    }
}
