//! REST gateways for the remote commerce API.
//!
//! # Architecture
//!
//! - One [`ApiClient`] per application, cheaply cloneable
//! - The remote service is the source of truth for the authenticated
//!   cart - no local sync beyond the reconciliation engine's store
//! - Catalog reads are cached in-memory via `moka` (5 minute TTL);
//!   cart reads never are
//! - Every response funnels through one normalization point that maps
//!   status codes and the `{message, errors}` error body into [`ApiError`]
//!
//! # Surfaces
//!
//! - Cart: add/update/remove/fetch/checkout (bearer token required)
//! - Identity: login, register (multipart), current user
//! - Catalog: paginated product listing with filters, product detail

mod auth;
mod cache;
mod cart;
mod products;

pub mod types;

pub use products::{Product, ProductPage, ProductQuery, ProductSort, ProductSummary};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

use crate::config::StorefrontConfig;

use cache::CatalogCacheValue;

/// Catalog cache time-to-live.
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Errors from remote API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (transport level).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The bearer credential was rejected (401).
    #[error("unauthorized")]
    Unauthorized,

    /// The request failed validation (422), with per-field messages.
    #[error("{message}")]
    Validation {
        message: String,
        errors: HashMap<String, Vec<String>>,
    },

    /// Any other non-success response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Client for the remote commerce REST API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    /// Base URL without a trailing slash.
    base_url: String,
    catalog_cache: Cache<String, CatalogCacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        let http = match reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "falling back to default HTTP client");
                reqwest::Client::new()
            }
        };

        let catalog_cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.api_base_url.as_str().trim_end_matches('/').to_string(),
                catalog_cache,
            }),
        }
    }

    /// Full URL for an API path (paths start with `/`).
    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }
}

/// Error body shape used by the remote service for every failure.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: HashMap<String, Vec<String>>,
}

/// Map a non-success response into an [`ApiError`].
///
/// Returns `None` for success statuses. Unparseable error bodies fall
/// back to a status-derived message rather than failing the mapping.
fn classify_error(status: StatusCode, body: &str) -> Option<ApiError> {
    if status.is_success() {
        return None;
    }

    if status == StatusCode::UNAUTHORIZED {
        return Some(ApiError::Unauthorized);
    }

    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

    if status == StatusCode::UNPROCESSABLE_ENTITY {
        return Some(ApiError::Validation {
            message: parsed
                .message
                .unwrap_or_else(|| "Validation failed".to_string()),
            errors: parsed.errors,
        });
    }

    Some(ApiError::Api {
        status: status.as_u16(),
        message: parsed
            .message
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16())),
    })
}

/// Read a response body and parse it as `T`, mapping failures.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let text = response.text().await?;

    if let Some(error) = classify_error(status, &text) {
        if !matches!(error, ApiError::Unauthorized | ApiError::Validation { .. }) {
            tracing::error!(
                status = %status,
                body = %text.chars().take(500).collect::<String>(),
                "API returned non-success status"
            );
        }
        return Err(error);
    }

    serde_json::from_str(&text).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %text.chars().take(500).collect::<String>(),
            "failed to parse API response"
        );
        ApiError::Parse(e)
    })
}

/// Like [`handle_response`] for endpoints whose success body is empty
/// (e.g. a 204 from a removal).
async fn handle_empty_response(response: reqwest::Response) -> Result<(), ApiError> {
    let status = response.status();
    let text = response.text().await?;
    classify_error(status, &text).map_or(Ok(()), Err)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_success_is_none() {
        assert!(classify_error(StatusCode::OK, "{}").is_none());
        assert!(classify_error(StatusCode::NO_CONTENT, "").is_none());
    }

    #[test]
    fn test_classify_unauthorized() {
        let error = classify_error(StatusCode::UNAUTHORIZED, "").unwrap();
        assert!(matches!(error, ApiError::Unauthorized));
    }

    #[test]
    fn test_classify_validation_with_field_errors() {
        let body = r#"{"message":"The given data was invalid.","errors":{"email":["The email field is required."]}}"#;
        let error = classify_error(StatusCode::UNPROCESSABLE_ENTITY, body).unwrap();

        match error {
            ApiError::Validation { message, errors } => {
                assert_eq!(message, "The given data was invalid.");
                assert_eq!(
                    errors.get("email").map(Vec::as_slice),
                    Some(&["The email field is required.".to_string()][..])
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_classify_other_uses_message() {
        let error = classify_error(StatusCode::BAD_GATEWAY, r#"{"message":"upstream down"}"#).unwrap();
        match error {
            ApiError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_classify_unparseable_body_falls_back() {
        let error = classify_error(StatusCode::INTERNAL_SERVER_ERROR, "<html>").unwrap();
        match error {
            ApiError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Request failed with status 500");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
