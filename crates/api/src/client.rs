//! Shared HTTP plumbing: base URL handling, status checks and JSON decoding.

use std::time::Duration;

use casefile_protocol::ApiErrorBody;
use casefile_uploader::UploaderConfig;
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// HTTP client bound to the backend's base URL.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Builds a client whose requests time out after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(http, base_url)
    }

    /// Builds a client from the uploader config.
    pub fn from_config(config: &UploaderConfig) -> Result<Self, ApiError> {
        Self::new(&config.api_base_url, config.request_timeout())
    }

    /// Wraps an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        // Without a trailing slash `Url::join` would drop the last segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url =
            Url::parse(&normalized).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Resolves an endpoint path such as `upload/start` against the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }
}

/// Passes 2xx responses through and turns anything else into
/// [`ApiError::Status`].
///
/// The message is the body's `message` field when the backend sent one,
/// otherwise the status reason phrase.
pub(crate) async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .map(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

    tracing::debug!(status = status.as_u16(), message = %message, "backend error response");
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Reads a successful response body as JSON.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}
