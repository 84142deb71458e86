//! API utilities for frontend-backend communication
//!
//! Provides URL construction and the error type shared by all requests.

use contracts::assistant::ErrorBody;
use gloo_net::http::Response;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::config::api_base;

/// Everything that can go wrong with a request.
///
/// The UI shows one generic message per action; the variant and its detail
/// only go to the console.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("failed to build request: {0}")]
    Build(String),
    #[error("failed to send request: {0}")]
    Network(String),
    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("failed to parse response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classify a non-2xx response, preferring the service's `error` field
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => parsed.error,
            Err(_) if body.trim().is_empty() => "empty response body".to_string(),
            Err(_) => body.trim().to_string(),
        };
        Self::Status { status, detail }
    }
}

/// Build a full API URL from a path
///
/// # Example
/// ```rust,ignore
/// let url = api_url(contracts::assistant::CHAT_PATH);
/// ```
pub fn api_url(path: &str) -> String {
    join_url(api_base(), path)
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Pass 2xx responses through, turn anything else into `ApiError::Status`
pub async fn check_response(response: Response) -> Result<Response, ApiError> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_status(status, &body))
}

pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}
