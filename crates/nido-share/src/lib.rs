//! Chart publishing for nido.
//!
//! Uploads rendered chart images to a user-configured chart-sharing
//! endpoint. Publishing is best-effort and opt-in; a failed upload never
//! fails the local render.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default request timeout for uploads.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Publishing errors.
#[derive(Debug, Error)]
pub enum ShareError {
    /// The configured endpoint is not usable.
    #[error("invalid endpoint: {reason}")]
    InvalidEndpoint { reason: &'static str },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// The upload request failed.
    #[error("upload failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The endpoint rejected the upload.
    #[error("endpoint error: {message}")]
    Endpoint { message: String },
}

/// Chart-sharing client.
pub struct Client {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client for the given endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is empty or not an HTTP(S) URL, or
    /// if the HTTP client fails to build.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ShareError> {
        let endpoint = endpoint.into();

        if endpoint.trim().is_empty() {
            return Err(ShareError::InvalidEndpoint {
                reason: "endpoint cannot be empty",
            });
        }
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ShareError::InvalidEndpoint {
                reason: "endpoint must be an http(s) URL",
            });
        }

        let http = reqwest::blocking::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(ShareError::ClientBuild)?;

        Ok(Self { http, endpoint })
    }

    /// Uploads one rendered chart under the given name.
    pub fn publish(&self, name: &str, content_type: &str, image: &[u8]) -> Result<(), ShareError> {
        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("name", name)])
            .header("content-type", content_type)
            .body(image.to_vec())
            .send()?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(name, bytes = image.len(), "published chart");
            return Ok(());
        }

        let body = response.text().unwrap_or_default();
        Err(parse_endpoint_error(&body).unwrap_or_else(|| ShareError::Endpoint {
            message: format!("status {status}: {body}"),
        }))
    }
}

fn parse_endpoint_error(body: &str) -> Option<ShareError> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| ShareError::Endpoint {
            message: payload.error.message,
        })
}
