//! HTTP transport for the document endpoint.

use async_trait::async_trait;
use filings_core::{FilingError, Result};
use reqwest::header::CONTENT_TYPE;
use std::fmt::Debug;
use tracing::{debug, warn};

use crate::config::CvmFeedConfig;

/// Status code and body of an HTTP response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl TransportResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Transport posting JSON requests to the document endpoint.
///
/// Any response, whatever its status, is an `Ok`; errors are reserved for
/// requests that never got a response.
#[async_trait]
pub trait DocumentTransport: Send + Sync + Debug {
    /// Posts `body` as JSON to `url`.
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<TransportResponse>;
}

/// [`DocumentTransport`] over a `reqwest` client.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with the timeout and user agent of `config`.
    ///
    /// Falls back to a default client if the configured one cannot be built.
    #[must_use]
    pub fn new(config: &CvmFeedConfig) -> Self {
        let mut builder = reqwest::Client::builder().timeout(config.timeout);
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder.build().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to build configured HTTP client, using defaults");
            reqwest::Client::new()
        });

        Self { client }
    }

    /// Creates a transport with a pre-configured `reqwest` client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentTransport for HttpTransport {
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<TransportResponse> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .header("Referrer-Policy", "strict-origin-when-cross-origin")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| FilingError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FilingError::Network(e.to_string()))?;

        Ok(TransportResponse { status, body })
    }
}
