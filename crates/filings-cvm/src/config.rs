//! Feed configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::rate::RatePolicy;

/// Endpoint serving unstructured documents by protocol number.
pub const DOCUMENT_URL: &str =
    "https://www.rad.cvm.gov.br/ENET/frmExibirArquivoIPEExterno.aspx/ExibirPDF";

/// Default HTTP timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration of the CVM feed.
///
/// Deserializes with every field optional; missing fields take their defaults.
///
/// # Example
///
/// ```
/// use filings_cvm::{CvmFeedConfig, RatePolicy};
/// use std::time::Duration;
///
/// let config = CvmFeedConfig::default()
///     .with_rate_policy(RatePolicy::fixed(Duration::from_secs(2)))
///     .with_timeout(Duration::from_secs(60));
/// assert_eq!(config.rate_policy.base_delay(), Duration::from_secs(2));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CvmFeedConfig {
    /// Document endpoint URL.
    pub document_url: String,
    /// Institution code sent with every document request.
    pub institution_code: String,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// User agent of the HTTP client, if any.
    pub user_agent: Option<String>,
    /// Pacing between consecutive document requests.
    pub rate_policy: RatePolicy,
}

impl Default for CvmFeedConfig {
    fn default() -> Self {
        Self {
            document_url: DOCUMENT_URL.to_string(),
            institution_code: "1".to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            rate_policy: RatePolicy::default(),
        }
    }
}

impl CvmFeedConfig {
    /// Sets the document endpoint URL.
    #[must_use]
    pub fn with_document_url(mut self, url: impl Into<String>) -> Self {
        self.document_url = url.into();
        self
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent of the HTTP client.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets the pacing policy between document requests.
    #[must_use]
    pub const fn with_rate_policy(mut self, rate_policy: RatePolicy) -> Self {
        self.rate_policy = rate_policy;
        self
    }
}
