//! Error types for filing operations.
//!
//! This module defines [`FilingError`] which covers every failure that can occur
//! while searching, fetching, or normalizing regulatory filings.

use thiserror::Error;

/// Errors that can occur during filing operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilingError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// The regulator throttled the request.
    #[error("Rate limited by {provider}")]
    RateLimited {
        /// The endpoint or service that rate limited the request.
        provider: String,
    },

    /// The endpoint answered with a status other than 200.
    #[error("Document not found: HTTP {status}")]
    NotFound {
        /// HTTP status code returned by the endpoint.
        status: u16,
    },

    /// Every search attempt failed.
    #[error("Search gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made, including the first one.
        attempts: u32,
        /// Message of the last failure.
        last_error: String,
    },

    /// The report service returned none of the requested statements.
    #[error("No structured data for document {0}")]
    NoStructuredData(String),

    /// Error parsing data returned by a service.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The external regulator service reported a failure.
    #[error("Service error: {0}")]
    Service(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl FilingError {
    /// Returns true if the error means the regulator has nothing for the request,
    /// as opposed to a failure talking to it.
    #[must_use]
    pub const fn is_absence(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::NoStructuredData(_))
    }
}

/// Result type alias using [`FilingError`].
pub type Result<T> = std::result::Result<T, FilingError>;
