#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Regulatory filings retrieval and normalization.
//!
//! This crate re-exports the core filing types and the regulator feeds, and
//! provides [`FilingsFeed`] tying search, document download, report
//! normalization and lookups together.
//!
//! # Features
//!
//! - `cvm` - Brazilian securities regulator (CVM) feed, enabled by default
//!
//! # Example
//!
//! ```rust,ignore
//! use filings::{CvmFeedConfig, FilingsFeed, SearchRequest};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> filings::Result<()> {
//!     let client = Arc::new(MyCvmClient::new());
//!     let feed = FilingsFeed::new(client.clone(), client.clone(), client, &CvmFeedConfig::default());
//!
//!     let rows = feed.history(&SearchRequest::new("009512")).await;
//!     for row in &rows {
//!         if let Some(document) = feed.fetch(row).await {
//!             println!("{}: {:?}", row.composite_id(), document.is_empty());
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use filings_core::*;

// Feeds
#[cfg(feature = "cvm")]
pub use filings_cvm::{
    Batch, CvmFeedConfig, DOCUMENT_URL, DocumentFetcher, DocumentTransport, HttpTransport,
    RatePolicy, ReportNormalizer, RowFetcher, SkipReason, SkippedRow, ToFrame, TransportResponse,
    format_cnpj, normalize_statement, parse_filer_label,
};

#[cfg(feature = "cvm")]
mod feed;
#[cfg(feature = "cvm")]
pub use feed::FilingsFeed;
