#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! CVM (Comissão de Valores Mobiliários) filing feed.
//!
//! This crate retrieves and normalizes filings published by the Brazilian
//! securities regulator:
//!
//! - Retry-guarded filing search over a [`FilingSearchService`](filings_core::FilingSearchService)
//! - Unstructured document download with request pacing
//! - Structured report normalization into [`AccountingLine`](filings_core::AccountingLine)s
//! - Batch orchestration with explicit skip accounting
//! - Category and filer lookups
//! - DataFrame export through [`ToFrame`]
//!
//! # Example
//!
//! ```no_run
//! use filings_cvm::{CvmFeedConfig, DocumentFetcher, RatePolicy, ToFrame};
//! use filings_core::FilingRecord;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CvmFeedConfig::default()
//!         .with_rate_policy(RatePolicy::fixed(Duration::from_secs(5)));
//!     let fetcher = DocumentFetcher::new(&config);
//!
//!     let rows: Vec<FilingRecord> = Vec::new(); // from a search
//!     let batch = fetcher.fetch_documents(&rows).await;
//!     for skipped in batch.failures() {
//!         eprintln!("{}: {:?}", skipped.identity, skipped.reason);
//!     }
//!
//!     let df = batch.to_frame()?;
//!     println!("{:?}", df.shape());
//!     Ok(())
//! }
//! ```

/// Batch orchestration over filing rows.
pub mod batch;
/// Feed configuration.
pub mod config;
/// Unstructured document retrieval.
pub mod document;
/// DataFrame export.
pub mod frame;
/// Category and filer lookups.
pub mod lookup;
/// Request pacing.
pub mod rate;
/// Structured report normalization.
pub mod report;
/// Retry-guarded search.
pub mod search;
mod text;
/// HTTP transport for the document endpoint.
pub mod transport;

pub use batch::{
    Batch, RowFetcher, SkipReason, SkippedRow, fetch_all_documents, normalize_all_reports,
    run_batch,
};
pub use config::{CvmFeedConfig, DOCUMENT_URL};
pub use document::DocumentFetcher;
pub use frame::ToFrame;
pub use lookup::{NO_STATUS, categories, filer_codes, format_cnpj, parse_filer_label};
pub use rate::RatePolicy;
pub use report::{ReportNormalizer, normalize_statement};
pub use search::{search, try_search};
pub use transport::{DocumentTransport, HttpTransport, TransportResponse};
