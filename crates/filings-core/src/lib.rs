#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for regulatory filing feeds.
//!
//! This crate provides the foundational abstractions for working with filings:
//!
//! - [`FilingRecord`](types::FilingRecord) - One row of filing search results
//! - [`FilingIdentity`](identity::FilingIdentity) - Structured identity and composite id codec
//! - [`AccountingLine`](types::AccountingLine) - A normalized statement line
//! - [`StatementKind`](statement::StatementKind) - The statement whitelist
//! - [`FilingSearchService`](provider::FilingSearchService),
//!   [`ReportService`](provider::ReportService),
//!   [`CategoryService`](provider::CategoryService) - Regulator API seams

/// Error types for filing operations.
pub mod error;
/// Filing identity and composite id codec.
pub mod identity;
/// Service traits for the regulator's API.
pub mod provider;
/// Filing search parameters.
pub mod query;
/// Statement and document kind definitions.
pub mod statement;
/// Core data types (FilerCode, FilingRecord, AccountingLine, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use error::{FilingError, Result};
pub use identity::FilingIdentity;
pub use provider::{CategoryService, FilingSearchService, RegulatorService, ReportService};
pub use query::SearchRequest;
pub use statement::{DocumentKind, StatementKind};
pub use types::{
    AccountingLine, DocumentCategory, DocumentFile, FilerCode, FilerListing, FilingDocument,
    FilingRecord, RawStatement, RawValue, ReportLine,
};
