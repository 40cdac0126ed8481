//! Service traits for the regulator's API.
//!
//! The regulator's API client is an external collaborator. This module defines
//! the seams the feed talks to:
//!
//! - [`RegulatorService`] - Base trait for all services
//! - [`FilingSearchService`] - Filing search by filer, category and date range
//! - [`ReportService`] - Structured statement retrieval
//! - [`CategoryService`] - Category and filer code listings

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;

use crate::{
    error::Result,
    query::SearchRequest,
    types::{FilingRecord, RawStatement},
};

/// Base trait for all regulator services.
pub trait RegulatorService: Send + Sync + Debug {
    /// Returns the name of this service (e.g., "CVM").
    fn name(&self) -> &str;
}

/// Service searching the regulator's filing index.
#[async_trait]
pub trait FilingSearchService: RegulatorService {
    /// Runs one search.
    ///
    /// Implementations make a single attempt; retrying is the caller's concern.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<FilingRecord>>;
}

/// Service returning the statements of a structured filing.
#[async_trait]
pub trait ReportService: RegulatorService {
    /// Fetches the requested statements of one filing.
    ///
    /// Returns a map keyed by statement name. Statements the filing does not
    /// carry are simply absent from the map.
    ///
    /// # Arguments
    ///
    /// * `document_sequence` - Document sequence number of the filing
    /// * `institution_type` - Institution type code of the filer
    /// * `statements` - Names of the statements to fetch
    async fn fetch_report(
        &self,
        document_sequence: &str,
        institution_type: u32,
        statements: &[&str],
    ) -> Result<HashMap<String, RawStatement>>;
}

/// Service listing reference data.
#[async_trait]
pub trait CategoryService: RegulatorService {
    /// Returns document categories as a code to description map.
    async fn categories(&self) -> Result<HashMap<String, String>>;

    /// Returns filer codes mapped to labels such as `"ACME S.A. (CANCELADA)"`.
    async fn filer_codes(&self) -> Result<HashMap<String, String>>;
}
