//! Batch orchestration over filing rows.
//!
//! Batches run one row at a time, in input order. A row that fails or comes
//! back empty is logged and left out of [`Batch::items`]; it is recorded in
//! [`Batch::skipped`] with the reason, so callers can tell "no data" apart
//! from "failed".

use async_trait::async_trait;
use filings_core::{DocumentFile, FilingError, FilingIdentity, FilingRecord, ReportLine, Result};
use tracing::{debug, info, warn};

use crate::document::DocumentFetcher;
use crate::report::ReportNormalizer;
use crate::transport::DocumentTransport;

/// Why a row produced nothing.
#[derive(Clone, Debug, PartialEq)]
pub enum SkipReason {
    /// The row was fetched but held no data.
    Empty,
    /// The row could not be fetched.
    Failed(FilingError),
}

/// A row left out of a batch.
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedRow {
    /// Position of the row in the input.
    pub index: usize,
    /// Identity of the filing.
    pub identity: FilingIdentity,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Output of a batch run.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch<T> {
    /// Items of the kept rows, in input order.
    pub items: Vec<T>,
    /// Rows that produced nothing.
    pub skipped: Vec<SkippedRow>,
}

impl<T> Default for Batch<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T> Batch<T> {
    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if no row produced data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the skipped rows that failed, leaving out empty ones.
    pub fn failures(&self) -> impl Iterator<Item = &SkippedRow> {
        self.skipped
            .iter()
            .filter(|row| matches!(row.reason, SkipReason::Failed(_)))
    }

    /// Consumes the batch and returns its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Per-row operation driven by [`run_batch`].
#[async_trait]
pub trait RowFetcher: Send + Sync {
    /// Item produced for a row.
    type Item: Send;

    /// Fetches the items of one filing row. An empty vector means "no data".
    async fn fetch_row(&self, record: &FilingRecord) -> Result<Vec<Self::Item>>;
}

/// Runs `fetcher` over `rows` sequentially and concatenates the results.
pub async fn run_batch<F>(fetcher: &F, rows: &[FilingRecord]) -> Batch<F::Item>
where
    F: RowFetcher + ?Sized,
{
    let mut batch = Batch::default();

    for (index, record) in rows.iter().enumerate() {
        let identity = record.identity();
        match fetcher.fetch_row(record).await {
            Ok(items) if items.is_empty() => {
                debug!(row = index, filing = %identity, "No data for filing, skipping");
                batch.skipped.push(SkippedRow {
                    index,
                    identity,
                    reason: SkipReason::Empty,
                });
            }
            Ok(items) => {
                debug!(row = index, filing = %identity, items = items.len(), "Fetched filing");
                batch.items.extend(items);
            }
            Err(e) => {
                warn!(row = index, filing = %identity, error = %e, "Filing fetch failed, skipping");
                batch.skipped.push(SkippedRow {
                    index,
                    identity,
                    reason: SkipReason::Failed(e),
                });
            }
        }
    }

    info!(
        rows = rows.len(),
        items = batch.items.len(),
        skipped = batch.skipped.len(),
        "Batch complete"
    );
    batch
}

/// Fetches the binary document of every row.
pub async fn fetch_all_documents<T: DocumentTransport>(
    fetcher: &DocumentFetcher<T>,
    rows: &[FilingRecord],
) -> Batch<DocumentFile> {
    run_batch(fetcher, rows).await
}

/// Normalizes the structured report of every row.
pub async fn normalize_all_reports(
    normalizer: &ReportNormalizer,
    rows: &[FilingRecord],
) -> Batch<ReportLine> {
    run_batch(normalizer, rows).await
}
