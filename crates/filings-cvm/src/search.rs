//! Retry-guarded filing search.
//!
//! The search service is flaky. A search is attempted once and retried up to
//! [`SearchRequest::max_retries`] more times. [`search`] keeps the feed's
//! give-up-silently behavior: once retries run out it returns an empty result,
//! which callers cannot tell apart from "no filings". Use [`try_search`] to see
//! [`FilingError::RetriesExhausted`] instead.

use filings_core::{FilingError, FilingRecord, FilingSearchService, Result, SearchRequest};
use tracing::{debug, error, instrument, warn};

/// Searches filings, retrying failed attempts.
///
/// # Errors
///
/// - [`FilingError::InvalidParameter`] if the search window is inverted; the
///   service is not called
/// - [`FilingError::RetriesExhausted`] once the first attempt and every retry
///   have failed
#[instrument(skip(service, request), fields(service = service.name(), filer = %request.filer_code))]
pub async fn try_search(
    service: &dyn FilingSearchService,
    request: &SearchRequest,
) -> Result<Vec<FilingRecord>> {
    request.validate()?;

    let attempts = request.max_retries.saturating_add(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match service.search(request).await {
            Ok(records) => {
                debug!(attempt, records = records.len(), "Search succeeded");
                return Ok(records);
            }
            Err(e) => {
                warn!(attempt, error = %e, "Search attempt failed");
                last_error = Some(e);
            }
        }
    }

    Err(FilingError::RetriesExhausted {
        attempts,
        last_error: last_error.map(|e| e.to_string()).unwrap_or_default(),
    })
}

/// Searches filings, returning an empty result once retries run out.
pub async fn search(service: &dyn FilingSearchService, request: &SearchRequest) -> Vec<FilingRecord> {
    match try_search(service, request).await {
        Ok(records) => records,
        Err(e) => {
            error!(filer = %request.filer_code, error = %e, "Giving up on filing search");
            Vec::new()
        }
    }
}
