//! Unstructured document retrieval.
//!
//! Eventual filings are only available as binary documents addressed by their
//! protocol number. The endpoint answers a JSON POST with an envelope whose `d`
//! field holds the base64-encoded document.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use filings_core::{DocumentFile, FilingError, FilingRecord, Result};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use crate::batch::{Batch, RowFetcher, run_batch};
use crate::config::CvmFeedConfig;
use crate::rate::{Observation, RateLimiter};
use crate::transport::{DocumentTransport, HttpTransport};

/// Envelope returned by the document endpoint.
#[derive(Debug, Deserialize)]
struct DocumentEnvelope {
    /// Base64-encoded document.
    d: String,
}

/// Fetches binary documents by protocol number.
///
/// Requests are paced by the configured [`RatePolicy`](crate::RatePolicy):
/// batch fetches pause after every request, successful or not.
#[derive(Debug)]
pub struct DocumentFetcher<T = HttpTransport> {
    transport: T,
    url: String,
    institution_code: String,
    rate_limiter: Mutex<RateLimiter>,
}

impl DocumentFetcher<HttpTransport> {
    /// Creates a fetcher over HTTP.
    #[must_use]
    pub fn new(config: &CvmFeedConfig) -> Self {
        Self::with_transport(HttpTransport::new(config), config)
    }
}

impl<T: DocumentTransport> DocumentFetcher<T> {
    /// Creates a fetcher over a custom transport.
    #[must_use]
    pub fn with_transport(transport: T, config: &CvmFeedConfig) -> Self {
        Self {
            transport,
            url: config.document_url.clone(),
            institution_code: config.institution_code.clone(),
            rate_limiter: Mutex::new(RateLimiter::new(config.rate_policy)),
        }
    }

    /// Returns the pause applied after the next request.
    pub async fn current_delay(&self) -> std::time::Duration {
        self.rate_limiter.lock().await.delay()
    }

    /// Fetches and decodes one document.
    ///
    /// # Errors
    ///
    /// - [`FilingError::Network`] if the request got no response
    /// - [`FilingError::RateLimited`] on HTTP 429
    /// - [`FilingError::NotFound`] on any other status than 200
    /// - [`FilingError::Parse`] if the envelope or its payload is malformed
    #[instrument(skip(self))]
    pub async fn try_fetch_document(&self, protocol: &str) -> Result<Vec<u8>> {
        let body = json!({
            "codigoInstituicao": self.institution_code,
            "numeroProtocolo": protocol,
            "token": "",
            "versaoCaptcha": "",
        });

        let started = Instant::now();
        let result = self.transport.post_json(&self.url, &body).await;
        let observation = Observation {
            status: result.as_ref().ok().map(|response| response.status),
            latency: started.elapsed(),
        };
        self.rate_limiter.lock().await.observe(observation);

        let response = result?;
        match response.status {
            200 => decode_envelope(&response.body),
            429 => Err(FilingError::RateLimited {
                provider: self.url.clone(),
            }),
            status => Err(FilingError::NotFound { status }),
        }
    }

    /// Fetches one document, returning `None` on any failure.
    pub async fn fetch_document(&self, protocol: &str) -> Option<Vec<u8>> {
        match self.try_fetch_document(protocol).await {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!(protocol, error = %e, "Document fetch failed");
                None
            }
        }
    }

    /// Fetches the document of every row, pausing after each request.
    pub async fn fetch_documents(&self, rows: &[FilingRecord]) -> Batch<DocumentFile> {
        run_batch(self, rows).await
    }
}

#[async_trait]
impl<T: DocumentTransport> RowFetcher for DocumentFetcher<T> {
    type Item = DocumentFile;

    async fn fetch_row(&self, record: &FilingRecord) -> Result<Vec<DocumentFile>> {
        let result = self.try_fetch_document(&record.protocol).await;
        self.rate_limiter.lock().await.wait().await;

        let payload = result?;
        if payload.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![DocumentFile {
            identity: record.identity(),
            payload,
        }])
    }
}

fn decode_envelope(body: &str) -> Result<Vec<u8>> {
    let envelope: DocumentEnvelope = serde_json::from_str(body)
        .map_err(|e| FilingError::Parse(format!("Failed to parse document envelope: {e}")))?;

    let payload = STANDARD
        .decode(envelope.d.trim())
        .map_err(|e| FilingError::Parse(format!("Failed to decode document payload: {e}")))?;

    debug!(bytes = payload.len(), "Decoded document");
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{SkipReason, fetch_all_documents};
    use crate::rate::RatePolicy;
    use crate::transport::TransportResponse;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    /// Transport answering from a table of protocol number to response.
    #[derive(Debug, Default)]
    struct MockTransport {
        responses: HashMap<String, TransportResponse>,
        requests: StdMutex<Vec<serde_json::Value>>,
    }

    impl MockTransport {
        fn with(mut self, protocol: &str, response: TransportResponse) -> Self {
            self.responses.insert(protocol.to_string(), response);
            self
        }
    }

    #[async_trait]
    impl DocumentTransport for MockTransport {
        async fn post_json(
            &self,
            _url: &str,
            body: &serde_json::Value,
        ) -> Result<TransportResponse> {
            self.requests.lock().unwrap().push(body.clone());
            let protocol = body["numeroProtocolo"].as_str().unwrap_or_default();
            self.responses
                .get(protocol)
                .cloned()
                .ok_or_else(|| FilingError::Network("connection refused".to_string()))
        }
    }

    fn ok_body(payload: &[u8]) -> TransportResponse {
        TransportResponse::new(200, json!({ "d": STANDARD.encode(payload) }).to_string())
    }

    fn config() -> CvmFeedConfig {
        CvmFeedConfig::default().with_rate_policy(RatePolicy::fixed(Duration::ZERO))
    }

    fn row(filer: &str, protocol: &str, sequence: &str) -> FilingRecord {
        FilingRecord::new(
            filer,
            protocol,
            sequence,
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(17, 45, 12)
                .unwrap(),
        )
        .with_category("IPE_4", "Fato Relevante - Outros")
        .with_version(3)
    }

    #[tokio::test]
    async fn test_fetch_document_decodes_payload() {
        let transport = MockTransport::default().with("P1", ok_body(b"PDFDATA"));
        let fetcher = DocumentFetcher::with_transport(transport, &config());

        let payload = fetcher.fetch_document("P1").await;
        assert_eq!(payload.as_deref(), Some(&b"PDFDATA"[..]));
    }

    #[tokio::test]
    async fn test_request_body() {
        let transport = MockTransport::default().with("P1", ok_body(b"x"));
        let fetcher = DocumentFetcher::with_transport(transport, &config());
        fetcher.fetch_document("P1").await;

        let requests = fetcher.transport.requests.lock().unwrap();
        assert_eq!(
            requests[0],
            json!({
                "codigoInstituicao": "1",
                "numeroProtocolo": "P1",
                "token": "",
                "versaoCaptcha": "",
            })
        );
    }

    #[tokio::test]
    async fn test_fetch_document_not_found() {
        let transport = MockTransport::default().with("P1", TransportResponse::new(404, "Not Found"));
        let fetcher = DocumentFetcher::with_transport(transport, &config());

        assert_eq!(fetcher.fetch_document("P1").await, None);
        assert_eq!(
            fetcher.try_fetch_document("P1").await,
            Err(FilingError::NotFound { status: 404 })
        );
    }

    #[tokio::test]
    async fn test_fetch_document_rate_limited() {
        let transport = MockTransport::default().with("P1", TransportResponse::new(429, ""));
        let fetcher = DocumentFetcher::with_transport(transport, &config());

        let err = fetcher.try_fetch_document("P1").await.unwrap_err();
        assert!(matches!(err, FilingError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn test_fetch_document_bad_envelope() {
        let transport = MockTransport::default()
            .with("P1", TransportResponse::new(200, "<html></html>"))
            .with("P2", TransportResponse::new(200, r#"{"d": "not base64!"}"#));
        let fetcher = DocumentFetcher::with_transport(transport, &config());

        assert!(matches!(
            fetcher.try_fetch_document("P1").await,
            Err(FilingError::Parse(_))
        ));
        assert!(matches!(
            fetcher.try_fetch_document("P2").await,
            Err(FilingError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_batch_skips_failed_rows() {
        let transport = MockTransport::default()
            .with("P1", ok_body(b"first"))
            .with("P2", TransportResponse::new(500, ""))
            .with("P3", ok_body(b"third"));
        let fetcher = DocumentFetcher::with_transport(transport, &config());
        let rows = vec![
            row("009512", "P1", "11"),
            row("021610", "P2", "22"),
            row("024600", "P3", "33"),
        ];

        let batch = fetch_all_documents(&fetcher, &rows).await;

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.items[0].payload, b"first");
        assert_eq!(batch.items[1].payload, b"third");

        let first = &batch.items[0].identity;
        assert_eq!(first.filer_code.as_str(), "009512");
        assert_eq!(first.document, "Fato Relevante");
        assert_eq!(first.reference_date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(first.delivery_date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(first.version, 3);
        assert_eq!(first.protocol_key(), "P1/11");
        assert_eq!(batch.items[1].identity.filer_code.as_str(), "024600");

        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].index, 1);
        assert_eq!(
            batch.skipped[0].reason,
            SkipReason::Failed(FilingError::NotFound { status: 500 })
        );
    }

    #[tokio::test]
    async fn test_batch_skips_empty_payload() {
        let transport = MockTransport::default().with("P1", ok_body(b""));
        let fetcher = DocumentFetcher::with_transport(transport, &config());

        let batch = fetcher.fetch_documents(&[row("009512", "P1", "1")]).await;
        assert!(batch.is_empty());
        assert_eq!(batch.skipped[0].reason, SkipReason::Empty);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_pauses_after_every_fetch() {
        let transport = MockTransport::default()
            .with("P1", ok_body(b"first"))
            .with("P2", TransportResponse::new(500, ""))
            .with("P3", ok_body(b"third"));
        let config =
            CvmFeedConfig::default().with_rate_policy(RatePolicy::fixed(Duration::from_secs(5)));
        let fetcher = DocumentFetcher::with_transport(transport, &config);
        let rows = vec![
            row("009512", "P1", "11"),
            row("021610", "P2", "22"),
            row("024600", "P3", "33"),
        ];

        let started = Instant::now();
        let batch = fetcher.fetch_documents(&rows).await;

        assert_eq!(batch.len(), 2);
        assert_eq!(started.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_fetch_does_not_pause() {
        let transport = MockTransport::default().with("P1", ok_body(b"x"));
        let fetcher = DocumentFetcher::with_transport(transport, &CvmFeedConfig::default());

        let started = Instant::now();
        fetcher.fetch_document("P1").await;
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_adaptive_policy_waits() {
        let transport = MockTransport::default()
            .with("P1", TransportResponse::new(429, ""))
            .with("P2", TransportResponse::new(429, ""))
            .with("P3", ok_body(b"third"));
        let config = CvmFeedConfig::default().with_rate_policy(RatePolicy::adaptive(
            Duration::from_millis(1),
            Duration::from_millis(8),
        ));
        let fetcher = DocumentFetcher::with_transport(transport, &config);

        let started = Instant::now();
        fetcher.fetch_documents(&[row("009512", "P1", "1")]).await;
        assert_eq!(started.elapsed(), Duration::from_millis(2));

        fetcher.fetch_documents(&[row("009512", "P2", "2")]).await;
        assert_eq!(started.elapsed(), Duration::from_millis(6));

        // Instant responses bring the pause back down to the base.
        fetcher.fetch_documents(&[row("009512", "P3", "3")]).await;
        assert_eq!(started.elapsed(), Duration::from_millis(7));
    }

    #[tokio::test]
    async fn test_adaptive_policy_widens_after_throttle() {
        let transport = MockTransport::default().with("P1", TransportResponse::new(429, ""));
        let config = CvmFeedConfig::default().with_rate_policy(RatePolicy::adaptive(
            Duration::from_millis(1),
            Duration::from_millis(8),
        ));
        let fetcher = DocumentFetcher::with_transport(transport, &config);

        fetcher.fetch_document("P1").await;
        assert_eq!(fetcher.current_delay().await, Duration::from_millis(2));
    }
}
