//! Filing feed facade combining search, documents, reports and lookups.

use std::sync::Arc;

use tracing::{debug, instrument};

use filings_core::{
    CategoryService, DocumentCategory, DocumentFile, FilerListing, FilingDocument, FilingRecord,
    FilingSearchService, ReportLine, ReportService, Result, SearchRequest,
};
use filings_cvm::{
    Batch, CvmFeedConfig, DocumentFetcher, DocumentTransport, HttpTransport, ReportNormalizer,
};

/// Entry point to a regulator's filings.
///
/// The feed talks to the regulator through three services (search, structured
/// reports and reference listings) and downloads unstructured documents over
/// a [`DocumentTransport`]. Every batch call is sequential, and document
/// downloads are paced by the configured rate policy.
///
/// # Example
///
/// ```rust,ignore
/// use filings::{CvmFeedConfig, FilingsFeed, SearchRequest, ToFrame};
/// use std::sync::Arc;
///
/// let client = Arc::new(MyCvmClient::new());
/// let feed = FilingsFeed::new(client.clone(), client.clone(), client, &CvmFeedConfig::default());
///
/// let rows = feed
///     .history(&SearchRequest::new("009512").with_categories(["EST_4"]))
///     .await;
/// let reports = feed.reports(&rows).await;
/// println!("{}", reports.to_frame()?);
/// ```
pub struct FilingsFeed<T = HttpTransport> {
    search: Arc<dyn FilingSearchService>,
    categories: Arc<dyn CategoryService>,
    reports: ReportNormalizer,
    documents: DocumentFetcher<T>,
}

impl<T> std::fmt::Debug for FilingsFeed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilingsFeed")
            .field("search", &self.search.name())
            .field("categories", &self.categories.name())
            .field("reports", &self.reports)
            .finish_non_exhaustive()
    }
}

impl FilingsFeed<HttpTransport> {
    /// Creates a feed downloading documents over HTTP.
    #[must_use]
    pub fn new(
        search: Arc<dyn FilingSearchService>,
        reports: Arc<dyn ReportService>,
        categories: Arc<dyn CategoryService>,
        config: &CvmFeedConfig,
    ) -> Self {
        Self::with_transport(search, reports, categories, HttpTransport::new(config), config)
    }
}

impl<T: DocumentTransport> FilingsFeed<T> {
    /// Creates a feed downloading documents over a custom transport.
    #[must_use]
    pub fn with_transport(
        search: Arc<dyn FilingSearchService>,
        reports: Arc<dyn ReportService>,
        categories: Arc<dyn CategoryService>,
        transport: T,
        config: &CvmFeedConfig,
    ) -> Self {
        debug!(
            search = search.name(),
            reports = reports.name(),
            categories = categories.name(),
            "Creating filings feed"
        );
        Self {
            search,
            categories,
            reports: ReportNormalizer::new(reports),
            documents: DocumentFetcher::with_transport(transport, config),
        }
    }

    /// Searches filings, returning an empty result once retries run out.
    pub async fn history(&self, request: &SearchRequest) -> Vec<FilingRecord> {
        filings_cvm::search(self.search.as_ref(), request).await
    }

    /// Searches filings, surfacing retry exhaustion.
    ///
    /// # Errors
    ///
    /// Returns [`FilingError::RetriesExhausted`](filings_core::FilingError::RetriesExhausted)
    /// once every attempt failed.
    pub async fn try_history(&self, request: &SearchRequest) -> Result<Vec<FilingRecord>> {
        filings_cvm::try_search(self.search.as_ref(), request).await
    }

    /// Downloads the unstructured document of every row.
    pub async fn documents(&self, rows: &[FilingRecord]) -> Batch<DocumentFile> {
        self.documents.fetch_documents(rows).await
    }

    /// Normalizes the structured report of every row.
    pub async fn reports(&self, rows: &[FilingRecord]) -> Batch<ReportLine> {
        self.reports.normalize_reports(rows).await
    }

    /// Lists the document categories.
    ///
    /// # Errors
    ///
    /// Returns the category service's error.
    pub async fn categories(&self) -> Result<Vec<DocumentCategory>> {
        filings_cvm::categories(self.categories.as_ref()).await
    }

    /// Lists the registered filers.
    ///
    /// # Errors
    ///
    /// Returns the category service's error.
    pub async fn filer_codes(&self) -> Result<Vec<FilerListing>> {
        filings_cvm::filer_codes(self.categories.as_ref()).await
    }

    /// Retrieves the content of one filing.
    ///
    /// Structured filings are normalized into report lines, all others are
    /// downloaded as documents. Returns `None` if the filing has no content
    /// or could not be retrieved.
    #[instrument(skip(self, record), fields(filing = %record.identity()))]
    pub async fn fetch(&self, record: &FilingRecord) -> Option<FilingDocument> {
        let document = if record.is_structured() {
            FilingDocument::Structured(self.reports.normalize_report(record).await)
        } else {
            let payload = self.documents.fetch_document(&record.protocol).await?;
            FilingDocument::Unstructured(DocumentFile {
                identity: record.identity(),
                payload,
            })
        };

        if document.is_empty() {
            debug!("Filing has no content");
            return None;
        }
        Some(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use chrono::NaiveDate;
    use filings_core::{FilingError, RawStatement, RawValue, RegulatorService, StatementKind};
    use filings_cvm::{RatePolicy, SkipReason, TransportResponse};
    use std::collections::HashMap;
    use std::time::Duration;

    /// One fake client implementing every regulator service.
    #[derive(Debug, Default)]
    struct MockClient;

    impl RegulatorService for MockClient {
        fn name(&self) -> &str {
            "mock-cvm"
        }
    }

    #[async_trait]
    impl FilingSearchService for MockClient {
        async fn search(&self, request: &SearchRequest) -> Result<Vec<FilingRecord>> {
            if request.filer_code.as_str() == "000000" {
                return Err(FilingError::Service("search unavailable".to_string()));
            }
            Ok(vec![
                record("EST_4", "DFP - Demonstrações Financeiras Padronizadas", "P1", "10"),
                record("IPE_4", "Fato Relevante", "P2", "20"),
            ])
        }
    }

    #[async_trait]
    impl ReportService for MockClient {
        async fn fetch_report(
            &self,
            document_sequence: &str,
            _institution_type: u32,
            _statements: &[&str],
        ) -> Result<HashMap<String, RawStatement>> {
            if document_sequence != "10" {
                return Ok(HashMap::new());
            }
            let statement = RawStatement::new(["Conta", "Descrição", "Valor", "Moeda"])
                .with_row([
                    RawValue::from("1"),
                    RawValue::from("Ativo Total"),
                    RawValue::from(1500.0),
                    RawValue::from("Reais Mil"),
                ]);
            Ok(HashMap::from([(
                StatementKind::ALL[0].source_name().to_string(),
                statement,
            )]))
        }
    }

    #[async_trait]
    impl CategoryService for MockClient {
        async fn categories(&self) -> Result<HashMap<String, String>> {
            Ok(HashMap::from([("EST_4".to_string(), "DFP".to_string())]))
        }

        async fn filer_codes(&self) -> Result<HashMap<String, String>> {
            Ok(HashMap::from([(
                "009512".to_string(),
                "PETROLEO BRASILEIRO S.A. (ATIVO)".to_string(),
            )]))
        }
    }

    /// Transport serving a document for protocol `P2` only.
    #[derive(Debug)]
    struct MockTransport;

    #[async_trait]
    impl DocumentTransport for MockTransport {
        async fn post_json(
            &self,
            _url: &str,
            body: &serde_json::Value,
        ) -> Result<TransportResponse> {
            if body["numeroProtocolo"] == "P2" {
                let envelope = serde_json::json!({ "d": STANDARD.encode(b"%PDF") });
                Ok(TransportResponse::new(200, envelope.to_string()))
            } else {
                Ok(TransportResponse::new(404, ""))
            }
        }
    }

    fn record(category: &str, description: &str, protocol: &str, sequence: &str) -> FilingRecord {
        FilingRecord::new(
            "009512",
            protocol,
            sequence,
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 20)
                .unwrap()
                .and_hms_opt(18, 5, 0)
                .unwrap(),
        )
        .with_category(category, description)
    }

    fn feed() -> FilingsFeed<MockTransport> {
        let client = Arc::new(MockClient);
        let config = CvmFeedConfig::default().with_rate_policy(RatePolicy::fixed(Duration::ZERO));
        FilingsFeed::with_transport(client.clone(), client.clone(), client, MockTransport, &config)
    }

    #[tokio::test]
    async fn test_history() {
        let feed = feed();
        let rows = feed.history(&SearchRequest::new("009512")).await;
        assert_eq!(rows.len(), 2);

        let failing = SearchRequest::new("000000").with_max_retries(1);
        assert!(feed.history(&failing).await.is_empty());
        assert!(matches!(
            feed.try_history(&failing).await,
            Err(FilingError::RetriesExhausted { attempts: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_dispatches_on_kind() {
        let feed = feed();
        let rows = feed.history(&SearchRequest::new("009512")).await;

        match feed.fetch(&rows[0]).await {
            Some(FilingDocument::Structured(lines)) => {
                assert_eq!(lines.len(), 1);
                assert_eq!(lines[0].line.account, "001.000.000.000");
                assert_eq!(lines[0].line.currency, "(Mil)R$");
                assert_eq!(lines[0].identity.document, "DFP");
            }
            other => panic!("expected structured document, got {other:?}"),
        }

        match feed.fetch(&rows[1]).await {
            Some(FilingDocument::Unstructured(file)) => {
                assert_eq!(file.payload, b"%PDF");
                assert_eq!(file.identity.protocol_key(), "P2/20");
            }
            other => panic!("expected unstructured document, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_without_content() {
        let feed = feed();
        let missing = record("IPE_4", "Fato Relevante", "P9", "90");
        assert_eq!(feed.fetch(&missing).await, None);

        let empty_report = record("EST_3", "ITR", "P8", "80");
        assert_eq!(feed.fetch(&empty_report).await, None);
    }

    #[tokio::test]
    async fn test_batches() {
        let feed = feed();
        let rows = feed.history(&SearchRequest::new("009512")).await;

        let documents = feed.documents(&rows).await;
        assert_eq!(documents.len(), 1);
        assert_eq!(documents.skipped[0].index, 0);
        assert_eq!(
            documents.skipped[0].reason,
            SkipReason::Failed(FilingError::NotFound { status: 404 })
        );

        let reports = feed.reports(&rows).await;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports.skipped[0].index, 1);
        assert_eq!(reports.skipped[0].reason, SkipReason::Empty);
    }

    #[tokio::test]
    async fn test_lookups() {
        let feed = feed();
        let categories = feed.categories().await.unwrap();
        assert_eq!(categories[0].code, "EST_4");

        let filers = feed.filer_codes().await.unwrap();
        assert_eq!(filers[0].firm_name, "PETROLEO BRASILEIRO S.A.");
        assert_eq!(filers[0].status, "ATIVO");
    }

    #[test]
    fn test_debug_lists_services() {
        let debug = format!("{:?}", feed());
        assert!(debug.contains("mock-cvm"));
    }
}
