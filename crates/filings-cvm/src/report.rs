//! Structured report normalization.
//!
//! The report service returns each statement as a loosely shaped table. Plain
//! statements have exactly four columns (account, description, value,
//! currency). Statements with a detail dimension, such as the statement of
//! changes in equity, carry one value column per detail alongside `conta`,
//! `descricao` and `currency_unit`; those are unpivoted into one line per
//! (row, value column) with the column name as detail tag.
//!
//! Every statement is reduced to [`AccountingLine`]s with:
//!
//! - account segments zero-padded to width 3, padded with `000` to at least 4 segments
//! - description ASCII-folded, uppercased, with underscores for spaces
//! - value rounded to 2 decimals, missing values as 0
//! - `"Reais Mil"` rewritten as `"(Mil)R$"` in the currency unit

use async_trait::async_trait;
use filings_core::{
    AccountingLine, FilingError, FilingRecord, RawStatement, RawValue, ReportLine, ReportService,
    Result, StatementKind,
};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::batch::{Batch, RowFetcher, run_batch};
use crate::text::{column_key, description_key};

/// Minimum number of segments of a normalized account code.
const ACCOUNT_SEGMENTS: usize = 4;

/// Width of each account code segment.
const SEGMENT_WIDTH: usize = 3;

/// Key columns of statements with a detail dimension.
const ACCOUNT_COLUMN: &str = "conta";
const DESCRIPTION_COLUMN: &str = "descricao";
const CURRENCY_COLUMN: &str = "currency_unit";

/// Fetches structured reports and normalizes their statements.
#[derive(Debug, Clone)]
pub struct ReportNormalizer {
    service: Arc<dyn ReportService>,
}

impl ReportNormalizer {
    /// Creates a normalizer over a report service.
    #[must_use]
    pub fn new(service: Arc<dyn ReportService>) -> Self {
        Self { service }
    }

    /// Fetches and normalizes every whitelisted statement of a filing.
    ///
    /// Statements the filing does not carry are skipped, as are malformed ones
    /// (logged at `warn`).
    ///
    /// # Errors
    ///
    /// - any error of the report service
    /// - [`FilingError::NoStructuredData`] if none of the statements came back
    #[instrument(skip(self, record), fields(filing = %record.identity()))]
    pub async fn try_normalize_report(&self, record: &FilingRecord) -> Result<Vec<ReportLine>> {
        let names = StatementKind::source_names();
        let reports = self
            .service
            .fetch_report(&record.document_sequence, record.institution_type, &names)
            .await?;

        if !StatementKind::ALL
            .iter()
            .any(|kind| reports.contains_key(kind.source_name()))
        {
            return Err(FilingError::NoStructuredData(record.document_sequence.clone()));
        }

        let identity = record.identity();
        let mut lines = Vec::new();
        for kind in StatementKind::ALL {
            let Some(raw) = reports.get(kind.source_name()) else {
                debug!(statement = kind.label(), "Statement not present");
                continue;
            };

            match normalize_statement(raw) {
                Ok(statement) => {
                    debug!(statement = kind.label(), lines = statement.len(), "Normalized statement");
                    lines.extend(statement.into_iter().map(|line| ReportLine {
                        identity: identity.clone(),
                        structure: kind,
                        line,
                    }));
                }
                Err(e) => {
                    warn!(statement = kind.label(), error = %e, "Skipping malformed statement");
                }
            }
        }

        Ok(lines)
    }

    /// Fetches and normalizes a filing, returning no lines on any failure.
    pub async fn normalize_report(&self, record: &FilingRecord) -> Vec<ReportLine> {
        self.try_normalize_report(record).await.unwrap_or_else(|e| {
            warn!(error = %e, "No structured data for filing");
            Vec::new()
        })
    }

    /// Normalizes the report of every row.
    pub async fn normalize_reports(&self, rows: &[FilingRecord]) -> Batch<ReportLine> {
        run_batch(self, rows).await
    }
}

#[async_trait]
impl RowFetcher for ReportNormalizer {
    type Item = ReportLine;

    async fn fetch_row(&self, record: &FilingRecord) -> Result<Vec<ReportLine>> {
        match self.try_normalize_report(record).await {
            Err(FilingError::NoStructuredData(_)) => Ok(Vec::new()),
            result => result,
        }
    }
}

/// A line before account, value and currency normalization.
struct StagedLine<'a> {
    account: &'a RawValue,
    description: &'a RawValue,
    value: &'a RawValue,
    currency: &'a RawValue,
    detail: String,
}

/// Normalizes one raw statement table.
///
/// # Errors
///
/// Returns [`FilingError::Parse`] if the table has fewer than four columns, a
/// detail table lacks one of its key columns, or a value is non-numeric text.
pub fn normalize_statement(raw: &RawStatement) -> Result<Vec<AccountingLine>> {
    let staged = stage(raw)?;

    let accounts: Vec<Vec<String>> = staged
        .iter()
        .map(|line| account_segments(line.account))
        .collect();
    let width = accounts
        .iter()
        .map(Vec::len)
        .max()
        .unwrap_or(0)
        .max(ACCOUNT_SEGMENTS);

    staged
        .into_iter()
        .zip(accounts)
        .map(|(line, mut segments)| {
            segments.resize(width, "0".repeat(SEGMENT_WIDTH));
            Ok(AccountingLine {
                account: segments.join("."),
                description: description_key(&line.description.as_text().unwrap_or_default()),
                detail: line.detail,
                value: coerce_value(line.value)?,
                currency: line
                    .currency
                    .as_text()
                    .unwrap_or_default()
                    .replace("Reais Mil", "(Mil)R$"),
            })
        })
        .collect()
}

/// Lays out the lines of a raw table according to its shape.
fn stage(raw: &RawStatement) -> Result<Vec<StagedLine<'_>>> {
    let width = raw.width();

    if width == 4 {
        return Ok((0..raw.height())
            .map(|row| StagedLine {
                account: raw.cell(row, 0),
                description: raw.cell(row, 1),
                value: raw.cell(row, 2),
                currency: raw.cell(row, 3),
                detail: AccountingLine::NO_DETAIL.to_string(),
            })
            .collect());
    }

    if width < 4 {
        return Err(FilingError::Parse(format!(
            "Statement has {width} columns, expected at least 4"
        )));
    }

    let keys: Vec<String> = raw.columns.iter().map(|c| column_key(c)).collect();
    let position = |name: &str| {
        keys.iter()
            .position(|key| key == name)
            .ok_or_else(|| FilingError::Parse(format!("Detail statement lacks column '{name}'")))
    };
    let account = position(ACCOUNT_COLUMN)?;
    let description = position(DESCRIPTION_COLUMN)?;
    let currency = position(CURRENCY_COLUMN)?;

    let mut staged = Vec::new();
    for (column, key) in keys.iter().enumerate() {
        if [ACCOUNT_COLUMN, DESCRIPTION_COLUMN, CURRENCY_COLUMN].contains(&key.as_str()) {
            continue;
        }
        let detail = key.to_uppercase();
        staged.extend((0..raw.height()).map(|row| StagedLine {
            account: raw.cell(row, account),
            description: raw.cell(row, description),
            value: raw.cell(row, column),
            currency: raw.cell(row, currency),
            detail: detail.clone(),
        }));
    }
    Ok(staged)
}

/// Splits an account code into zero-padded segments.
fn account_segments(account: &RawValue) -> Vec<String> {
    let code = match account {
        RawValue::Null => String::new(),
        RawValue::Text(s) => s.clone(),
        RawValue::Number(n) => n.to_string(),
    };
    code.split('.')
        .map(|segment| format!("{:0>width$}", segment.trim(), width = SEGMENT_WIDTH))
        .collect()
}

/// Converts a raw value to a float rounded to 2 decimals; missing values are 0.
fn coerce_value(value: &RawValue) -> Result<f64> {
    let number = match value {
        RawValue::Null => 0.0,
        RawValue::Number(n) if n.is_nan() => 0.0,
        RawValue::Number(n) => *n,
        RawValue::Text(s) if s.trim().is_empty() => 0.0,
        RawValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| FilingError::Parse(format!("Non-numeric value '{s}': {e}")))?,
    };
    Ok((number * 100.0).round() / 100.0)
}
