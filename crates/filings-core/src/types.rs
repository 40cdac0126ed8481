//! Core data types for regulatory filings.
//!
//! This module defines the records flowing through the feed:
//!
//! - [`FilerCode`] - Regulator-assigned filer identifier
//! - [`FilingRecord`] - One row of filing search results
//! - [`RawStatement`] - A statement table as returned by the report service
//! - [`AccountingLine`] - A normalized statement line
//! - [`DocumentFile`] / [`ReportLine`] / [`FilingDocument`] - Fetch outputs
//! - [`DocumentCategory`] / [`FilerListing`] - Reference lookups

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::identity::FilingIdentity;
use crate::statement::{DocumentKind, StatementKind};

/// A filer code assigned by the regulator.
///
/// Codes are whitespace-trimmed on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FilerCode(String);

impl FilerCode {
    /// Creates a new filer code from a string, trimming whitespace.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_string())
    }

    /// Returns the filer code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FilerCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for FilerCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FilerCode {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// One row of filing search results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingRecord {
    /// Filer that delivered the document.
    pub filer_code: FilerCode,
    /// Category code (e.g. `EST_4`, `IPE_1`).
    pub category_code: String,
    /// Category description, formatted as `"category - subcategory"`.
    pub category: String,
    /// Document type tag; empty for most structured filings.
    pub document_type: String,
    /// Reference date of the filing.
    pub reference_date: NaiveDate,
    /// Timestamp at which the filing was delivered.
    pub delivered_at: NaiveDateTime,
    /// Version number of the filing.
    pub version: u32,
    /// Protocol number addressing the binary document.
    pub protocol: String,
    /// Sequence number of the filing.
    pub sequence: String,
    /// Document sequence number addressing the structured report.
    pub document_sequence: String,
    /// Institution type code used by the report service.
    pub institution_type: u32,
}

impl FilingRecord {
    /// Creates a new record with required fields.
    ///
    /// Category fields start empty, the version at 1 and the institution type at 1.
    #[must_use]
    pub fn new(
        filer_code: impl Into<FilerCode>,
        protocol: impl Into<String>,
        sequence: impl Into<String>,
        reference_date: NaiveDate,
        delivered_at: NaiveDateTime,
    ) -> Self {
        let sequence = sequence.into();
        Self {
            filer_code: filer_code.into(),
            category_code: String::new(),
            category: String::new(),
            document_type: String::new(),
            reference_date,
            delivered_at,
            version: 1,
            protocol: protocol.into(),
            document_sequence: sequence.clone(),
            sequence,
            institution_type: 1,
        }
    }

    /// Sets the category code and description.
    #[must_use]
    pub fn with_category(mut self, code: impl Into<String>, description: impl Into<String>) -> Self {
        self.category_code = code.into();
        self.category = description.into();
        self
    }

    /// Sets the document type tag.
    #[must_use]
    pub fn with_document_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = document_type.into();
        self
    }

    /// Sets the version number.
    #[must_use]
    pub const fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Sets the report-service address of the filing.
    #[must_use]
    pub fn with_report_address(
        mut self,
        document_sequence: impl Into<String>,
        institution_type: u32,
    ) -> Self {
        self.document_sequence = document_sequence.into();
        self.institution_type = institution_type;
        self
    }

    /// Returns the document label: the type tag, or the leading segment of the
    /// category description when the tag is empty.
    #[must_use]
    pub fn document_label(&self) -> String {
        let tag = self.document_type.trim();
        if tag.is_empty() {
            self.category
                .split(" - ")
                .next()
                .unwrap_or_default()
                .to_string()
        } else {
            self.document_type.clone()
        }
    }

    /// Returns whether the filing carries structured statements.
    #[must_use]
    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_category_code(&self.category_code)
    }

    /// Returns true if the filing should go through the report normalizer.
    #[must_use]
    pub fn is_structured(&self) -> bool {
        self.kind() == DocumentKind::Structured
    }

    /// Returns the structured identity of this filing.
    #[must_use]
    pub fn identity(&self) -> FilingIdentity {
        FilingIdentity {
            filer_code: self.filer_code.clone(),
            document: self.document_label(),
            reference_date: self.reference_date,
            delivery_date: self.delivered_at.date(),
            version: self.version,
            protocol: self.protocol.clone(),
            sequence: self.sequence.clone(),
        }
    }

    /// Returns the composite id of this filing.
    ///
    /// See [`FilingIdentity::composite_id`] for the format and its limits.
    #[must_use]
    pub fn composite_id(&self) -> String {
        self.identity().composite_id()
    }
}

/// A raw cell of a statement table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Missing value.
    #[default]
    Null,
    /// Numeric value.
    Number(f64),
    /// Textual value.
    Text(String),
}

impl RawValue {
    /// Returns the cell rendered as text, `None` when missing.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Number(n) => Some(n.to_string()),
            Self::Text(s) => Some(s.clone()),
        }
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<T: Into<Self>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A statement table as returned by the report service.
///
/// Columns are addressed by position; rows shorter than the header read as
/// missing values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStatement {
    /// Column names, in source order.
    pub columns: Vec<String>,
    /// Data rows.
    pub rows: Vec<Vec<RawValue>>,
}

impl RawStatement {
    /// Creates an empty table with the given header.
    #[must_use]
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row.
    #[must_use]
    pub fn with_row<V: Into<RawValue>>(mut self, row: impl IntoIterator<Item = V>) -> Self {
        self.rows.push(row.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Returns the cell at `row`, `column`, or [`RawValue::Null`] if absent.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> &RawValue {
        const NULL: &RawValue = &RawValue::Null;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(NULL)
    }
}

/// A normalized line of a financial statement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountingLine {
    /// Account code, e.g. `"001.002.000.000"`.
    pub account: String,
    /// Description, uppercased ASCII with underscores.
    pub description: String,
    /// Detail dimension, `"-"` when the statement has none.
    pub detail: String,
    /// Value rounded to two decimals.
    pub value: f64,
    /// Currency unit, e.g. `"(Mil)R$"`.
    pub currency: String,
}

impl AccountingLine {
    /// Detail tag of statements without a detail dimension.
    pub const NO_DETAIL: &'static str = "-";
}

/// A decoded unstructured document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFile {
    /// Identity of the filing the document belongs to.
    pub identity: FilingIdentity,
    /// Raw document bytes (usually a PDF).
    pub payload: Vec<u8>,
}

/// A normalized statement line tagged with its filing and statement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportLine {
    /// Identity of the filing the line belongs to.
    pub identity: FilingIdentity,
    /// Statement the line comes from.
    pub structure: StatementKind,
    /// The line itself.
    pub line: AccountingLine,
}

/// The content retrieved for one filing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FilingDocument {
    /// A binary document.
    Unstructured(DocumentFile),
    /// Normalized statement lines.
    Structured(Vec<ReportLine>),
}

impl FilingDocument {
    /// Returns true if the document holds no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Unstructured(file) => file.payload.is_empty(),
            Self::Structured(lines) => lines.is_empty(),
        }
    }
}

/// A document category published by the regulator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCategory {
    /// Category code.
    pub code: String,
    /// Human-readable description.
    pub description: String,
    /// Structured or eventual.
    pub kind: DocumentKind,
}

impl DocumentCategory {
    /// Creates a category, deriving its kind from the code.
    #[must_use]
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        let code = code.into();
        let kind = DocumentKind::from_category_code(&code);
        Self {
            code,
            description: description.into(),
            kind,
        }
    }
}

/// A filer known to the regulator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilerListing {
    /// Filer code.
    pub code: FilerCode,
    /// Registered firm name.
    pub firm_name: String,
    /// Registration status, `"-"` when not reported.
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> FilingRecord {
        FilingRecord::new(
            "009512",
            "009512IPE310320240100512345-67",
            "12345",
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 20)
                .unwrap()
                .and_hms_opt(18, 5, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_filer_code_trimmed() {
        let code = FilerCode::new("  009512 ");
        assert_eq!(code.as_str(), "009512");
        assert_eq!(code.to_string(), "009512");
    }

    #[test]
    fn test_document_label_prefers_type() {
        let rec = record()
            .with_category("IPE_1", "Fato Relevante - Outros")
            .with_document_type("Comunicado");
        assert_eq!(rec.document_label(), "Comunicado");
    }

    #[test]
    fn test_document_label_falls_back_to_category() {
        let rec = record().with_category("EST_4", "DFP - Demonstrações Financeiras Padronizadas");
        assert_eq!(rec.document_label(), "DFP");
        assert!(rec.is_structured());

        let blank = record()
            .with_category("EST_3", "ITR")
            .with_document_type("   ");
        assert_eq!(blank.document_label(), "ITR");
    }

    #[test]
    fn test_identity_uses_delivery_date() {
        let identity = record().with_version(2).identity();
        assert_eq!(identity.delivery_date, NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());
        assert_eq!(identity.version, 2);
        assert_eq!(identity.sequence, "12345");
    }

    #[test]
    fn test_raw_statement_cells() {
        let raw = RawStatement::new(["conta", "descricao", "valor", "moeda"])
            .with_row([RawValue::from("1"), "Ativo".into(), 10.0.into()]);
        assert_eq!(raw.width(), 4);
        assert_eq!(raw.height(), 1);
        assert_eq!(raw.cell(0, 2), &RawValue::Number(10.0));
        assert_eq!(raw.cell(0, 3), &RawValue::Null);
        assert_eq!(raw.cell(5, 0), &RawValue::Null);
    }

    #[test]
    fn test_category_kind() {
        let cat = DocumentCategory::new("EST_4", "DFP");
        assert_eq!(cat.kind, DocumentKind::Structured);
        let cat = DocumentCategory::new("IPE_4_-1_-1", "Fato Relevante");
        assert_eq!(cat.kind, DocumentKind::Eventual);
    }
}
