//! DataFrame export of feed results.
//!
//! Identity-tagged results share the leading columns `filer_code`, `document`,
//! `reference_date`, `delivery_date`, `version` and `protocol`, where
//! `protocol` is `"{protocol}/{sequence}"`.

use chrono::NaiveDate;
use filings_core::{
    DocumentCategory, DocumentFile, FilerListing, FilingError, FilingIdentity, ReportLine, Result,
};
use polars::prelude::*;

use crate::batch::Batch;

/// Conversion of feed results into a [`DataFrame`].
pub trait ToFrame {
    /// Builds a DataFrame with one row per item.
    ///
    /// # Errors
    ///
    /// Returns [`FilingError::Other`] if polars rejects the columns.
    fn to_frame(&self) -> Result<DataFrame>;
}

impl ToFrame for [DocumentFile] {
    fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = identity_columns(self.iter().map(|file| &file.identity))?;
        let payloads: Vec<&[u8]> = self.iter().map(|file| file.payload.as_slice()).collect();
        columns.push(Column::new("file".into(), payloads));
        frame(columns)
    }
}

impl ToFrame for [ReportLine] {
    fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = identity_columns(self.iter().map(|line| &line.identity))?;

        let structures: Vec<&str> = self.iter().map(|l| l.structure.label()).collect();
        let accounts: Vec<&str> = self.iter().map(|l| l.line.account.as_str()).collect();
        let descriptions: Vec<&str> = self.iter().map(|l| l.line.description.as_str()).collect();
        let details: Vec<&str> = self.iter().map(|l| l.line.detail.as_str()).collect();
        let values: Vec<f64> = self.iter().map(|l| l.line.value).collect();
        let currencies: Vec<&str> = self.iter().map(|l| l.line.currency.as_str()).collect();

        columns.extend([
            Column::new("structure".into(), structures),
            Column::new("account".into(), accounts),
            Column::new("description".into(), descriptions),
            Column::new("detail".into(), details),
            Column::new("value".into(), values),
            Column::new("currency".into(), currencies),
        ]);
        frame(columns)
    }
}

impl ToFrame for [DocumentCategory] {
    fn to_frame(&self) -> Result<DataFrame> {
        let codes: Vec<&str> = self.iter().map(|c| c.code.as_str()).collect();
        let descriptions: Vec<&str> = self.iter().map(|c| c.description.as_str()).collect();
        let kinds: Vec<&str> = self.iter().map(|c| c.kind.as_str()).collect();

        frame(vec![
            Column::new("code".into(), codes),
            Column::new("description".into(), descriptions),
            Column::new("kind".into(), kinds),
        ])
    }
}

impl ToFrame for [FilerListing] {
    fn to_frame(&self) -> Result<DataFrame> {
        let codes: Vec<&str> = self.iter().map(|f| f.code.as_str()).collect();
        let names: Vec<&str> = self.iter().map(|f| f.firm_name.as_str()).collect();
        let statuses: Vec<&str> = self.iter().map(|f| f.status.as_str()).collect();

        frame(vec![
            Column::new("code".into(), codes),
            Column::new("firm_name".into(), names),
            Column::new("status".into(), statuses),
        ])
    }
}

impl<T> Batch<T>
where
    [T]: ToFrame,
{
    /// Builds a DataFrame of the batch items; skipped rows are left out.
    ///
    /// # Errors
    ///
    /// Returns [`FilingError::Other`] if polars rejects the columns.
    pub fn to_frame(&self) -> Result<DataFrame> {
        self.items.as_slice().to_frame()
    }
}

fn identity_columns<'a>(
    identities: impl Iterator<Item = &'a FilingIdentity>,
) -> Result<Vec<Column>> {
    let identities: Vec<&FilingIdentity> = identities.collect();

    let filers: Vec<&str> = identities.iter().map(|id| id.filer_code.as_str()).collect();
    let documents: Vec<&str> = identities.iter().map(|id| id.document.as_str()).collect();
    let reference_dates: Vec<i32> = identities
        .iter()
        .map(|id| days_since_epoch(id.reference_date))
        .collect();
    let delivery_dates: Vec<i32> = identities
        .iter()
        .map(|id| days_since_epoch(id.delivery_date))
        .collect();
    let versions: Vec<u32> = identities.iter().map(|id| id.version).collect();
    let protocols: Vec<String> = identities.iter().map(|id| id.protocol_key()).collect();

    Ok(vec![
        Column::new("filer_code".into(), filers),
        Column::new("document".into(), documents),
        date_column("reference_date", reference_dates)?,
        date_column("delivery_date", delivery_dates)?,
        Column::new("version".into(), versions),
        Column::new("protocol".into(), protocols),
    ])
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    (date - NaiveDate::default()).num_days() as i32
}

fn date_column(name: &str, days: Vec<i32>) -> Result<Column> {
    Column::new(name.into(), days)
        .cast(&DataType::Date)
        .map_err(|e| FilingError::Other(e.to_string()))
}

fn frame(columns: Vec<Column>) -> Result<DataFrame> {
    DataFrame::new(columns).map_err(|e| FilingError::Other(e.to_string()))
}
