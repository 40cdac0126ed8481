//! Categorical lookups: document categories and registered filers.

use std::sync::LazyLock;

use filings_core::{
    CategoryService, DocumentCategory, FilerCode, FilerListing, FilingError, Result,
};
use regex::Regex;
use tracing::debug;

/// Registration status appended to filer labels, e.g. `"ACME S.A. (CANCELADA)"`.
const STATUS_PATTERN: &str = r"\((.*?)\)";

static STATUS_RE: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(STATUS_PATTERN));

/// Status reported for filers whose label carries none.
pub const NO_STATUS: &str = "-";

/// Lists the document categories, sorted by code.
///
/// # Errors
///
/// Returns the service's error unchanged.
pub async fn categories(service: &dyn CategoryService) -> Result<Vec<DocumentCategory>> {
    let mut categories: Vec<DocumentCategory> = service
        .categories()
        .await?
        .into_iter()
        .map(|(code, description)| DocumentCategory::new(code, description))
        .collect();
    categories.sort_by(|a, b| a.code.cmp(&b.code));

    debug!(count = categories.len(), "Loaded document categories");
    Ok(categories)
}

/// Lists the registered filers, sorted by code.
///
/// # Errors
///
/// Returns the service's error unchanged.
pub async fn filer_codes(service: &dyn CategoryService) -> Result<Vec<FilerListing>> {
    let status_re = status_regex()?;
    let mut listings: Vec<FilerListing> = service
        .filer_codes()
        .await?
        .into_iter()
        .map(|(code, label)| {
            let (firm_name, status) = split_label(status_re, &label);
            FilerListing {
                code: FilerCode::new(code),
                firm_name,
                status,
            }
        })
        .collect();
    listings.sort_by(|a, b| a.code.cmp(&b.code));

    debug!(count = listings.len(), "Loaded filer codes");
    Ok(listings)
}

/// Splits a filer label into firm name and registration status.
///
/// ```
/// use filings_cvm::parse_filer_label;
///
/// let (name, status) = parse_filer_label("ACME S.A. (CANCELADA)")?;
/// assert_eq!(name, "ACME S.A.");
/// assert_eq!(status, "CANCELADA");
/// # Ok::<(), filings_core::FilingError>(())
/// ```
///
/// # Errors
///
/// Returns [`FilingError::Other`] if the status pattern fails to compile.
pub fn parse_filer_label(label: &str) -> Result<(String, String)> {
    Ok(split_label(status_regex()?, label))
}

fn status_regex() -> Result<&'static Regex> {
    STATUS_RE
        .as_ref()
        .map_err(|e| FilingError::Other(e.to_string()))
}

fn split_label(status_re: &Regex, label: &str) -> (String, String) {
    let status = status_re
        .captures(label)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| NO_STATUS.to_string(), |m| m.as_str().to_string());
    let firm_name = status_re.replace_all(label, "").trim().to_string();
    (firm_name, status)
}

/// Formats a 14-digit CNPJ as `NN.NNN.NNN/NNNN-NN`.
///
/// Anything that is not exactly 14 ASCII digits, including the `"-"`
/// placeholder, is returned unchanged.
#[must_use]
pub fn format_cnpj(cnpj: &str) -> String {
    if cnpj.len() != 14 || !cnpj.bytes().all(|b| b.is_ascii_digit()) {
        return cnpj.to_string();
    }
    format!(
        "{}.{}.{}/{}-{}",
        &cnpj[..2],
        &cnpj[2..5],
        &cnpj[5..8],
        &cnpj[8..12],
        &cnpj[12..]
    )
}
