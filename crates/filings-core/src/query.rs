//! Filing search parameters.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
    error::{FilingError, Result},
    types::FilerCode,
};

/// Parameters of a filing search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Filer whose filings are searched.
    pub filer_code: FilerCode,
    /// Category codes to include; empty means every category.
    pub categories: Vec<String>,
    /// First delivery date of the search window.
    pub start: NaiveDate,
    /// Last delivery date of the search window.
    pub end: NaiveDate,
    /// Retries allowed after the first failed attempt.
    pub max_retries: u32,
    /// Only return the latest version of each filing.
    pub only_last_version: bool,
    /// Participant type code passed to the search service.
    pub participant_type: u32,
}

impl SearchRequest {
    /// Default number of retries after the first attempt.
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Default participant type (listed companies).
    pub const DEFAULT_PARTICIPANT_TYPE: u32 = 1;

    /// Earliest start date used when none is given.
    #[must_use]
    pub fn default_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(1995, 12, 31).unwrap_or(NaiveDate::MIN)
    }

    /// Creates a request for every category of a filer, up to today.
    #[must_use]
    pub fn new(filer_code: impl Into<FilerCode>) -> Self {
        Self {
            filer_code: filer_code.into(),
            categories: Vec::new(),
            start: Self::default_start(),
            end: Local::now().date_naive(),
            max_retries: Self::DEFAULT_MAX_RETRIES,
            only_last_version: true,
            participant_type: Self::DEFAULT_PARTICIPANT_TYPE,
        }
    }

    /// Restricts the search to the given category codes.
    #[must_use]
    pub fn with_categories<S: Into<String>>(mut self, categories: impl IntoIterator<Item = S>) -> Self {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the first date of the search window.
    #[must_use]
    pub const fn with_start(mut self, start: NaiveDate) -> Self {
        self.start = start;
        self
    }

    /// Sets the last date of the search window.
    #[must_use]
    pub const fn with_end(mut self, end: NaiveDate) -> Self {
        self.end = end;
        self
    }

    /// Sets the number of retries after the first attempt.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Includes superseded versions of each filing.
    #[must_use]
    pub const fn all_versions(mut self) -> Self {
        self.only_last_version = false;
        self
    }

    /// Checks that the search window is not inverted.
    ///
    /// # Errors
    ///
    /// Returns [`FilingError::InvalidParameter`] if `start` is after `end`.
    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(FilingError::InvalidParameter(format!(
                "Search window starts {} after it ends {}",
                self.start, self.end
            )));
        }
        Ok(())
    }
}
