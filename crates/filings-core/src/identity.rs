//! Filing identity and the composite id codec.
//!
//! A filing is identified by its filer, document label, dates, version and
//! protocol/sequence pair. [`FilingIdentity`] carries these as typed fields and
//! is the key to use for deduplication. The composite id is a flat string
//! rendering of the same fields:
//!
//! ```text
//! {filer}_{document}_DR{reference}_DE{delivery}_vs{version}_{protocol}/{sequence}
//! ```
//!
//! The string is not escaped. Fields containing `_`, `/`, `DR`, `DE` or `vs`
//! cannot be recovered by [`FilingIdentity::parse_composite_id`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FilingError, Result};
use crate::types::FilerCode;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Structured identity of a filing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FilingIdentity {
    /// Filer code.
    pub filer_code: FilerCode,
    /// Document label (type tag or category).
    pub document: String,
    /// Reference date of the filing.
    pub reference_date: NaiveDate,
    /// Delivery date of the filing.
    pub delivery_date: NaiveDate,
    /// Version number.
    pub version: u32,
    /// Protocol number.
    pub protocol: String,
    /// Sequence number.
    pub sequence: String,
}

impl FilingIdentity {
    /// Renders the composite id.
    #[must_use]
    pub fn composite_id(&self) -> String {
        format!(
            "{}_{}_DR{}_DE{}_vs{}_{}/{}",
            self.filer_code,
            self.document,
            self.reference_date.format(DATE_FORMAT),
            self.delivery_date.format(DATE_FORMAT),
            self.version,
            self.protocol,
            self.sequence
        )
        .trim()
        .to_string()
    }

    /// Returns the `protocol/sequence` pair as it appears in the composite id.
    #[must_use]
    pub fn protocol_key(&self) -> String {
        format!("{}/{}", self.protocol, self.sequence)
    }

    /// Parses a composite id back into its fields by fixed positional split.
    ///
    /// Only the first six `_`-separated parts are read.
    pub fn parse_composite_id(id: &str) -> Result<Self> {
        let parts: Vec<&str> = id.trim().split('_').collect();
        if parts.len() < 6 {
            return Err(FilingError::Parse(format!(
                "Composite id has {} parts, expected 6: {id}",
                parts.len()
            )));
        }

        let reference_date = parse_date(parts[2].replace("DR", "").as_str(), id)?;
        let delivery_date = parse_date(parts[3].replace("DE", "").as_str(), id)?;
        let version = parts[4]
            .replace("vs", "")
            .parse::<u32>()
            .map_err(|e| FilingError::Parse(format!("Bad version in {id}: {e}")))?;

        let (protocol, sequence) = parts[5].split_once('/').ok_or_else(|| {
            FilingError::Parse(format!("Missing protocol/sequence separator in {id}"))
        })?;

        Ok(Self {
            filer_code: FilerCode::new(parts[0]),
            document: parts[1].to_string(),
            reference_date,
            delivery_date,
            version,
            protocol: protocol.to_string(),
            sequence: sequence.to_string(),
        })
    }
}

impl fmt::Display for FilingIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.composite_id())
    }
}

fn parse_date(value: &str, id: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| FilingError::Parse(format!("Bad date '{value}' in {id}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FilingRecord;

    fn identity() -> FilingIdentity {
        FilingIdentity {
            filer_code: FilerCode::new("009512"),
            document: "DFP".to_string(),
            reference_date: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            delivery_date: NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            version: 2,
            protocol: "009512DFP311220230100123456-78".to_string(),
            sequence: "123456".to_string(),
        }
    }

    #[test]
    fn test_composite_id_format() {
        assert_eq!(
            identity().composite_id(),
            "009512_DFP_DR2023-12-31_DE2024-03-20_vs2_009512DFP311220230100123456-78/123456"
        );
    }

    #[test]
    fn test_composite_id_round_trip() {
        let id = identity();
        let parsed = FilingIdentity::parse_composite_id(&id.composite_id()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_record_composite_id() {
        let record = FilingRecord::new(
            " 021610 ",
            "021610IPE",
            "998877",
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 2)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        )
        .with_category("IPE_4", "Fato Relevante - Outros");

        let id = record.composite_id();
        assert_eq!(id, "021610_Fato Relevante_DR2024-06-30_DE2024-07-02_vs1_021610IPE/998877");
        assert_eq!(FilingIdentity::parse_composite_id(&id).unwrap(), record.identity());
    }

    #[test]
    fn test_separator_collision_misparses() {
        let mut id = identity();
        id.document = "FATO_RELEVANTE".to_string();
        assert!(FilingIdentity::parse_composite_id(&id.composite_id()).is_err());
    }

    #[test]
    fn test_parse_rejects_short_ids() {
        let err = FilingIdentity::parse_composite_id("009512_DFP").unwrap_err();
        assert!(matches!(err, FilingError::Parse(_)));
    }
}
