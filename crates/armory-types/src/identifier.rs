//! Dual-key identifiers for vehicle lookups.
//!
//! A path identifier names a record either by its human-readable key or by its
//! numeric surrogate `id`. Parsing happens once, up front; the lookup rule is a
//! pure function of the parsed value.

use std::fmt;

use crate::record::VehicleRecord;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identifier {
    /// Only the human-readable key is a candidate.
    Key(String),
    /// The whole token is decimal digits: both the key and the surrogate id
    /// are candidates.
    Numeric { raw: String, id: u64 },
}

impl Identifier {
    /// Parse a raw path token. Only a token made entirely of ASCII digits that
    /// fits a `u64` is numeric; signs, whitespace and partial matches are not.
    pub fn parse(raw: &str) -> Self {
        let numeric = !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit());
        match numeric.then(|| raw.parse::<u64>().ok()).flatten() {
            Some(id) => Self::Numeric {
                raw: raw.to_string(),
                id,
            },
            None => Self::Key(raw.to_string()),
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            Self::Key(raw) | Self::Numeric { raw, .. } => raw,
        }
    }

    pub fn matches(&self, record: &VehicleRecord) -> bool {
        match self {
            Self::Key(raw) => record.key == *raw,
            Self::Numeric { raw, id } => record.key == *raw || record.id == *id,
        }
    }

    /// Index of the first matching record in list order.
    pub fn position_in(&self, records: &[VehicleRecord]) -> Option<usize> {
        records.iter().position(|record| self.matches(record))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw())
    }
}
