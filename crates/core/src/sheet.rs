//! Scalar cell values and the decoded-sheet shape shared by the codec,
//! the normalizer, and the export projector.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Cell values
// ---------------------------------------------------------------------------

/// A single spreadsheet cell after decoding.
///
/// Serialized untagged so persisted snapshots stay readable JSON
/// (`null`, `true`, `12.5`, `"text"`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// `true` for an empty cell or an empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// String coercion used for app-managed fields, search, and sorting.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            // f64's Display already prints integral values without ".0".
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

// ---------------------------------------------------------------------------
// Decoded sheet
// ---------------------------------------------------------------------------

/// One data row keyed by header text, in column order.
///
/// Only non-empty cells are present; a missing key means the cell was blank.
pub type RawRow = IndexMap<String, CellValue>;

/// Output of the spreadsheet decoder: the first sheet's data rows plus its
/// header row, stringified, in original column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedSheet {
    pub rows: Vec<RawRow>,
    pub headers: Vec<String>,
}
