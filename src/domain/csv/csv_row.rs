// ============================================================
// CSV ROW TYPES
// ============================================================
// Raw parsed CSV content, before normalization against a schema

use serde::{Deserialize, Serialize};

/// A single raw cell in a CSV row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvField {
    /// Original field name (header)
    pub name: String,

    /// Normalized header used to match schema fields
    pub clean_name: String,

    /// Raw cell value
    pub value: String,

    /// Whether the value is blank
    pub is_empty: bool,
}

impl CsvField {
    /// Create a new CSV field
    pub fn new(name: String, value: String) -> Self {
        let is_empty = value.trim().is_empty();
        let clean_name = normalize_header(&name);

        Self {
            name,
            clean_name,
            value,
            is_empty,
        }
    }
}

/// Normalize a header for matching: trim, strip quotes, lowercase,
/// and collapse spaces, dashes and other separators into single underscores.
pub fn normalize_header(name: &str) -> String {
    name.trim()
        .trim_matches('"')
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// A single row in a CSV file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvRow {
    /// Row index (0-based, header excluded)
    pub index: usize,

    /// All cells in header order
    pub fields: Vec<CsvField>,
}

impl CsvRow {
    /// Create a new CSV row
    pub fn new(index: usize, fields: Vec<CsvField>) -> Self {
        Self { index, fields }
    }

    /// Build a row from (header, value) pairs
    pub fn from_pairs<K, V>(index: usize, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| CsvField::new(k.into(), v.into()))
            .collect();
        Self::new(index, fields)
    }

    /// Look up a cell by normalized header
    pub fn get(&self, clean_name: &str) -> Option<&CsvField> {
        self.fields.iter().find(|f| f.clean_name == clean_name)
    }

    /// Whether every cell in the row is blank
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|f| f.is_empty)
    }
}
