// ============================================================
// CSV WRITER
// ============================================================
// Serialize projected rows back to comma-separated text

use csv::{QuoteStyle, WriterBuilder};

use crate::domain::error::{AppError, Result};
use crate::domain::records::{FieldValue, Record};

/// One output row: column name → value, in column order
pub type ProjectedRow<'a> = Vec<(&'a str, FieldValue)>;

/// CSV writer producing UTF-8 text without a byte-order mark
#[derive(Debug, Clone)]
pub struct CsvWriter {
    delimiter: u8,
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Header = union of the rows' columns in first-seen order.
    pub fn header<'a>(rows: &[ProjectedRow<'a>]) -> Vec<&'a str> {
        let mut header: Vec<&'a str> = Vec::new();
        for row in rows {
            for (name, _) in row {
                if !header.contains(name) {
                    header.push(*name);
                }
            }
        }
        header
    }

    /// Serialize rows; a row lacking a header column gets an empty cell there.
    pub fn unparse(&self, rows: &[ProjectedRow<'_>]) -> Result<String> {
        let header = Self::header(rows);

        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(QuoteStyle::Necessary)
            .from_writer(Vec::new());

        writer.write_record(&header)?;
        for row in rows {
            let cells = header.iter().map(|column| {
                row.iter()
                    .find(|(name, _)| name == column)
                    .map(|(_, value)| value.to_cell())
                    .unwrap_or_default()
            });
            writer.write_record(cells)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("Failed to flush CSV writer: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("CSV output is not UTF-8: {}", e)))
    }

    /// Serialize full records (every column)
    pub fn unparse_records(&self, records: &[Record]) -> Result<String> {
        let rows: Vec<ProjectedRow<'_>> = records.iter().map(Record::columns).collect();
        self.unparse(&rows)
    }
}
