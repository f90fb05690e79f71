// ============================================================
// CSV PARSER
// ============================================================
// Parse CSV bytes with encoding detection and delimiter detection

use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::WINDOWS_1252;

use crate::domain::csv::{CsvField, CsvRow};
use crate::domain::error::{AppError, Result};

/// Anything that turns raw file bytes into header-keyed rows
pub trait RowSource: Send + Sync {
    fn parse_bytes(&self, bytes: &[u8]) -> Result<Vec<CsvRow>>;
}

/// CSV parser with encoding detection
#[derive(Debug, Clone)]
pub struct CsvParser {
    /// Delimiter character; detected from the content when unset
    delimiter: Option<u8>,

    /// Whether to trim whitespace from values
    trim: bool,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self {
            delimiter: None,
            trim: true,
        }
    }
}

impl CsvParser {
    /// Create a new CSV parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Set whether to trim whitespace
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Parse CSV content from string. Empty content parses to zero rows.
    pub fn parse_content(&self, content: &str) -> Result<Vec<CsvRow>> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let delimiter = self
            .delimiter
            .unwrap_or_else(|| Self::detect_delimiter(content));

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(if self.trim { Trim::All } else { Trim::None })
            .flexible(true) // Allow rows with different lengths
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .clone();

        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(AppError::ParseError("CSV header row is missing".to_string()));
        }

        let mut rows = Vec::new();
        for (line, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", line + 1, e))
            })?;

            let row = Self::parse_row(line, &headers, &record);
            if row.is_blank() {
                continue;
            }
            rows.push(row);
        }

        Ok(rows)
    }

    /// Decode bytes as UTF-8, falling back to Windows-1252 for legacy spreadsheet exports
    pub fn decode(bytes: &[u8]) -> String {
        match std::str::from_utf8(bytes) {
            Ok(content) => content.to_string(),
            Err(_) => {
                let (decoded, _, _) = WINDOWS_1252.decode(bytes);
                decoded.into_owned()
            }
        }
    }

    /// Map one record onto the header row; missing trailing cells become empty
    fn parse_row(index: usize, headers: &StringRecord, record: &StringRecord) -> CsvRow {
        let fields = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.trim().is_empty())
            .map(|(idx, header)| {
                let value = record.get(idx).unwrap_or("").to_string();
                CsvField::new(header.to_string(), value)
            })
            .collect();

        CsvRow::new(index, fields)
    }

    /// Detect the delimiter from the header line. Comma wins whenever the
    /// header contains one; otherwise the most frequent of `; \t |`.
    pub fn detect_delimiter(content: &str) -> u8 {
        let header = content
            .lines()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("");

        if header.contains(',') {
            return b',';
        }

        [b';', b'\t', b'|']
            .into_iter()
            .map(|delimiter| (delimiter, header.bytes().filter(|&b| b == delimiter).count()))
            .filter(|&(_, count)| count > 0)
            .max_by_key(|&(_, count)| count)
            .map(|(delimiter, _)| delimiter)
            .unwrap_or(b',')
    }
}

impl RowSource for CsvParser {
    fn parse_bytes(&self, bytes: &[u8]) -> Result<Vec<CsvRow>> {
        let content = Self::decode(bytes);
        self.parse_content(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_csv() {
        let content = "name,category,quantity\nWheat Seeds,Seeds,500\nUrea,Fertilizer,20";
        let parser = CsvParser::new();
        let rows = parser.parse_content(content).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields.len(), 3);
        assert_eq!(rows[0].fields[0].clean_name, "name");
        assert_eq!(rows[0].fields[0].value, "Wheat Seeds");
    }

    #[test]
    fn test_short_rows_are_padded() {
        let rows = CsvParser::new()
            .parse_content("name,category,notes\nUrea,Fertilizer")
            .unwrap();
        assert_eq!(rows[0].get("notes").unwrap().value, "");
        assert!(rows[0].get("notes").unwrap().is_empty);
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let rows = CsvParser::new()
            .parse_content("name,category\nUrea,Fertilizer\n,\nNeem Oil,Pesticide")
            .unwrap();
        assert_eq!(rows.len(), 2);
        // index keeps the data-line position
        assert_eq!(rows[1].index, 2);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(CsvParser::detect_delimiter("a,b,c\nd,e,f"), b',');
        assert_eq!(CsvParser::detect_delimiter("a;b;c\nd;e;f"), b';');
        assert_eq!(CsvParser::detect_delimiter("a\tb\tc\nd\te\tf"), b'\t');
    }

    #[test]
    fn test_semicolon_content() {
        let rows = CsvParser::new()
            .parse_content("name;category\nUrea;Fertilizer")
            .unwrap();
        assert_eq!(rows[0].get("category").unwrap().value, "Fertilizer");
    }

    #[test]
    fn test_bom_is_stripped() {
        let rows = CsvParser::new()
            .parse_bytes("\u{feff}name,category\nUrea,Fertilizer".as_bytes())
            .unwrap();
        assert_eq!(rows[0].fields[0].clean_name, "name");
    }

    #[test]
    fn test_windows_1252_fallback() {
        // "Café" with 0xE9 for é
        let bytes = b"name,category\nCaf\xe9,Shop";
        let rows = CsvParser::new().parse_bytes(bytes).unwrap();
        assert_eq!(rows[0].get("name").unwrap().value, "Café");
    }

    #[test]
    fn test_empty_content_has_no_rows() {
        assert!(CsvParser::new().parse_content("").unwrap().is_empty());
        assert!(CsvParser::new().parse_bytes(b"").unwrap().is_empty());
        assert!(CsvParser::new()
            .parse_bytes("\u{feff}\n  \n".as_bytes())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_blank_header_cells() {
        assert!(matches!(
            CsvParser::new().parse_content(",,\nUrea,Fertilizer,1"),
            Err(AppError::ParseError(_))
        ));
    }

    #[test]
    fn test_comma_header_wins_over_semicolons_in_values() {
        let mut content = String::from("name,category,notes\n");
        for i in 0..9 {
            content.push_str(&format!("Mix {},Fertilizer,N;P;K;Zn;S;B;Fe;Mn\n", i));
        }
        assert_eq!(CsvParser::detect_delimiter(&content), b',');

        let rows = CsvParser::new().parse_content(&content).unwrap();
        assert_eq!(rows.len(), 9);
        assert_eq!(rows[0].get("notes").unwrap().value, "N;P;K;Zn;S;B;Fe;Mn");
    }

    #[test]
    fn test_detect_delimiter_without_comma_header() {
        assert_eq!(CsvParser::detect_delimiter("name|category\nUrea|Fert, bulk"), b'|');
        assert_eq!(CsvParser::detect_delimiter("\nname;qty\nUrea;5"), b';');
        assert_eq!(CsvParser::detect_delimiter("name\nUrea"), b',');
    }
}
