// ============================================================
// CSV DOMAIN LAYER
// ============================================================
// Raw row types produced by the parser
// No I/O, no async, no external dependencies

mod csv_row;

pub use csv_row::{normalize_header, CsvField, CsvRow};
