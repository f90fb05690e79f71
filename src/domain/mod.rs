pub mod error;

// Raw CSV rows
pub mod csv;
// Normalized records and operation outcomes
pub mod records;
