use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppError {
    Internal(String),
    /// The parser could not read the file.
    ParseError(String),
    /// The file parsed but held no data rows.
    EmptyInput(String),
    /// Every row was rejected by the required-field check.
    ValidationEmpty(String),
    /// Import was invoked without a file.
    NoFileSelected,
    EmptyExport,
    ConfigError(String),
    IoError(String),
}

impl AppError {
    /// Short user-facing headline, used as the notice message.
    pub fn headline(&self) -> &'static str {
        match self {
            AppError::Internal(_) => "Something went wrong",
            AppError::ParseError(_) => "Failed to read file",
            AppError::EmptyInput(_) => "File contains no data",
            AppError::ValidationEmpty(_) => "No valid data found",
            AppError::NoFileSelected => "No file selected",
            AppError::EmptyExport => "No data to export",
            AppError::ConfigError(_) => "Invalid configuration",
            AppError::IoError(_) => "File operation failed",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AppError::EmptyInput(msg) => write!(f, "Empty input: {}", msg),
            AppError::ValidationEmpty(msg) => write!(f, "No valid records: {}", msg),
            AppError::NoFileSelected => write!(f, "No file selected for import"),
            AppError::EmptyExport => write!(f, "No records to export"),
            AppError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::Io(_) => AppError::IoError(err.to_string()),
            _ => AppError::ParseError(err.to_string()),
        }
    }
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
