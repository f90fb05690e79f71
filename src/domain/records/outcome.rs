// ============================================================
// OPERATION OUTCOMES
// ============================================================
// Values returned to callers in place of UI notifications

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::Record;
use crate::domain::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Success => write!(f, "success"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A user-facing message. The caller decides how to surface it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Notice {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            description: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<&AppError> for Notice {
    fn from(err: &AppError) -> Self {
        Notice::error(err.headline()).with_description(err.to_string())
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(description) => write!(f, "[{}] {}: {}", self.severity, self.message, description),
            None => write!(f, "[{}] {}", self.severity, self.message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    /// At least one record was accepted
    Success,
    /// Parsing succeeded but every row was rejected
    EmptyResult,
}

/// Import state machine stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "detail", rename_all = "snake_case")]
pub enum ImportStage {
    Idle,
    Parsing,
    Validating,
    Complete(Completion),
    Failed(AppError),
}

impl ImportStage {
    /// Whether `next` is a legal successor of this stage
    pub fn can_advance_to(&self, next: &ImportStage) -> bool {
        match (self, next) {
            (ImportStage::Idle, ImportStage::Parsing) => true,
            (ImportStage::Idle, ImportStage::Failed(AppError::NoFileSelected)) => true,
            (ImportStage::Parsing, ImportStage::Validating) => true,
            (ImportStage::Parsing, ImportStage::Failed(_)) => true,
            (ImportStage::Validating, ImportStage::Complete(_)) => true,
            (ImportStage::Validating, ImportStage::Failed(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportStage::Idle => write!(f, "idle"),
            ImportStage::Parsing => write!(f, "parsing"),
            ImportStage::Validating => write!(f, "validating"),
            ImportStage::Complete(Completion::Success) => write!(f, "complete"),
            ImportStage::Complete(Completion::EmptyResult) => write!(f, "complete (no valid rows)"),
            ImportStage::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// Why a row was dropped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    /// 0-based data row index (header excluded)
    pub row_index: usize,
    pub missing_fields: Vec<String>,
    /// The custom predicate returned false
    pub failed_predicate: bool,
}

/// Accepted records plus the reasons for every rejected row
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub accepted: Vec<Record>,
    pub rejections: Vec<Rejection>,
}

impl ValidationReport {
    pub fn rejected_count(&self) -> usize {
        self.rejections.len()
    }
}

/// Result of one import run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportReport {
    pub batch_id: Uuid,
    /// Terminal stage
    pub stage: ImportStage,
    /// Every stage visited, in order
    pub history: Vec<ImportStage>,
    pub records: Vec<Record>,
    pub total_rows: usize,
    pub rejections: Vec<Rejection>,
    pub notices: Vec<Notice>,
}

impl ImportReport {
    pub fn accepted_count(&self) -> usize {
        self.records.len()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejections.len()
    }

    pub fn is_success(&self) -> bool {
        self.stage == ImportStage::Complete(Completion::Success)
    }

    pub fn error(&self) -> Option<&AppError> {
        match &self.stage {
            ImportStage::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Where and what an export delivered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportReceipt {
    pub filename: String,
    pub location: String,
    pub row_count: usize,
    pub byte_count: usize,
}

/// Result of one export run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportOutcome {
    pub success: bool,
    pub receipt: Option<ExportReceipt>,
    pub notice: Notice,
}
