// ============================================================
// RECORDS DOMAIN LAYER
// ============================================================
// Normalized records, schemas, configuration and outcome values

mod field_schema;
mod field_value;
mod identity;
mod import_config;
mod outcome;
mod record;
mod summary;

pub use field_schema::{FieldSchema, FieldSpec, SchemaPreset, ID_ALIASES, ID_FIELD};
pub use field_value::{FieldKind, FieldValue};
pub use identity::{IdGenerator, SequentialIdGenerator, TimestampIdGenerator};
pub use import_config::{ExportConfig, ExportOptions, ImportConfig};
pub use outcome::{
    Completion, ExportOutcome, ExportReceipt, ImportReport, ImportStage, Notice, Rejection,
    Severity, ValidationReport,
};
pub use record::Record;
pub use summary::{CategoryCount, ExpiringItem, InventorySummary, ItemRef, LowStockItem};

/// MIME type of exported files
pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8;";
