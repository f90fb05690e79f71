pub mod field_normalizer;
pub mod import_pipeline;
pub mod inventory_summary;
pub mod record_exporter;
pub mod record_validator;
