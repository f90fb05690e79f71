pub mod use_cases;

pub use use_cases::field_normalizer::FieldNormalizer;
pub use use_cases::import_pipeline::ImportPipeline;
pub use use_cases::inventory_summary::InventoryAnalyzer;
pub use use_cases::record_exporter::{Projection, RecordExporter};
pub use use_cases::record_validator::RecordValidator;
