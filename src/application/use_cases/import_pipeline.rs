// ============================================================
// IMPORT PIPELINE USE CASE
// ============================================================
// Idle -> Parsing -> Validating -> Complete(success | empty-result) | Failed

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::use_cases::field_normalizer::FieldNormalizer;
use crate::application::use_cases::record_validator::{
    has_valid_email, RecordPredicate, RecordValidator,
};
use crate::domain::csv::CsvRow;
use crate::domain::error::{AppError, Result};
use crate::domain::records::{
    Completion, IdGenerator, ImportConfig, ImportReport, ImportStage, Notice, Record, Rejection,
    SchemaPreset, TimestampIdGenerator,
};
use crate::infrastructure::csv::{CsvParser, RowSource};

pub type ProgressCallback<'a> = Option<&'a mut dyn FnMut(u8)>;

/// Records the stages one import passes through
struct StageTracker {
    history: Vec<ImportStage>,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            history: vec![ImportStage::Idle],
        }
    }

    fn current(&self) -> &ImportStage {
        // history always starts with Idle
        &self.history[self.history.len() - 1]
    }

    fn advance(&mut self, next: ImportStage) {
        debug_assert!(
            self.current().can_advance_to(&next),
            "illegal import transition {} -> {}",
            self.current(),
            next
        );
        debug!("Import stage: {} -> {}", self.current(), next);
        self.history.push(next);
    }
}

/// Draws synthetic ids that do not collide with any id already used in the batch
struct BatchIds<'a> {
    inner: &'a dyn IdGenerator,
    taken: Mutex<HashSet<u64>>,
}

impl IdGenerator for BatchIds<'_> {
    fn next_id(&self) -> u64 {
        loop {
            let id = self.inner.next_id();
            match self.taken.lock() {
                Ok(mut taken) => {
                    if taken.insert(id) {
                        return id;
                    }
                }
                // Poisoned only if a panic happened mid-insert; fall back to the raw id
                Err(_) => return id,
            }
        }
    }
}

/// CSV import use case
pub struct ImportPipeline {
    config: ImportConfig,
    source: Box<dyn RowSource>,
    ids: Arc<dyn IdGenerator>,
    predicate: Option<RecordPredicate>,
    today: Option<NaiveDate>,
}

impl ImportPipeline {
    /// Create a pipeline with the CSV parser and timestamp ids
    pub fn new(config: ImportConfig) -> Self {
        let mut parser = CsvParser::new().with_trim(config.trim);
        if let Some(delimiter) = config.delimiter {
            match u8::try_from(delimiter) {
                Ok(byte) if byte.is_ascii() => parser = parser.with_delimiter(byte),
                _ => warn!(
                    "Delimiter {:?} is not a single ASCII character, detecting from content",
                    delimiter
                ),
            }
        }
        let predicate: Option<RecordPredicate> = match config.preset {
            SchemaPreset::Contacts => Some(Arc::new(has_valid_email) as RecordPredicate),
            SchemaPreset::Inventory => None,
        };

        Self {
            config,
            source: Box::new(parser),
            ids: Arc::new(TimestampIdGenerator::new()),
            predicate,
            today: None,
        }
    }

    pub fn with_source(mut self, source: Box<dyn RowSource>) -> Self {
        self.source = source;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Replace the preset's predicate
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate) as RecordPredicate);
        self
    }

    /// Fix the default date for missing dates
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Import a file. `None` models a submit without a selected file.
    pub async fn import_file(
        &self,
        path: Option<&Path>,
        progress: ProgressCallback<'_>,
    ) -> ImportReport {
        let batch_id = Uuid::new_v4();
        let mut tracker = StageTracker::new();

        let Some(path) = path else {
            return self.fail(batch_id, tracker, AppError::NoFileSelected, 0);
        };

        info!("Import {} started for {}", batch_id, path.display());
        tracker.advance(ImportStage::Parsing);

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let err = AppError::ParseError(format!("Failed to read {}: {}", path.display(), e));
                return self.fail(batch_id, tracker, err, 0);
            }
        };

        self.run_parsed(batch_id, tracker, self.source.parse_bytes(&bytes), progress)
    }

    /// Import raw file bytes
    pub fn import_bytes(&self, bytes: &[u8], progress: ProgressCallback<'_>) -> ImportReport {
        let batch_id = Uuid::new_v4();
        let mut tracker = StageTracker::new();
        info!("Import {} started ({} bytes)", batch_id, bytes.len());
        tracker.advance(ImportStage::Parsing);
        self.run_parsed(batch_id, tracker, self.source.parse_bytes(bytes), progress)
    }

    /// Import in-memory CSV text
    pub fn import_content(&self, content: &str, progress: ProgressCallback<'_>) -> ImportReport {
        self.import_bytes(content.as_bytes(), progress)
    }

    fn run_parsed(
        &self,
        batch_id: Uuid,
        mut tracker: StageTracker,
        parsed: Result<Vec<CsvRow>>,
        progress: ProgressCallback<'_>,
    ) -> ImportReport {
        let rows = match parsed {
            Ok(rows) => rows,
            Err(err) => return self.fail(batch_id, tracker, err, 0),
        };

        if rows.is_empty() {
            let err = AppError::EmptyInput("the file has no data rows".to_string());
            return self.fail(batch_id, tracker, err, 0);
        }

        tracker.advance(ImportStage::Validating);
        let total_rows = rows.len();

        let (records, duplicate_ids) = self.normalize_rows(&rows);

        let mut validator = RecordValidator::new(self.config.required_fields.iter().cloned());
        if let Some(predicate) = &self.predicate {
            validator = validator.with_shared_predicate(Arc::clone(predicate));
        }
        let report = validator.validate_batch(records, progress);

        let mut notices = Vec::new();
        if duplicate_ids > 0 {
            warn!("Import {}: {} rows reuse an id from another row", batch_id, duplicate_ids);
            notices.push(
                Notice::warning("Duplicate ids in file")
                    .with_description(format!("{} rows share an id with another row", duplicate_ids)),
            );
        }

        if report.accepted.is_empty() {
            let err = AppError::ValidationEmpty(format!(
                "all {} rows are missing required fields ({})",
                total_rows,
                self.config.required_fields.join(", ")
            ));
            warn!("Import {}: {}", batch_id, err);
            notices.push(Notice::from(&err));
            tracker.advance(ImportStage::Complete(Completion::EmptyResult));
            return ImportReport {
                batch_id,
                stage: tracker.current().clone(),
                history: tracker.history,
                records: Vec::new(),
                total_rows,
                rejections: report.rejections,
                notices,
            };
        }

        let accepted = report.accepted.len();
        info!(
            "Import {} complete: {} of {} rows accepted",
            batch_id, accepted, total_rows
        );
        notices.push(
            Notice::success("Import successful")
                .with_description(format!("{} records imported", accepted)),
        );
        if !report.rejections.is_empty() {
            notices.push(
                Notice::info(format!("{} invalid rows skipped", report.rejections.len()))
                    .with_description(describe_rejections(&report.rejections)),
            );
        }

        tracker.advance(ImportStage::Complete(Completion::Success));
        ImportReport {
            batch_id,
            stage: tracker.current().clone(),
            history: tracker.history,
            records: report.accepted,
            total_rows,
            rejections: report.rejections,
            notices,
        }
    }

    /// Normalize every row, keeping ids unique within the batch.
    /// Returns the records and how many rows repeat an explicit id.
    fn normalize_rows(&self, rows: &[CsvRow]) -> (Vec<(usize, Record)>, usize) {
        let mut normalizer = FieldNormalizer::new(self.config.preset.schema())
            .with_keep_unknown_fields(self.config.keep_unknown_fields);
        if let Some(today) = self.today {
            normalizer = normalizer.with_today(today);
        }

        let mut explicit = HashSet::new();
        let mut duplicate_ids = 0;
        for row in rows {
            if let Some(id) = normalizer.explicit_id(row) {
                if !explicit.insert(id) {
                    duplicate_ids += 1;
                }
            }
        }

        let ids = BatchIds {
            inner: self.ids.as_ref(),
            taken: Mutex::new(explicit),
        };

        let records = rows
            .iter()
            .map(|row| (row.index, normalizer.normalize(row, &ids)))
            .collect();

        (records, duplicate_ids)
    }

    fn fail(
        &self,
        batch_id: Uuid,
        mut tracker: StageTracker,
        err: AppError,
        total_rows: usize,
    ) -> ImportReport {
        error!("Import {} failed: {}", batch_id, err);
        let notices = vec![Notice::from(&err)];
        tracker.advance(ImportStage::Failed(err));
        ImportReport {
            batch_id,
            stage: tracker.current().clone(),
            history: tracker.history,
            records: Vec::new(),
            total_rows,
            rejections: Vec::new(),
            notices,
        }
    }
}

impl Default for ImportPipeline {
    fn default() -> Self {
        Self::new(ImportConfig::default())
    }
}

/// "row 2: name; row 5: category, name"
fn describe_rejections(rejections: &[Rejection]) -> String {
    const SHOWN: usize = 5;
    let mut parts: Vec<String> = rejections
        .iter()
        .take(SHOWN)
        .map(|r| {
            let reason = if r.failed_predicate {
                "failed validation".to_string()
            } else {
                format!("missing {}", r.missing_fields.join(", "))
            };
            // rows are reported 1-based, counting the header as row 1
            format!("row {}: {}", r.row_index + 2, reason)
        })
        .collect();
    if rejections.len() > SHOWN {
        parts.push(format!("and {} more", rejections.len() - SHOWN));
    }
    parts.join("; ")
}
