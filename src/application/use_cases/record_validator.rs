// ============================================================
// RECORD VALIDATOR
// ============================================================
// Accept or reject normalized records by required fields and an optional predicate

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::records::{Record, Rejection, ValidationReport};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").unwrap());

pub type RecordPredicate = Arc<dyn Fn(&Record) -> bool + Send + Sync>;

pub struct RecordValidator {
    required_fields: Vec<String>,
    predicate: Option<RecordPredicate>,
}

impl RecordValidator {
    pub fn new<I, S>(required_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required_fields: required_fields.into_iter().map(Into::into).collect(),
            predicate: None,
        }
    }

    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn with_shared_predicate(mut self, predicate: RecordPredicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required_fields
    }

    /// Required fields that are absent or blank on this record
    pub fn missing_fields(&self, record: &Record) -> Vec<String> {
        self.required_fields
            .iter()
            .filter(|name| {
                if name.as_str() == crate::domain::records::ID_FIELD {
                    return false;
                }
                record.get(name).map_or(true, |value| value.is_blank())
            })
            .cloned()
            .collect()
    }

    /// Check one record; `None` means accepted
    pub fn check(&self, row_index: usize, record: &Record) -> Option<Rejection> {
        let missing_fields = self.missing_fields(record);
        let failed_predicate =
            missing_fields.is_empty() && self.predicate.as_ref().map_or(false, |p| !p(record));

        if missing_fields.is_empty() && !failed_predicate {
            None
        } else {
            Some(Rejection {
                row_index,
                missing_fields,
                failed_predicate,
            })
        }
    }

    pub fn accepts(&self, record: &Record) -> bool {
        self.check(0, record).is_none()
    }

    /// Validate a batch. `on_progress` receives `processed * 100 / total` after each record.
    pub fn validate_batch(
        &self,
        records: Vec<(usize, Record)>,
        mut on_progress: Option<&mut dyn FnMut(u8)>,
    ) -> ValidationReport {
        let total = records.len();
        let mut report = ValidationReport::default();

        for (processed, (row_index, record)) in records.into_iter().enumerate() {
            match self.check(row_index, &record) {
                None => report.accepted.push(record),
                Some(rejection) => report.rejections.push(rejection),
            }
            if let Some(callback) = on_progress.as_deref_mut() {
                callback(percent(processed + 1, total));
            }
        }

        report
    }
}

/// Integer percentage, clamped to 0..=100
pub fn percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((processed.min(total) * 100) / total) as u8
}

/// Predicate for contact imports: the email looks like an address
pub fn has_valid_email(record: &Record) -> bool {
    EMAIL_PATTERN.is_match(record.text("email").trim())
}
