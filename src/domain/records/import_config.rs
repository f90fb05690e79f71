// ============================================================
// IMPORT / EXPORT CONFIGURATION
// ============================================================
// Tunable values for CSV import validation and export naming

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use super::SchemaPreset;

/// Configuration for record import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Schema the rows are normalized against (default: inventory)
    pub preset: SchemaPreset,

    /// Fields that must be non-empty for a row to be accepted
    /// (default: name, category)
    pub required_fields: Vec<String>,

    /// Keep columns the schema does not know in the record's extension map
    pub keep_unknown_fields: bool,

    /// Fixed delimiter; auto-detected when unset
    pub delimiter: Option<char>,

    /// Trim whitespace around cells
    pub trim: bool,

    /// Days ahead of today an expiry date counts as "expiring soon" (default: 30)
    pub expiry_window_days: i64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            preset: SchemaPreset::Inventory,
            required_fields: vec!["name".to_string(), "category".to_string()],
            keep_unknown_fields: false,
            delimiter: None,
            trim: true,
            expiry_window_days: 30,
        }
    }
}

impl ImportConfig {
    /// Config for a preset, with that preset's required fields
    pub fn for_preset(preset: SchemaPreset) -> Self {
        Self {
            preset,
            required_fields: preset.default_required(),
            ..Default::default()
        }
    }

    pub fn with_required_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.required_fields.iter().any(|f| f.trim().is_empty()) {
            return Err("required_fields must not contain blank names".to_string());
        }
        if let Some(delimiter) = self.delimiter {
            if !delimiter.is_ascii() || delimiter == '"' || delimiter == '\n' {
                return Err(format!("unsupported delimiter: {:?}", delimiter));
            }
        }
        if self.expiry_window_days < 0 {
            return Err("expiry_window_days must be >= 0".to_string());
        }
        Ok(())
    }
}

/// Configuration for record export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Base filename when the caller supplies none
    pub default_base_name: String,

    /// chrono format string for the optional filename timestamp suffix
    pub timestamp_format: String,

    /// Directory exported files are written to
    pub output_dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_base_name: "export".to_string(),
            timestamp_format: "%Y-%m-%d_%H-%M-%S".to_string(),
            output_dir: ".".to_string(),
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.default_base_name.trim().is_empty() {
            return Err("default_base_name must not be empty".to_string());
        }
        if self.timestamp_format.contains('/') {
            return Err("timestamp_format must not contain path separators".to_string());
        }
        if StrftimeItems::new(&self.timestamp_format).any(|item| item == Item::Error) {
            return Err(format!("invalid timestamp_format: {}", self.timestamp_format));
        }
        Ok(())
    }
}

/// Per-call export options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Allow-list: only these columns, in this order. Takes precedence over `exclude`.
    pub fields: Option<Vec<String>>,

    /// Deny-list: every column except these
    pub exclude: Option<Vec<String>>,

    /// Base filename, without extension
    pub filename: Option<String>,

    /// Append a timestamp suffix to the filename
    pub include_timestamp: bool,
}

impl ExportOptions {
    pub fn allow<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: Some(fields.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn deny<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exclude: Some(fields.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn named(mut self, filename: &str) -> Self {
        self.filename = Some(filename.to_string());
        self
    }

    pub fn timestamped(mut self) -> Self {
        self.include_timestamp = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_required_fields() {
        let config = ImportConfig::default();
        assert_eq!(config.required_fields, vec!["name", "category"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_preset_required_fields() {
        let config = ImportConfig::for_preset(SchemaPreset::Contacts);
        assert_eq!(config.required_fields, vec!["name", "email"]);
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = ImportConfig {
            delimiter: Some('"'),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ImportConfig::default().with_required_fields(["name", " "]);
        assert!(config.validate().is_err());

        let export = ExportConfig {
            default_base_name: " ".into(),
            ..Default::default()
        };
        assert!(export.validate().is_err());

        let export = ExportConfig {
            timestamp_format: "%Q".into(),
            ..Default::default()
        };
        assert!(export.validate().is_err());
    }
}
