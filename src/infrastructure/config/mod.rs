use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};
use crate::domain::records::{ExportConfig, ImportConfig};

pub const DEFAULT_CONFIG_FILE: &str = "agri-records.toml";
pub const ENV_PREFIX: &str = "AGRI_RECORDS_";

/// Application configuration: defaults, then the TOML file, then environment.
///
/// Nested keys use `__` in environment variables, e.g.
/// `AGRI_RECORDS_IMPORT__REQUIRED_FIELDS='["name","sku"]'`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// tracing EnvFilter directive (overridden by RUST_LOG)
    pub log_level: String,
    pub import: ImportConfig,
    pub export: ExportConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            import: ImportConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

pub struct ConfigService {
    figment: Figment,
}

impl ConfigService {
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self { figment }
    }

    /// Wrap an existing figment (used to layer extra providers)
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn load(&self) -> Result<AppConfig> {
        let config: AppConfig = self.figment.extract()?;
        config
            .import
            .validate()
            .map_err(|e| AppError::ConfigError(format!("Invalid import config: {}", e)))?;
        config
            .export
            .validate()
            .map_err(|e| AppError::ConfigError(format!("Invalid export config: {}", e)))?;
        Ok(config)
    }
}
