use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::domain::error::{AppError, Result};

/// Receives a finished export file. Stands in for the browser download.
pub trait DownloadSink: Send + Sync {
    /// Deliver `bytes` under `filename`; returns where it ended up.
    fn deliver(&self, filename: &str, mime_type: &str, bytes: &[u8]) -> Result<String>;
}

/// Writes exports into a directory on disk
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, filename: &str, _mime_type: &str, bytes: &[u8]) -> Result<String> {
        if filename.contains('/') || filename.contains('\\') || filename.starts_with('.') {
            return Err(AppError::IoError(format!("Refusing unsafe filename: {}", filename)));
        }
        ensure_dir(&self.dir)?;
        let path = self.dir.join(filename);
        fs::write(&path, bytes)
            .map_err(|e| AppError::IoError(format!("Failed to write {}: {}", path.display(), e)))?;
        Ok(path.display().to_string())
    }
}

/// A file delivered to a `MemorySink`
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveredFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Keeps delivered files in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<Vec<DeliveredFile>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> Vec<DeliveredFile> {
        self.files.lock().map(|f| f.clone()).unwrap_or_default()
    }

    pub fn last_text(&self) -> Option<String> {
        self.files()
            .last()
            .map(|f| String::from_utf8_lossy(&f.bytes).into_owned())
    }
}

impl DownloadSink for MemorySink {
    fn deliver(&self, filename: &str, mime_type: &str, bytes: &[u8]) -> Result<String> {
        let mut files = self
            .files
            .lock()
            .map_err(|_| AppError::Internal("memory sink lock poisoned".to_string()))?;
        files.push(DeliveredFile {
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(format!("memory://{}", filename))
    }
}

pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
