//! Defined model for API
use std::path::PathBuf;

use serde::Serialize;

use crate::Diagnostic;

/// Configuration for the transform_files API
#[derive(Debug, Clone, Default)]
pub struct TransformFilesConfig {
    /// Test files to migrate
    pub source_files: Vec<PathBuf>,
    /// Keep the legacy `expect` binding in place
    pub standalone: bool,
    /// Override language detection (e.g. "typescript")
    pub language: Option<String>,
    /// Write changed files back to disk
    pub write: bool,
}

/// Outcome of migrating one file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// File that was processed
    pub path: PathBuf,
    /// Whether the migrated text differs from the original
    pub changed: bool,
    /// Local name of the legacy binding, if the file had one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
    /// Constructs left unrewritten
    pub diagnostics: Vec<Diagnostic>,
    /// Set when the file could not be processed; the file is left untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Migrated text, absent on error
    #[serde(skip)]
    pub output: Option<String>,
}

impl FileReport {
    pub(crate) fn failed(path: PathBuf, error: &anyhow::Error) -> Self {
        Self {
            path,
            changed: false,
            binding: None,
            diagnostics: Vec::new(),
            error: Some(format!("{error:#}")),
            output: None,
        }
    }

    /// Whether processing the file failed
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
