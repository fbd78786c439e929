use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use tokio::task::JoinSet;

use crate::api::common::transform_file;
use crate::api::model::{FileReport, TransformFilesConfig};
use crate::errors::TransformError;
use crate::{Engine, Language, TransformOptions};

/// Migrate a set of test files concurrently
///
/// Every file is processed on its own blocking task. A file that fails is
/// reported with its error and left untouched; the others still run.
/// Reports are returned sorted by path.
///
/// # Errors
///
/// Fails on an empty file list, an unknown language override, or when a
/// worker task panics.
pub async fn transform_files(config: &TransformFilesConfig) -> Result<Vec<FileReport>> {
    if config.source_files.is_empty() {
        return Err(TransformError::validation("No source files given").into());
    }
    let language_override = config
        .language
        .as_deref()
        .map(Language::try_from_str)
        .transpose()
        .context("Invalid language override")?;

    let start = Instant::now();
    let engine = Arc::new(Engine::default());
    let options = TransformOptions {
        standalone: config.standalone,
    };

    let mut join_set = JoinSet::new();
    for path in config.source_files.iter().cloned() {
        let engine = Arc::clone(&engine);
        let write = config.write;
        join_set.spawn_blocking(move || {
            match transform_file(&engine, &path, language_override, &options, write) {
                Ok((output, changed)) => FileReport {
                    path,
                    changed,
                    binding: output.binding,
                    diagnostics: output.diagnostics,
                    error: None,
                    output: Some(output.source),
                },
                Err(e) => {
                    warn!("{e:#}");
                    FileReport::failed(path, &e)
                }
            }
        });
    }

    let mut reports = Vec::with_capacity(config.source_files.len());
    while let Some(result) = join_set.join_next().await {
        reports.push(result.context("Transform task failed")?);
    }
    reports.sort_by(|a, b| a.path.cmp(&b.path));

    let changed = reports.iter().filter(|report| report.changed).count();
    let failed = reports.iter().filter(|report| report.is_error()).count();
    info!(
        "Processed {} files: {changed} changed, {failed} failed",
        reports.len()
    );
    debug!("Batch transform took {:?}", start.elapsed());
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_transform_files_reports_sorted() {
        let dir = TempDir::new().unwrap();
        let b = write(
            &dir,
            "b.test.js",
            "const expect = require('expect');\nexpect(a).toExist();\n",
        );
        let a = write(&dir, "a.test.js", "it('x', () => {});\n");

        let config = TransformFilesConfig {
            source_files: vec![b.clone(), a.clone()],
            ..Default::default()
        };
        let reports = transform_files(&config).await.unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].path, a);
        assert!(!reports[0].changed);
        assert_eq!(reports[1].path, b);
        assert!(reports[1].changed);
        assert_eq!(
            reports[1].output.as_deref(),
            Some("expect(a).toBeTruthy();\n")
        );
        // Not written without `write`
        assert!(fs::read_to_string(&b).unwrap().contains("toExist"));
    }

    #[tokio::test]
    async fn test_transform_files_writes_changes() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "spy.test.ts",
            "import expect from 'expect';\nconst s = expect.createSpy();\n",
        );

        let config = TransformFilesConfig {
            source_files: vec![path.clone()],
            write: true,
            ..Default::default()
        };
        let reports = transform_files(&config).await.unwrap();

        assert!(reports[0].changed);
        assert_eq!(fs::read_to_string(&path).unwrap(), "const s = jest.fn();\n");
    }

    #[tokio::test]
    async fn test_failing_file_does_not_stop_others() {
        let dir = TempDir::new().unwrap();
        let good = write(
            &dir,
            "good.test.js",
            "const expect = require('expect');\nexpect(a).toExist();\n",
        );
        let missing = dir.path().join("missing.test.js");
        let unknown = write(&dir, "notes.md", "# notes\n");

        let config = TransformFilesConfig {
            source_files: vec![good, missing, unknown],
            ..Default::default()
        };
        let reports = transform_files(&config).await.unwrap();

        let failed: Vec<_> = reports.iter().filter(|report| report.is_error()).collect();
        assert_eq!(failed.len(), 2);
        assert!(reports
            .iter()
            .any(|report| report.changed && report.error.is_none()));
    }

    #[tokio::test]
    async fn test_invalid_configuration() {
        let result = transform_files(&TransformFilesConfig::default()).await;
        assert!(result.is_err());

        let config = TransformFilesConfig {
            source_files: vec!["a.js".into()],
            language: Some("coffee".to_string()),
            ..Default::default()
        };
        assert!(transform_files(&config).await.is_err());
    }
}
