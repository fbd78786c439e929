use std::path::Path;

use anyhow::{Context, Result};
use log::trace;

use crate::errors::TransformError;
use crate::{Engine, Language, SourceFile, TransformOptions, TransformOutput};

/// Language of `path`, unless overridden
pub(crate) fn resolve_language(
    path: &Path,
    language_override: Option<Language>,
) -> Result<Language> {
    if let Some(language) = language_override {
        return Ok(language);
    }
    let detected = Language::detect(path).ok_or_else(|| TransformError::UnsupportedLanguage {
        language: path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default(),
    })?;
    trace!("Detected {detected} for {}", path.display());
    Ok(detected)
}

/// Read, transform and (with `write`) save one file
pub(crate) fn transform_file(
    engine: &Engine,
    path: &Path,
    language_override: Option<Language>,
    options: &TransformOptions,
    write: bool,
) -> Result<(TransformOutput, bool)> {
    let language = resolve_language(path, language_override)
        .with_context(|| format!("Cannot determine the language of {}", path.display()))?;
    let content = std::fs::read_to_string(path).map_err(|e| TransformError::io(path, e))?;
    let source_file = SourceFile::with_language(path.to_path_buf(), content, language);

    let output = engine
        .transform(&source_file, options)
        .with_context(|| format!("Failed to transform {}", path.display()))?;
    let changed = output.is_changed(&source_file.content);

    if changed && write {
        std::fs::write(path, &output.source).map_err(|e| TransformError::io(path, e))?;
        trace!("Wrote {}", path.display());
    }
    Ok((output, changed))
}
