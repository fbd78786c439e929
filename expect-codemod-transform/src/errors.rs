//! Error types for the rewrite engine

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for transform operations
///
/// Only conditions that make the current file impossible to process are
/// errors. Unsupported shapes in user code are reported as diagnostics instead.
#[derive(Error, Debug)]
pub enum TransformError {
    /// The arity table has no entry for a matcher the rewrite produced
    #[error("Unknown matcher \"{matcher}\" (no entry in the matcher arity table)")]
    UnknownMatcher {
        /// Target matcher name, without the `not.` prefix
        matcher: String,
    },

    /// An internal match rule failed to compile
    #[error("Match rule '{rule_id}' is invalid: {message}")]
    Rule {
        /// Identifier of the rule
        rule_id: String,
        /// Error reported by the rule compiler
        message: String,
    },

    /// No grammar for the requested language
    #[error("Unsupported language: {language}")]
    UnsupportedLanguage {
        /// The language string that was given
        language: String,
    },

    /// Reading or writing a source file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Invalid input to the batch API
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TransformError>;

impl TransformError {
    pub(crate) fn unknown_matcher(matcher: impl Into<String>) -> Self {
        Self::UnknownMatcher {
            matcher: matcher.into(),
        }
    }

    pub(crate) fn rule(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rule {
            rule_id: rule_id.into(),
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
