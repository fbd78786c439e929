//! The rewrite engine
//!
//! [`Engine::transform`] runs the passes over one file in a fixed order:
//!
//! 1. resolve the `expect` binding (no binding, no changes)
//! 2. remove its import, unless running standalone
//! 3. rewrite matcher calls ([`matchers`])
//! 4. the three spy passes ([`spies`]), which share the [`SpyBindings`]
//!    found by the second one
//! 5. retarget mock factories to the `jest` global, unless standalone
//!
//! Every pass collects its edits first and applies them at the end, so each
//! pass sees a freshly parsed tree.

mod chain;
mod globals;
mod matchers;
mod spies;

use std::collections::BTreeSet;
use std::time::Instant;

use serde::Serialize;

use crate::catalog::MatcherCatalog;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::errors::Result;
use crate::tree::SourceTree;
use crate::{imports, SourceFile};

/// Package whose binding is migrated
pub(crate) const LEGACY_PACKAGE: &str = "expect";

/// Global the rewritten assertions call
pub(crate) const JEST_EXPECT: &str = "expect";

/// Per-file options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformOptions {
    /// Keep the legacy binding: the import stays and call sites keep their
    /// callee name
    pub standalone: bool,
}

/// Result of transforming one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformOutput {
    /// Rewritten source text
    pub source: String,
    /// Constructs left unrewritten, ordered by location
    pub diagnostics: Vec<Diagnostic>,
    /// The legacy binding found in the file, `None` when the file was left alone
    pub binding: Option<String>,
}

impl TransformOutput {
    /// Whether the output text differs from `original`
    #[must_use]
    pub fn is_changed(&self, original: &str) -> bool {
        self.source != original
    }
}

/// Variables recognized as holding a spy
///
/// Filled by the second spy pass and read by the third.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct SpyBindings {
    names: BTreeSet<String>,
}

impl SpyBindings {
    pub(crate) fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub(crate) fn names(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }
}

/// What every pass needs to know about the file being rewritten
#[derive(Debug)]
pub(crate) struct RewriteContext<'a> {
    /// Local name of the legacy entry point
    pub(crate) binding: &'a str,
    pub(crate) standalone: bool,
    pub(crate) catalog: &'a MatcherCatalog,
}

/// Migrates `expect` 1.x test files to Jest
#[derive(Debug, Clone, Default)]
pub struct Engine {
    catalog: MatcherCatalog,
}

impl Engine {
    /// Create an engine using the given matcher catalog
    #[must_use]
    pub fn new(catalog: MatcherCatalog) -> Self {
        Self { catalog }
    }

    /// The catalog this engine rewrites with
    #[must_use]
    pub fn catalog(&self) -> &MatcherCatalog {
        &self.catalog
    }

    /// Transform one file
    ///
    /// # Errors
    ///
    /// Fails when a rewrite produces a matcher missing from the arity table,
    /// or when an internal match rule does not compile. Unsupported code is
    /// never an error; it is reported through [`TransformOutput::diagnostics`].
    pub fn transform(
        &self,
        source_file: &SourceFile,
        options: &TransformOptions,
    ) -> Result<TransformOutput> {
        let start = Instant::now();
        let mut tree = SourceTree::parse(source_file);

        let Some(binding) = imports::locate(&tree, LEGACY_PACKAGE)? else {
            log::trace!(
                "No '{LEGACY_PACKAGE}' binding in {}, leaving it untouched",
                source_file.path.display()
            );
            return Ok(TransformOutput {
                source: source_file.content.clone(),
                diagnostics: Vec::new(),
                binding: None,
            });
        };
        log::debug!(
            "Transforming {} ('{LEGACY_PACKAGE}' bound to '{binding}')",
            source_file.path.display()
        );

        if !options.standalone {
            imports::remove(&mut tree, LEGACY_PACKAGE, None)?;
        }

        let context = RewriteContext {
            binding: &binding,
            standalone: options.standalone,
            catalog: &self.catalog,
        };
        let mut diagnostics = Diagnostics::default();

        matchers::rewrite(&mut tree, &context, &mut diagnostics)?;
        spies::flag_unsupported(&mut tree, &context, &mut diagnostics)?;
        let spy_bindings = spies::rewrite_factories(&mut tree, &context, &mut diagnostics)?;
        spies::rewrite_spy_variables(&mut tree, &spy_bindings, &mut diagnostics)?;
        if !options.standalone {
            globals::retarget_mock_factories(&mut tree, &context)?;
        }

        let diagnostics = diagnostics.into_sorted();
        log::debug!(
            "Transformed {} in {:?} ({} diagnostics)",
            source_file.path.display(),
            start.elapsed(),
            diagnostics.len()
        );

        Ok(TransformOutput {
            source: tree.into_source(),
            diagnostics,
            binding: Some(binding),
        })
    }
}
