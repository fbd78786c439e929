//! Non-fatal, location-tagged warnings about code that was left unrewritten

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::tree::{JsNode, SourceTree};
use crate::Location;

/// A warning attached to a position in the file being migrated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Human readable message
    pub message: String,
    /// Where the unsupported construct starts and ends
    pub location: Location,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Diagnostics collected while transforming one file
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub(crate) fn warn(
        &mut self,
        tree: &SourceTree,
        node: &JsNode<'_>,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            message: message.into(),
            location: tree.location(node),
        };
        log::warn!("{diagnostic}");
        self.items.push(diagnostic);
    }

    /// Diagnostics ordered by location
    pub(crate) fn into_sorted(mut self) -> Vec<Diagnostic> {
        self.items
            .sort_by(|a, b| a.location.cmp(&b.location).then_with(|| a.message.cmp(&b.message)));
        self.items
    }
}
