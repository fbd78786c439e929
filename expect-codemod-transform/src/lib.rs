//! expect-codemod Core Library
//!
//! This library rewrites test files written against the `expect` 1.x assertion
//! and spy API into their Jest equivalents, working on a parsed syntax tree

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub(crate) mod errors;

// Static matcher tables
pub mod catalog;

// Location-tagged warnings
pub mod diagnostics;

// Import/require binding resolution
pub mod imports;

// Parsed source tree, edits and structural matching
pub mod tree;

// The rewrite passes and the engine driving them
pub mod transform;

// Batch API over files on disk
pub mod api;

use std::fmt::Display;
use std::path::{Path, PathBuf};

use ast_grep_language::SupportLang;
use serde::{Deserialize, Serialize};

pub use catalog::{Arity, MatcherCatalog, MatcherCategory, MatcherRule, TargetMatcher};
pub use diagnostics::Diagnostic;
pub use errors::{Result, TransformError};
pub use transform::{Engine, TransformOptions, TransformOutput};
pub use tree::SourceTree;

/// Language of the test file being migrated
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum Language {
    JavaScript,
    TypeScript,
    Tsx,
}

impl Language {
    /// Attempts to parse a language from a string representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use expect_codemod_transform::Language;
    ///
    /// assert_eq!(Language::try_from_str("js").unwrap(), Language::JavaScript);
    /// assert_eq!(Language::try_from_str("ts").unwrap(), Language::TypeScript);
    /// assert!(Language::try_from_str("python").is_err());
    /// ```
    pub fn try_from_str(s: &str) -> Result<Self> {
        match s {
            "javascript" | "js" | "jsx" | "mjs" | "cjs" => Ok(Self::JavaScript),
            "typescript" | "ts" | "mts" | "cts" => Ok(Self::TypeScript),
            "tsx" => Ok(Self::Tsx),
            _ => Err(TransformError::UnsupportedLanguage {
                language: s.to_string(),
            }),
        }
    }

    /// Detect the language from a file extension.
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        Self::try_from_str(&ext).ok()
    }

    /// Tree-sitter grammar used to parse files of this language
    pub(crate) fn support_lang(self) -> SupportLang {
        match self {
            Self::JavaScript => SupportLang::JavaScript,
            Self::TypeScript => SupportLang::TypeScript,
            Self::Tsx => SupportLang::Tsx,
        }
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let language_str = match self {
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
        };
        write!(f, "{language_str}")
    }
}

/// A test file handed to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct SourceFile {
    /// File system path, used to tag diagnostics
    pub path: PathBuf,
    /// Complete content of the file
    pub content: String,
    /// Grammar used to parse the content
    pub language: Language,
}

impl SourceFile {
    /// Create a `SourceFile` with explicit language specification.
    #[must_use]
    pub fn with_language(path: PathBuf, content: String, language: Language) -> Self {
        Self {
            path,
            content,
            language,
        }
    }
}

/// Represents a location in a source file
///
/// Serializes to the GNU coding standard
/// (https://www.gnu.org/prep/standards/html_node/Errors.html)
/// format: `filename:startLine.startCol-endLine.endCol`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    /// File path
    pub file_path: PathBuf,
    /// Starting position (line, column) - both 1-based
    pub start_position: (usize, usize),
    /// Ending position (line, column) - both 1-based
    pub end_position: (usize, usize),
}

impl Location {
    /// Create a new Location
    #[must_use]
    pub fn new(
        file_path: PathBuf,
        start_position: (usize, usize),
        end_position: (usize, usize),
    ) -> Self {
        Self {
            file_path,
            start_position,
            end_position,
        }
    }

    /// Create a new Location from an AST node
    #[must_use]
    pub fn from_node<T>(
        file_path: PathBuf,
        node: &ast_grep_core::Node<ast_grep_core::tree_sitter::StrDoc<T>>,
    ) -> Self
    where
        T: ast_grep_language::LanguageExt,
    {
        let start = node.start_pos();
        let end = node.end_pos();
        Self {
            file_path,
            start_position: (start.line() + 1, start.column(node) + 1),
            end_position: (end.line() + 1, end.column(node) + 1),
        }
    }

    /// Line where the node starts
    #[must_use]
    pub fn start_line(&self) -> usize {
        self.start_position.0
    }

    /// Column where the node starts
    #[must_use]
    pub fn start_col(&self) -> usize {
        self.start_position.1
    }

    /// Format as GNU coding standard: `filename:startLine.startCol-endLine.endCol`
    #[must_use]
    pub fn to_gnu_format(&self) -> String {
        let path_str = self.file_path.display();
        let (start_line, start_col) = self.start_position;
        let (end_line, end_col) = self.end_position;

        format!("{path_str}:{start_line}.{start_col}-{end_line}.{end_col}")
    }

    /// Parse a Location from GNU coding standard format:
    /// `filename:startLine.startCol-endLine.endCol`
    pub fn from_gnu_format(s: &str) -> std::result::Result<Self, String> {
        let colon_pos = s.rfind(':').ok_or("Missing colon separator")?;
        let (file_path_str, position_str) = s.split_at(colon_pos);
        let position_str = &position_str[1..];

        let (start_str, end_str) = position_str
            .split_once('-')
            .ok_or("Missing dash separator")?;

        let parse_position =
            |text: &str, which: &str| -> std::result::Result<(usize, usize), String> {
                let (line, col) = text
                    .split_once('.')
                    .ok_or_else(|| format!("Missing dot in {which} position"))?;
                let line = line
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid {which} line: {line}"))?;
                let col = col
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid {which} column: {col}"))?;
                Ok((line, col))
            };

        Ok(Self {
            file_path: PathBuf::from(file_path_str),
            start_position: parse_position(start_str, "start")?,
            end_position: parse_position(end_str, "end")?,
        })
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_gnu_format())
    }
}

impl Serialize for Location {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_gnu_format())
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_gnu_format(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_display() {
        assert_eq!(Language::JavaScript.to_string(), "javascript");
        assert_eq!(Language::TypeScript.to_string(), "typescript");
        assert_eq!(Language::Tsx.to_string(), "tsx");
    }

    #[test]
    fn test_language_try_from_str() {
        assert_eq!(
            Language::try_from_str("javascript").unwrap(),
            Language::JavaScript
        );
        assert_eq!(Language::try_from_str("mjs").unwrap(), Language::JavaScript);
        assert_eq!(Language::try_from_str("cts").unwrap(), Language::TypeScript);
        assert_eq!(Language::try_from_str("tsx").unwrap(), Language::Tsx);

        assert!(Language::try_from_str("coffee").is_err());
        assert!(Language::try_from_str("").is_err());
    }

    #[test]
    fn test_language_detect_from_path() {
        assert_eq!(
            Language::detect(Path::new("spec/foo.test.js")),
            Some(Language::JavaScript)
        );
        assert_eq!(
            Language::detect(Path::new("spec/Foo.test.TSX")),
            Some(Language::Tsx)
        );
        assert_eq!(Language::detect(Path::new("README")), None);
        assert_eq!(Language::detect(Path::new("notes.md")), None);
    }

    #[test]
    fn test_location_gnu_format() {
        let location = Location::new(PathBuf::from("test/a.test.js"), (10, 5), (15, 20));
        assert_eq!(location.to_gnu_format(), "test/a.test.js:10.5-15.20");
        assert_eq!(location.to_string(), "test/a.test.js:10.5-15.20");
    }

    #[test]
    fn test_location_from_gnu_format() {
        let location = Location::from_gnu_format("/home/user/spec/a.js:1.1-100.50").unwrap();

        assert_eq!(location.file_path, PathBuf::from("/home/user/spec/a.js"));
        assert_eq!(location.start_position, (1, 1));
        assert_eq!(location.end_position, (100, 50));
    }

    #[test]
    fn test_location_serialize_deserialize_roundtrip() {
        let original = Location::new(PathBuf::from("test/file.js"), (42, 13), (45, 7));

        let json = serde_json::to_string(&original).unwrap();
        assert_eq!(json, "\"test/file.js:42.13-45.7\"");

        let deserialized: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_location_from_gnu_format_invalid_formats() {
        assert!(Location::from_gnu_format("a.js10.5-15.20").is_err());
        assert!(Location::from_gnu_format("a.js:10.515.20").is_err());
        assert!(Location::from_gnu_format("a.js:105-1520").is_err());
        assert!(Location::from_gnu_format("a.js:abc.5-15.20").is_err());
        assert!(Location::from_gnu_format("").is_err());
    }
}
