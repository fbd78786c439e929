//! Parsed source files
//!
//! [`SourceTree`] owns the text of one file together with its tree-sitter
//! tree. Rewrites never touch the tree directly: each pass records an
//! [`EditSet`] against the current tree and hands it to [`SourceTree::apply`],
//! which splices the edits into the text and parses the result again.

pub(crate) mod edit;
pub(crate) mod node_kinds;
pub(crate) mod rules;

use std::path::{Path, PathBuf};

use ast_grep_core::matcher::Pattern;
use ast_grep_core::tree_sitter::{LanguageExt, StrDoc};
use ast_grep_core::{AstGrep, MatchStrictness, Node, NodeMatch};
use ast_grep_language::SupportLang;

pub(crate) use edit::{EditSet, OffsetMap};
pub(crate) use rules::MatchRule;

use crate::{Language, Location, SourceFile};

pub(crate) type JsDoc = StrDoc<SupportLang>;
pub(crate) type JsNode<'r> = Node<'r, JsDoc>;

const DEFAULT_INDENT_UNIT: &str = "  ";

/// One parsed test file
pub struct SourceTree {
    path: PathBuf,
    language: Language,
    source: String,
    ast: AstGrep<JsDoc>,
    /// Text as it was parsed first
    original: String,
    /// One offset map per applied pass, oldest first
    history: Vec<OffsetMap>,
}

impl SourceTree {
    /// Parse a source file
    #[must_use]
    pub fn parse(source_file: &SourceFile) -> Self {
        let ast = source_file
            .language
            .support_lang()
            .ast_grep(&source_file.content);
        Self {
            path: source_file.path.clone(),
            language: source_file.language,
            source: source_file.content.clone(),
            ast,
            original: source_file.content.clone(),
            history: Vec::new(),
        }
    }

    /// Path of the file, as given to [`SourceTree::parse`]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Language the file was parsed as
    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    /// Current text of the file
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Consume the tree, returning the current text
    #[must_use]
    pub fn into_source(self) -> String {
        self.source
    }

    pub(crate) fn root(&self) -> JsNode<'_> {
        self.ast.root()
    }

    /// Every node matching `rule`, in document order (ancestors first).
    pub(crate) fn find_all(&self, rule: &MatchRule) -> Vec<JsNode<'_>> {
        self.root()
            .find_all(rule.matcher())
            .map(|node_match| node_match.get_node().clone())
            .collect()
    }

    /// Every match of an ast-grep pattern, in document order
    pub(crate) fn find_pattern(&self, pattern: &str) -> Vec<NodeMatch<'_, JsDoc>> {
        let pattern = Pattern::new(pattern, self.language.support_lang())
            .with_strictness(MatchStrictness::Relaxed);
        self.root().find_all(pattern).collect()
    }

    /// Location of `node` in the text as it was before any pass ran
    pub(crate) fn location(&self, node: &JsNode<'_>) -> Location {
        if self.history.is_empty() {
            return Location::from_node(self.path.clone(), node);
        }
        let range = node.range();
        let start = self.original_offset(range.start);
        let end = self.original_offset(range.end).max(start);
        Location::new(
            self.path.clone(),
            position(&self.original, start),
            position(&self.original, end),
        )
    }

    fn original_offset(&self, offset: usize) -> usize {
        self.history
            .iter()
            .rev()
            .fold(offset, |offset, map| map.to_original(offset))
    }

    /// Apply a pass's edits and re-parse. Returns whether anything changed.
    pub(crate) fn apply(&mut self, edits: &EditSet) -> bool {
        if edits.is_empty() {
            return false;
        }
        let (rewritten, map) = edits.apply_mapped(&self.source);
        if rewritten == self.source {
            return false;
        }
        self.ast = self.language.support_lang().ast_grep(&rewritten);
        self.source = rewritten;
        self.history.push(map);
        true
    }

    /// Leading whitespace of the line containing byte offset `at`
    pub(crate) fn line_indent(&self, at: usize) -> &str {
        let line_start = line_start(&self.source, at);
        let line = &self.source[line_start..];
        let width = line
            .find(|c: char| c != ' ' && c != '\t')
            .unwrap_or(line.len());
        &line[..width]
    }

    /// Indentation unit used by the file
    ///
    /// A tab if the first indented code line starts with one, otherwise the
    /// narrowest space indentation of a code line. Comment lines (such as the
    /// ` * ` lines of a block comment) are ignored. Defaults to two spaces.
    pub(crate) fn indent_unit(&self) -> String {
        let mut narrowest: Option<usize> = None;
        for line in self.source.lines().filter(|line| is_code_line(line)) {
            if line.starts_with('\t') && narrowest.is_none() {
                return "\t".to_string();
            }
            let spaces = line.len() - line.trim_start_matches(' ').len();
            if spaces > 0 {
                narrowest = Some(narrowest.map_or(spaces, |width| width.min(spaces)));
            }
        }
        narrowest.map_or_else(
            || DEFAULT_INDENT_UNIT.to_string(),
            |width| " ".repeat(width),
        )
    }
}

impl std::fmt::Debug for SourceTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceTree")
            .field("path", &self.path)
            .field("language", &self.language)
            .field("len", &self.source.len())
            .finish_non_exhaustive()
    }
}

/// Whether a line has content other than a comment
fn is_code_line(line: &str) -> bool {
    let content = line.trim_start();
    !content.is_empty()
        && !content.starts_with('*')
        && !content.starts_with("//")
        && !content.starts_with("/*")
}

/// 1-based (line, column) of a byte offset, columns counted in characters
fn position(text: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let line = text[..offset].matches('\n').count();
    let column = text[line_start(text, offset)..offset].chars().count();
    (line + 1, column + 1)
}

/// Byte offset of the start of the line containing `at`
pub(crate) fn line_start(source: &str, at: usize) -> usize {
    source[..at].rfind('\n').map_or(0, |newline| newline + 1)
}

/// Byte offset just past the end of the line containing `at`, newline included
pub(crate) fn line_end(source: &str, at: usize) -> usize {
    source[at..]
        .find('\n')
        .map_or(source.len(), |newline| at + newline + 1)
}

/// Whether two handles denote the same node
pub(crate) fn same_node(a: &JsNode<'_>, b: &JsNode<'_>) -> bool {
    a.range() == b.range() && a.kind() == b.kind()
}

/// Whether `child` is the `field` child of `parent`
pub(crate) fn is_field(parent: &JsNode<'_>, field: &str, child: &JsNode<'_>) -> bool {
    parent
        .field(field)
        .is_some_and(|node| same_node(&node, child))
}

/// Argument expressions of a call, comments excluded
pub(crate) fn call_arguments<'r>(call: &JsNode<'r>) -> Vec<JsNode<'r>> {
    call.field("arguments")
        .map(|arguments| {
            arguments
                .children()
                .filter(|child| child.is_named() && child.kind() != node_kinds::COMMENT)
                .collect()
        })
        .unwrap_or_default()
}

/// Whether `node` is a plain literal (string, number, boolean, null or regex)
pub(crate) fn is_literal(node: &JsNode<'_>) -> bool {
    use node_kinds::{FALSE, NULL, NUMBER, REGEX, STRING, TRUE};
    matches!(&*node.kind(), STRING | NUMBER | TRUE | FALSE | NULL | REGEX)
}

/// Unquoted value of a string literal node
pub(crate) fn string_value(node: &JsNode<'_>) -> Option<String> {
    if node.kind() != node_kinds::STRING {
        return None;
    }
    let text = node.text();
    let inner = text
        .strip_prefix(['\'', '"'])
        .and_then(|rest| rest.strip_suffix(['\'', '"']))?;
    Some(inner.to_string())
}

/// Named children of `node` excluding comments
pub(crate) fn named_children<'r>(node: &JsNode<'r>) -> Vec<JsNode<'r>> {
    node.children()
        .filter(|child| child.is_named() && child.kind() != node_kinds::COMMENT)
        .collect()
}
