//! Byte-range edits collected during one rewrite pass
//!
//! A pass never mutates the tree while it is walking it. It records
//! replacements, insertions and removals against node ranges instead, and the
//! [`crate::SourceTree`] applies the whole set at the end of the pass.
//!
//! Rewrites nest: an outer rewrite that rebuilds a node from its sub-nodes
//! calls [`EditSet::render`] on each sub-node, which yields the sub-node text
//! with the inner edits applied and marks those edits as absorbed. Edits that
//! were never absorbed must not overlap; they are spliced in source order.

use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    range: Range<usize>,
    replacement: String,
    absorbed: bool,
}

impl Edit {
    fn is_insertion(&self) -> bool {
        self.range.is_empty()
    }

    /// Whether this edit lies inside `range`.
    ///
    /// With `keep_boundary_insertions`, insertions sitting exactly on the
    /// boundary of `range` are considered outside of it.
    fn within(&self, range: &Range<usize>, keep_boundary_insertions: bool) -> bool {
        if self.range.start < range.start || self.range.end > range.end {
            return false;
        }
        !(keep_boundary_insertions
            && self.is_insertion()
            && (self.range.start == range.start || self.range.start == range.end))
    }
}

/// Edits recorded by one pass
#[derive(Debug, Default)]
pub struct EditSet {
    edits: Vec<Edit>,
}

impl EditSet {
    /// Create an empty edit set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no edit was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Replace `range` by `text`.
    ///
    /// Pending edits strictly inside `range` are superseded; callers that
    /// want to keep them must build `text` through [`EditSet::render`].
    pub fn replace(&mut self, range: Range<usize>, text: impl Into<String>) {
        if !range.is_empty() {
            for edit in &mut self.edits {
                if !edit.absorbed && edit.within(&range, true) {
                    log::debug!(
                        "Edit at {:?} superseded by replacement of {:?}",
                        edit.range,
                        range
                    );
                    edit.absorbed = true;
                }
            }
        }
        self.edits.push(Edit {
            range,
            replacement: text.into(),
            absorbed: false,
        });
    }

    /// Insert `text` at byte offset `at`
    pub fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.replace(at..at, text);
    }

    /// Delete `range`
    pub fn remove(&mut self, range: Range<usize>) {
        self.replace(range, String::new());
    }

    /// Text of `range` in `source` with every pending edit inside it applied.
    ///
    /// The edits used are marked absorbed: the caller is expected to record a
    /// replacement built from the returned text.
    pub fn render(&mut self, source: &str, range: Range<usize>) -> String {
        let mut inner: Vec<usize> = self
            .edits
            .iter()
            .enumerate()
            .filter(|(_, edit)| !edit.absorbed && edit.within(&range, false))
            .map(|(index, _)| index)
            .collect();
        inner.sort_by_key(|&index| (self.edits[index].range.start, self.edits[index].range.end));

        let (text, _) = splice(
            source,
            range,
            inner.iter().map(|&index| &self.edits[index]),
        );
        for index in inner {
            self.edits[index].absorbed = true;
        }
        text
    }

    /// Apply every pending edit to `source`, also returning how offsets in
    /// the result map back into `source`
    pub fn apply_mapped(&self, source: &str) -> (String, OffsetMap) {
        let mut pending: Vec<&Edit> = self.edits.iter().filter(|edit| !edit.absorbed).collect();
        pending.sort_by_key(|edit| (edit.range.start, edit.range.end));
        splice(source, 0..source.len(), pending.into_iter())
    }
}

/// Offsets of rewritten text traced back to the text before the rewrite
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OffsetMap {
    /// Replaced range in the old text and the length of its replacement,
    /// in source order
    spans: Vec<(Range<usize>, usize)>,
}

impl OffsetMap {
    /// Offset in the old text corresponding to `offset` in the new one
    ///
    /// Offsets inside replacement text map to the start of the range it
    /// replaced.
    #[must_use]
    pub fn to_original(&self, offset: usize) -> usize {
        let mut grown = 0;
        let mut shrunk = 0;
        for (old, new_len) in &self.spans {
            let new_start = old.start + grown - shrunk;
            if offset < new_start {
                break;
            }
            if offset < new_start + new_len {
                return old.start;
            }
            grown += new_len;
            shrunk += old.len();
        }
        offset + shrunk - grown
    }
}

fn splice<'a>(
    source: &str,
    range: Range<usize>,
    edits: impl Iterator<Item = &'a Edit>,
) -> (String, OffsetMap) {
    let mut out = String::with_capacity(range.len());
    let mut map = OffsetMap::default();
    let mut cursor = range.start;
    for edit in edits {
        if edit.range.start < cursor {
            log::debug!(
                "Dropping edit at {:?} overlapping an earlier edit",
                edit.range
            );
            continue;
        }
        out.push_str(&source[cursor..edit.range.start]);
        out.push_str(&edit.replacement);
        map.spans
            .push((edit.range.clone(), edit.replacement.len()));
        cursor = edit.range.end;
    }
    out.push_str(&source[cursor..range.end]);
    (out, map)
}

#[cfg(test)]
mod tests {
    use super::*;

    impl EditSet {
        fn apply(&self, source: &str) -> String {
            self.apply_mapped(source).0
        }
    }

    #[test]
    fn test_apply_in_source_order() {
        let source = "expect(a).toExist()";
        let mut edits = EditSet::new();
        edits.replace(10..17, "toBeTruthy");
        edits.insert(7, "typeof ");

        assert_eq!(edits.apply(source), "expect(typeof a).toBeTruthy()");
    }

    #[test]
    fn test_insertions_around_replacement() {
        let source = "f(x)";
        let mut edits = EditSet::new();
        edits.replace(2..3, "y");
        edits.insert(2, "[");
        edits.insert(3, "]");

        assert_eq!(edits.apply(source), "f([y])");
    }

    #[test]
    fn test_render_absorbs_inner_edits() {
        let source = "outer(inner(1), 2)";
        let mut edits = EditSet::new();
        // inner rewrite first
        edits.replace(6..11, "renamed");

        let arg = edits.render(source, 6..14);
        assert_eq!(arg, "renamed(1)");

        edits.replace(0..18, format!("wrap({arg})"));
        assert_eq!(edits.apply(source), "wrap(renamed(1))");
    }

    #[test]
    fn test_replace_supersedes_unrendered_edits() {
        let source = "call(a, b)";
        let mut edits = EditSet::new();
        edits.replace(8..9, "c");
        edits.remove(6..9);

        assert_eq!(edits.apply(source), "call(a)");
    }

    #[test]
    fn test_boundary_insertion_survives_replacement() {
        let source = "x = value;";
        let mut edits = EditSet::new();
        edits.replace(4..9, "other");
        edits.insert(4, "typeof ");

        assert_eq!(edits.apply(source), "x = typeof other;");
    }

    #[test]
    fn test_offset_map_traces_back() {
        let source = "const expect = 1;\nfoo(bar);";
        let mut edits = EditSet::new();
        // drop the first line, grow `foo`
        edits.remove(0..18);
        edits.replace(18..21, "fooBar");

        let (text, map) = edits.apply_mapped(source);
        assert_eq!(text, "fooBar(bar);");

        // inside a replacement: start of the replaced range
        assert_eq!(map.to_original(0), 18);
        assert_eq!(map.to_original(3), 18);
        // after every edit: shifted by the net growth
        assert_eq!(map.to_original(7), source.find("bar").unwrap());
        assert_eq!(map.to_original(text.len()), source.len());
    }

    #[test]
    fn test_empty_set_is_identity() {
        let edits = EditSet::new();
        assert!(edits.is_empty());
        assert_eq!(edits.apply("const a = 1;"), "const a = 1;");
    }
}
