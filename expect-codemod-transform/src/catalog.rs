//! Matcher catalog
//!
//! Read-only tables describing how each `expect` 1.x matcher maps onto a Jest
//! matcher. The tables are compiled once into a [`MatcherCatalog`] which the
//! [`crate::Engine`] owns; nothing mutates them afterwards.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Display;

use crate::errors::{Result, TransformError};

/// Source matcher name to target matcher path.
const MATCHER_RENAMES: &[(&str, &str)] = &[
    ("toExist", "toBeTruthy"),
    ("toNotExist", "toBeFalsy"),
    ("toNotBe", "not.toBe"),
    ("toNotEqual", "not.toEqual"),
    ("toNotThrow", "not.toThrow"),
    ("toBeA", "toBeInstanceOf"),
    ("toBeAn", "toBeInstanceOf"),
    ("toNotBeA", "not.toBeInstanceOf"),
    ("toNotBeAn", "not.toBeInstanceOf"),
    ("toNotMatch", "not.toMatch"),
    ("toBeFewerThan", "toBeLessThan"),
    ("toBeLessThanOrEqualTo", "toBeLessThanOrEqual"),
    ("toBeMoreThan", "toBeGreaterThan"),
    ("toBeGreaterThanOrEqualTo", "toBeGreaterThanOrEqual"),
    ("toInclude", "toContain"),
    ("toExclude", "not.toContain"),
    ("toNotContain", "not.toContain"),
    ("toNotInclude", "not.toContain"),
    ("toNotHaveBeenCalled", "not.toHaveBeenCalled"),
];

/// Maximum number of arguments accepted by each Jest matcher.
const JEST_MATCHER_ARITY: &[(&str, Arity)] = &[
    ("lastCalledWith", Arity::Unbounded),
    ("toBe", Arity::AtMost(1)),
    ("toBeCalled", Arity::AtMost(0)),
    ("toBeCalledWith", Arity::Unbounded),
    ("toBeCloseTo", Arity::AtMost(2)),
    ("toBeDefined", Arity::AtMost(0)),
    ("toBeFalsy", Arity::AtMost(0)),
    ("toBeGreaterThan", Arity::AtMost(1)),
    ("toBeGreaterThanOrEqual", Arity::AtMost(1)),
    ("toBeInstanceOf", Arity::AtMost(1)),
    ("toBeLessThan", Arity::AtMost(1)),
    ("toBeLessThanOrEqual", Arity::AtMost(1)),
    ("toBeNaN", Arity::AtMost(0)),
    ("toBeNull", Arity::AtMost(0)),
    ("toBeTruthy", Arity::AtMost(0)),
    ("toBeUndefined", Arity::AtMost(0)),
    ("toContain", Arity::AtMost(1)),
    ("toContainEqual", Arity::AtMost(1)),
    ("toEqual", Arity::AtMost(1)),
    ("toHaveBeenCalled", Arity::AtMost(0)),
    ("toHaveBeenCalledTimes", Arity::AtMost(1)),
    ("toHaveBeenCalledWith", Arity::Unbounded),
    ("toHaveBeenLastCalledWith", Arity::Unbounded),
    ("toHaveLength", Arity::AtMost(1)),
    ("toHaveProperty", Arity::AtMost(2)),
    ("toMatch", Arity::AtMost(1)),
    ("toMatchObject", Arity::AtMost(1)),
    ("toMatchSnapshot", Arity::AtMost(1)),
    ("toThrow", Arity::AtMost(1)),
    ("toThrowError", Arity::AtMost(1)),
    ("toThrowErrorMatchingSnapshot", Arity::AtMost(0)),
];

const TYPE_CHECK_MATCHERS: &[&str] = &["toBeA", "toBeAn", "toNotBeA", "toNotBeAn"];

const KEY_CONTAINMENT_MATCHERS: &[&str] = &[
    "toContainKey",
    "toExcludeKey",
    "toIncludeKey",
    "toNotContainKey",
    "toNotIncludeKey",
];

const KEYS_CONTAINMENT_MATCHERS: &[&str] = &[
    "toContainKeys",
    "toExcludeKeys",
    "toIncludeKeys",
    "toNotContainKeys",
    "toNotIncludeKeys",
];

const PATTERN_MATCH_MATCHERS: &[&str] = &["toMatch", "toNotMatch"];

/// How many arguments a matcher accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// At most this many arguments
    AtMost(usize),
    /// Any number of arguments
    Unbounded,
}

impl Arity {
    /// Whether `count` arguments is more than this arity allows
    #[must_use]
    pub fn is_exceeded_by(self, count: usize) -> bool {
        match self {
            Self::AtMost(max) => count > max,
            Self::Unbounded => false,
        }
    }
}

impl Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AtMost(max) => write!(f, "{max}"),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// Rewrite category of a source matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherCategory {
    /// Plain rename (or identity)
    Rename,
    /// `toBeA`-style checks: `typeof` comparison or `toBeInstanceOf`
    TypeCheck,
    /// Single key containment against `Object.keys(subject)`
    KeyContainment,
    /// Several keys, expanded into an iteration
    KeysContainment,
    /// `toMatch` that becomes `toMatchObject` for object literals
    PatternMatch,
}

/// A Jest matcher, possibly negated through `.not`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetMatcher {
    /// Matcher name without any `not.` prefix
    pub name: String,
    /// Whether the matcher is reached through `.not`
    pub negated: bool,
}

impl TargetMatcher {
    /// Create a target matcher
    pub fn new(name: impl Into<String>, negated: bool) -> Self {
        Self {
            name: name.into(),
            negated,
        }
    }

    /// Parse a member path such as `not.toEqual`
    #[must_use]
    pub fn parse(path: &str) -> Self {
        match path.strip_prefix("not.") {
            Some(name) => Self::new(name, true),
            None => Self::new(path, false),
        }
    }

    /// Member path written after the assertion subject, e.g. `not.toEqual`
    #[must_use]
    pub fn path(&self) -> String {
        if self.negated {
            format!("not.{}", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Compiled rewrite rule for one source matcher name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatcherRule {
    /// `expect` 1.x matcher name
    pub source_name: String,
    /// Matcher produced by the rename step
    pub target: TargetMatcher,
    /// Arity of `target`, `None` when the arity table has no entry for it
    pub max_args: Option<Arity>,
    /// Structural rewrite category
    pub category: MatcherCategory,
}

/// The rule tables, compiled into lookup maps
#[derive(Debug, Clone)]
pub struct MatcherCatalog {
    rules: HashMap<String, MatcherRule>,
    arity: HashMap<String, Arity>,
}

impl Default for MatcherCatalog {
    fn default() -> Self {
        Self::expect_to_jest()
    }
}

impl MatcherCatalog {
    /// Catalog for migrating `expect` 1.x matchers to Jest
    #[must_use]
    pub fn expect_to_jest() -> Self {
        Self::from_tables(
            MATCHER_RENAMES,
            JEST_MATCHER_ARITY,
            &[
                (MatcherCategory::TypeCheck, TYPE_CHECK_MATCHERS),
                (MatcherCategory::KeyContainment, KEY_CONTAINMENT_MATCHERS),
                (MatcherCategory::KeysContainment, KEYS_CONTAINMENT_MATCHERS),
                (MatcherCategory::PatternMatch, PATTERN_MATCH_MATCHERS),
            ],
        )
    }

    /// Compile a catalog from raw tables
    ///
    /// Every name mentioned in `renames` or in a category set gets a rule; the
    /// category of a name is decided here, once.
    #[must_use]
    pub fn from_tables(
        renames: &[(&str, &str)],
        arity: &[(&str, Arity)],
        categories: &[(MatcherCategory, &[&str])],
    ) -> Self {
        let arity: HashMap<String, Arity> = arity
            .iter()
            .map(|(name, arity)| ((*name).to_string(), *arity))
            .collect();
        let renames: HashMap<&str, &str> = renames.iter().copied().collect();

        let mut names: Vec<&str> = renames.keys().copied().collect();
        for (_, members) in categories {
            names.extend(members.iter().copied());
        }

        let rules = names
            .into_iter()
            .map(|name| {
                let category = categories
                    .iter()
                    .find(|(_, members)| members.contains(&name))
                    .map_or(MatcherCategory::Rename, |(category, _)| *category);
                let target = TargetMatcher::parse(renames.get(name).copied().unwrap_or(name));
                let max_args = arity.get(&target.name).copied();
                let rule = MatcherRule {
                    source_name: name.to_string(),
                    target,
                    max_args,
                    category,
                };
                (name.to_string(), rule)
            })
            .collect();

        Self { rules, arity }
    }

    /// Rule for a matcher name; unknown names get an identity rename
    #[must_use]
    pub fn resolve(&self, matcher: &str) -> Cow<'_, MatcherRule> {
        match self.rules.get(matcher) {
            Some(rule) => Cow::Borrowed(rule),
            None => {
                let target = TargetMatcher::new(matcher, false);
                Cow::Owned(MatcherRule {
                    source_name: matcher.to_string(),
                    max_args: self.arity.get(&target.name).copied(),
                    target,
                    category: MatcherCategory::Rename,
                })
            }
        }
    }

    /// Arity of a target matcher
    ///
    /// A missing entry means the tables are inconsistent with what the
    /// rewriter produces, which is fatal for the file being processed.
    pub fn max_args(&self, target: &TargetMatcher) -> Result<Arity> {
        self.arity
            .get(&target.name)
            .copied()
            .ok_or_else(|| TransformError::unknown_matcher(&target.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_targets_carry_negation() {
        let catalog = MatcherCatalog::expect_to_jest();

        let rule = catalog.resolve("toNotEqual");
        assert_eq!(rule.target, TargetMatcher::new("toEqual", true));
        assert_eq!(rule.target.path(), "not.toEqual");
        assert_eq!(rule.category, MatcherCategory::Rename);

        // "Not" in the source name does not negate a positive target
        let rule = catalog.resolve("toNotExist");
        assert_eq!(rule.target.path(), "toBeFalsy");
    }

    #[test]
    fn test_categories_are_assigned_once() {
        let catalog = MatcherCatalog::expect_to_jest();

        assert_eq!(
            catalog.resolve("toNotBeAn").category,
            MatcherCategory::TypeCheck
        );
        assert_eq!(
            catalog.resolve("toExcludeKey").category,
            MatcherCategory::KeyContainment
        );
        assert_eq!(
            catalog.resolve("toIncludeKeys").category,
            MatcherCategory::KeysContainment
        );
        assert_eq!(
            catalog.resolve("toNotMatch").category,
            MatcherCategory::PatternMatch
        );
        assert_eq!(catalog.resolve("toMatch").target.path(), "toMatch");
    }

    #[test]
    fn test_unknown_matcher_is_identity() {
        let catalog = MatcherCatalog::expect_to_jest();

        let rule = catalog.resolve("toEqual");
        assert!(matches!(rule, Cow::Owned(_)));
        assert_eq!(rule.target.path(), "toEqual");
        assert_eq!(rule.max_args, Some(Arity::AtMost(1)));

        let rule = catalog.resolve("toBeShiny");
        assert_eq!(rule.max_args, None);
    }

    #[test]
    fn test_every_rename_target_has_an_arity() {
        let catalog = MatcherCatalog::expect_to_jest();
        for (source, _) in MATCHER_RENAMES {
            let rule = catalog.resolve(source);
            assert!(
                rule.max_args.is_some(),
                "missing arity for target of {source}"
            );
        }
    }

    #[test]
    fn test_max_args_missing_entry_is_an_error() {
        let catalog = MatcherCatalog::expect_to_jest();

        assert_eq!(
            catalog.max_args(&TargetMatcher::new("toBe", true)).unwrap(),
            Arity::AtMost(1)
        );
        assert_eq!(
            catalog
                .max_args(&TargetMatcher::new("toHaveBeenCalledWith", false))
                .unwrap(),
            Arity::Unbounded
        );

        let err = catalog
            .max_args(&TargetMatcher::new("toBeShiny", false))
            .unwrap_err();
        assert!(matches!(
            err,
            TransformError::UnknownMatcher { ref matcher } if matcher == "toBeShiny"
        ));
    }

    #[test]
    fn test_arity_bounds() {
        assert!(Arity::AtMost(1).is_exceeded_by(2));
        assert!(!Arity::AtMost(1).is_exceeded_by(1));
        assert!(!Arity::Unbounded.is_exceeded_by(42));
        assert_eq!(Arity::AtMost(2).to_string(), "2");
    }

    #[test]
    fn test_custom_tables() {
        let catalog = MatcherCatalog::from_tables(
            &[("toBeOk", "toBeTruthy")],
            &[("toBeTruthy", Arity::AtMost(0))],
            &[],
        );

        let rule = catalog.resolve("toBeOk");
        assert_eq!(rule.target.path(), "toBeTruthy");
        assert_eq!(rule.max_args, Some(Arity::AtMost(0)));
        assert!(catalog.max_args(&TargetMatcher::new("toBe", false)).is_err());
    }
}
