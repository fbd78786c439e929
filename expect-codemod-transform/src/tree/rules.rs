//! Structural match rules
//!
//! Rules are written as ast-grep YAML and compiled once per pass. Names taken
//! from the file being rewritten (the `expect` binding, spy variables) are
//! embedded as anchored regular expressions over identifier text.

use ast_grep_config::{from_yaml_string, GlobalRules, RuleCore};
use ast_grep_language::SupportLang;

use super::node_kinds::PROPERTY_IDENTIFIER;
use crate::errors::{Result, TransformError};
use crate::Language;

/// Compiled rule plus the id it was declared with
pub(crate) struct MatchRule {
    id: String,
    core: RuleCore,
}

impl std::fmt::Debug for MatchRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchRule").field("id", &self.id).finish()
    }
}

impl MatchRule {
    fn from_yaml(id: &str, yaml: &str) -> Result<Self> {
        let globals = GlobalRules::default();
        let mut configs = from_yaml_string::<SupportLang>(yaml, &globals)
            .map_err(|e| TransformError::rule(id, e.to_string()))?;
        if configs.is_empty() {
            return Err(TransformError::rule(id, "rule document is empty"));
        }
        let config = configs.swap_remove(0);
        log::trace!("Compiled match rule '{id}'");
        Ok(Self {
            id: id.to_string(),
            core: config.matcher,
        })
    }

    pub(crate) fn matcher(&self) -> &RuleCore {
        &self.core
    }

    /// Any node of the given kind
    #[cfg(test)]
    pub(crate) fn of_kind(language: Language, kind: &str) -> Result<Self> {
        let yaml = format!(
            r"
id: kind-{kind}
language: {language}
rule:
  kind: {kind}
"
        );
        Self::from_yaml(&format!("kind-{kind}"), &yaml)
    }

    /// Matcher accesses on an assertion call: `binding(...).matcher`
    pub(crate) fn matcher_accesses(language: Language, binding: &str) -> Result<Self> {
        let binding = anchored(&[binding]);
        let yaml = format!(
            r"
id: matcher-access
language: {language}
rule:
  kind: member_expression
  all:
    - has:
        field: object
        kind: call_expression
        has:
          field: function
          kind: identifier
          regex: '{binding}'
    - has:
        field: property
        kind: {PROPERTY_IDENTIFIER}
"
        );
        Self::from_yaml("matcher-access", &yaml)
    }

    /// Calls to a bare identifier among `names`, e.g. `spyOn(obj, 'm')`
    pub(crate) fn bare_calls(language: Language, names: &[&str]) -> Result<Self> {
        let names = anchored(names);
        let yaml = format!(
            r"
id: bare-call
language: {language}
rule:
  kind: call_expression
  has:
    field: function
    kind: identifier
    regex: '{names}'
"
        );
        Self::from_yaml("bare-call", &yaml)
    }

    /// Property accesses `object.property` where `object` is one of `objects`
    ///
    /// With `properties`, only those property names match.
    pub(crate) fn member_accesses(
        language: Language,
        objects: &[&str],
        properties: Option<&[&str]>,
    ) -> Result<Self> {
        let objects = anchored(objects);
        let property_regex = properties
            .map(|names| format!("\n        regex: '{}'", anchored(names)))
            .unwrap_or_default();
        let yaml = format!(
            r"
id: member-access
language: {language}
rule:
  kind: member_expression
  all:
    - has:
        field: object
        kind: identifier
        regex: '{objects}'
    - has:
        field: property
        kind: {PROPERTY_IDENTIFIER}{property_regex}
"
        );
        Self::from_yaml("member-access", &yaml)
    }

    /// Import declarations with a string source
    pub(crate) fn import_statements(language: Language) -> Result<Self> {
        let yaml = format!(
            r"
id: import-statement
language: {language}
rule:
  kind: import_statement
  has:
    field: source
    kind: string
"
        );
        Self::from_yaml("import-statement", &yaml)
    }
}

/// `^(a|b|c)$` with every name escaped
fn anchored(names: &[&str]) -> String {
    let alternatives: Vec<String> = names.iter().map(|name| regex::escape(name)).collect();
    format!("^({})$", alternatives.join("|"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SourceFile, SourceTree};
    use std::path::PathBuf;

    fn tree(content: &str, language: Language) -> SourceTree {
        SourceTree::parse(&SourceFile::with_language(
            PathBuf::from("rules.test.js"),
            content.to_string(),
            language,
        ))
    }

    fn texts(tree: &SourceTree, rule: &MatchRule) -> Vec<String> {
        tree.find_all(rule)
            .iter()
            .map(|node| node.text().to_string())
            .collect()
    }

    #[test]
    fn test_anchored_escapes_names() {
        assert_eq!(anchored(&["expect"]), "^(expect)$");
        assert_eq!(anchored(&["$spy", "b"]), r"^(\$spy|b)$");
    }

    #[test]
    fn test_matcher_accesses_only_on_binding() {
        let tree = tree(
            "expect(a).toExist();\nexpectNot(b).toExist();\nfoo.expect(c).toBe(1);\n",
            Language::JavaScript,
        );
        let rule = MatchRule::matcher_accesses(Language::JavaScript, "expect").unwrap();

        assert_eq!(texts(&tree, &rule), vec!["expect(a).toExist"]);
    }

    #[test]
    fn test_member_accesses_with_property_filter() {
        let tree = tree(
            "const s = expect.createSpy();\nexpect.spyOn(o, 'm');\nexpect.extend({});\n",
            Language::TypeScript,
        );
        let all = MatchRule::member_accesses(Language::TypeScript, &["expect"], None).unwrap();
        assert_eq!(texts(&tree, &all).len(), 3);

        let spies = MatchRule::member_accesses(
            Language::TypeScript,
            &["expect"],
            Some(&["createSpy", "spyOn"]),
        )
        .unwrap();
        assert_eq!(
            texts(&tree, &spies),
            vec!["expect.createSpy", "expect.spyOn"]
        );
    }

    #[test]
    fn test_bare_calls() {
        let tree = tree("spyOn(a, 'b');\nexpect.spyOn(a, 'b');\n", Language::Tsx);
        let rule = MatchRule::bare_calls(Language::Tsx, &["spyOn", "createSpy"]).unwrap();

        assert_eq!(texts(&tree, &rule), vec!["spyOn(a, 'b')"]);
    }

    #[test]
    fn test_invalid_rule_is_reported() {
        let err = MatchRule::from_yaml(
            "broken",
            "id: broken\nlanguage: javascript\nrule:\n  kind: [",
        )
        .unwrap_err();
        assert!(matches!(err, TransformError::Rule { ref rule_id, .. } if rule_id == "broken"));
    }
}
