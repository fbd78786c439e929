//! Import and require bindings of a package
//!
//! Resolves the local name a file binds a package (or one of its members) to,
//! across CommonJS `require` calls and ES `import` declarations, and removes
//! those bindings from the source.
//!
//! Supported shapes:
//!
//! ```text
//! const expect = require('expect');            // locate
//! import expect from 'expect';                 // locate
//! import * as expect from 'expect';            // locate
//! const spy = require('expect').createSpy;     // locate_member
//! const { createSpy: spy } = require('expect'); // locate_member
//! import { createSpy as spy } from 'expect';   // locate_member
//! ```

use crate::errors::Result;
use crate::tree::node_kinds::{
    EXPRESSION_STATEMENT, IDENTIFIER, IMPORT_CLAUSE, IMPORT_SPECIFIER, LEXICAL_DECLARATION,
    MEMBER_EXPRESSION, NAMED_IMPORTS, NAMESPACE_IMPORT, OBJECT_PATTERN, PAIR_PATTERN,
    SHORTHAND_PROPERTY_IDENTIFIER_PATTERN, VARIABLE_DECLARATION, VARIABLE_DECLARATOR,
};
use crate::tree::{
    is_field, line_end, line_start, named_children, same_node, string_value, EditSet, JsNode,
    MatchRule, SourceTree,
};

/// Local name bound to the whole package, if any
///
/// Recognizes `const x = require(pkg)` (and `require(pkg).default`), default
/// imports and namespace imports. The first binding in the file wins.
pub fn locate(tree: &SourceTree, package: &str) -> Result<Option<String>> {
    let mut found: Vec<(usize, String)> = Vec::new();

    for call in require_calls(tree, package) {
        let Some((declarator, member)) = requiring_declarator(&call) else {
            continue;
        };
        if member.as_deref().is_some_and(|member| member != "default") {
            continue;
        }
        if let Some(name) = declarator.field("name").filter(|name| name.kind() == IDENTIFIER) {
            found.push((declarator.range().start, name.text().to_string()));
        }
    }

    for import in package_imports(tree, package)? {
        if let Some(alias) = namespace_alias(&import) {
            found.push((import.range().start, alias));
        }
    }

    Ok(found.into_iter().min_by_key(|(at, _)| *at).map(|(_, alias)| alias))
}

/// Local name bound to `member` of the package, if any
pub fn locate_member(tree: &SourceTree, package: &str, member: &str) -> Result<Option<String>> {
    let mut found: Vec<(usize, String)> = Vec::new();

    for call in require_calls(tree, package) {
        let Some((declarator, required_member)) = requiring_declarator(&call) else {
            continue;
        };
        let Some(name) = declarator.field("name") else {
            continue;
        };
        match required_member {
            Some(required) if required == member && name.kind() == IDENTIFIER => {
                found.push((declarator.range().start, name.text().to_string()));
            }
            None if name.kind() == OBJECT_PATTERN => {
                if let Some((property, alias)) = pattern_binding(&name, member) {
                    found.push((property.range().start, alias));
                }
            }
            _ => {}
        }
    }

    for import in package_imports(tree, package)? {
        for (specifier, alias) in import_specifiers(&import) {
            if imported_name(&specifier).as_deref() == Some(member) {
                found.push((specifier.range().start, alias));
            }
        }
    }

    Ok(found.into_iter().min_by_key(|(at, _)| *at).map(|(_, alias)| alias))
}

/// Remove the bindings of a package, or only of one of its members
///
/// Without `member`, every `require`/`import` of the package goes, bare
/// `require(pkg);` statements included. With `member`, only that member's
/// entries are removed; a destructuring or import list loses the entry and
/// the whole declaration goes only when the entry was its sole member.
///
/// Returns the local name the removed binding had, as [`locate`] or
/// [`locate_member`] reports it.
pub fn remove(
    tree: &mut SourceTree,
    package: &str,
    member: Option<&str>,
) -> Result<Option<String>> {
    let alias = match member {
        Some(member) => locate_member(tree, package, member)?,
        None => locate(tree, package)?,
    };

    let edits = {
        let source = tree.source();
        let mut edits = EditSet::new();
        let mut statements: Vec<JsNode<'_>> = Vec::new();
        let mut declarations: Vec<(JsNode<'_>, Vec<JsNode<'_>>)> = Vec::new();

        for call in require_calls(tree, package) {
            let Some((declarator, required_member)) = requiring_declarator(&call) else {
                if member.is_none() {
                    if let Some(statement) = call
                        .parent()
                        .filter(|parent| parent.kind() == EXPRESSION_STATEMENT)
                    {
                        statements.push(statement);
                    }
                }
                continue;
            };

            let Some(member) = member else {
                add_declarator(&mut declarations, declarator);
                continue;
            };

            if required_member.as_deref() == Some(member) {
                add_declarator(&mut declarations, declarator);
                continue;
            }
            if required_member.is_some() {
                continue;
            }
            let Some(pattern) = declarator
                .field("name")
                .filter(|name| name.kind() == OBJECT_PATTERN)
            else {
                continue;
            };
            let properties = named_children(&pattern);
            let removed: Vec<bool> = properties
                .iter()
                .map(|property| property_key(property).as_deref() == Some(member))
                .collect();
            if !removed.contains(&true) {
                continue;
            }
            if removed.iter().all(|removed| *removed) {
                add_declarator(&mut declarations, declarator);
            } else {
                remove_list_items(&mut edits, &properties, &removed);
            }
        }

        for import in package_imports(tree, package)? {
            let Some(member) = member else {
                statements.push(import);
                continue;
            };
            remove_import_member(&mut edits, &mut statements, import, member);
        }

        for (declaration, removed_declarators) in declarations {
            let declarators: Vec<JsNode<'_>> = named_children(&declaration)
                .into_iter()
                .filter(|child| child.kind() == VARIABLE_DECLARATOR)
                .collect();
            let removed: Vec<bool> = declarators
                .iter()
                .map(|declarator| {
                    removed_declarators
                        .iter()
                        .any(|removed| same_node(removed, declarator))
                })
                .collect();
            if removed.iter().all(|removed| *removed) {
                statements.push(declaration);
            } else {
                remove_list_items(&mut edits, &declarators, &removed);
            }
        }

        for statement in &statements {
            remove_statement(&mut edits, source, statement);
        }
        edits
    };

    if tree.apply(&edits) {
        log::debug!(
            "Removed binding of '{package}'{} from {}",
            member.map(|member| format!(" member '{member}'")).unwrap_or_default(),
            tree.path().display()
        );
    }
    Ok(alias)
}

/// `require(package)` calls with a single string argument
fn require_calls<'r>(tree: &'r SourceTree, package: &str) -> Vec<JsNode<'r>> {
    tree.find_pattern("require($MOD)")
        .into_iter()
        .filter(|node_match| {
            node_match
                .get_env()
                .get_match("MOD")
                .and_then(string_value)
                .is_some_and(|module| module == package)
        })
        .map(|node_match| node_match.get_node().clone())
        .collect()
}

/// Import declarations whose source is `package`
fn package_imports<'r>(tree: &'r SourceTree, package: &str) -> Result<Vec<JsNode<'r>>> {
    let rule = MatchRule::import_statements(tree.language())?;
    Ok(tree
        .find_all(&rule)
        .into_iter()
        .filter(|import| {
            import
                .field("source")
                .and_then(|source| string_value(&source))
                .is_some_and(|source| source == package)
        })
        .collect())
}

/// The declarator directly bound to a require call, with the member read
/// off the module object (`require(pkg).member`) if any
fn requiring_declarator<'r>(call: &JsNode<'r>) -> Option<(JsNode<'r>, Option<String>)> {
    let parent = call.parent()?;
    if parent.kind() == VARIABLE_DECLARATOR && is_field(&parent, "value", call) {
        return Some((parent, None));
    }
    if parent.kind() == MEMBER_EXPRESSION && is_field(&parent, "object", call) {
        let member = parent.field("property")?.text().to_string();
        let declarator = parent.parent()?;
        if declarator.kind() == VARIABLE_DECLARATOR && is_field(&declarator, "value", &parent) {
            return Some((declarator, Some(member)));
        }
    }
    None
}

fn import_clause<'r>(import: &JsNode<'r>) -> Option<JsNode<'r>> {
    named_children(import)
        .into_iter()
        .find(|child| child.kind() == IMPORT_CLAUSE)
}

/// Alias of a default or namespace import
fn namespace_alias(import: &JsNode<'_>) -> Option<String> {
    named_children(&import_clause(import)?)
        .into_iter()
        .find_map(|binding| match &*binding.kind() {
            IDENTIFIER => Some(binding.text().to_string()),
            NAMESPACE_IMPORT => named_children(&binding)
                .into_iter()
                .find(|child| child.kind() == IDENTIFIER)
                .map(|alias| alias.text().to_string()),
            _ => None,
        })
}

fn named_imports<'r>(import: &JsNode<'r>) -> Option<JsNode<'r>> {
    named_children(&import_clause(import)?)
        .into_iter()
        .find(|child| child.kind() == NAMED_IMPORTS)
}

/// `import { a, b as c }` entries with the local name each binds
fn import_specifiers<'r>(import: &JsNode<'r>) -> Vec<(JsNode<'r>, String)> {
    let Some(list) = named_imports(import) else {
        return Vec::new();
    };
    named_children(&list)
        .into_iter()
        .filter(|specifier| specifier.kind() == IMPORT_SPECIFIER)
        .filter_map(|specifier| {
            let local = specifier
                .field("alias")
                .or_else(|| specifier.field("name"))?
                .text()
                .to_string();
            Some((specifier, local))
        })
        .collect()
}

fn imported_name(specifier: &JsNode<'_>) -> Option<String> {
    let name = specifier.field("name")?;
    string_value(&name).or_else(|| Some(name.text().to_string()))
}

/// Property key of a destructuring entry
fn property_key(property: &JsNode<'_>) -> Option<String> {
    match &*property.kind() {
        SHORTHAND_PROPERTY_IDENTIFIER_PATTERN => Some(property.text().to_string()),
        PAIR_PATTERN => {
            let key = property.field("key")?;
            string_value(&key).or_else(|| Some(key.text().to_string()))
        }
        _ => None,
    }
}

/// Destructuring entry for `member` and the local name it binds
fn pattern_binding<'r>(pattern: &JsNode<'r>, member: &str) -> Option<(JsNode<'r>, String)> {
    named_children(pattern).into_iter().find_map(|property| {
        if property_key(&property).as_deref() != Some(member) {
            return None;
        }
        let alias = if property.kind() == PAIR_PATTERN {
            let value = property.field("value")?;
            if value.kind() != IDENTIFIER {
                return None;
            }
            value.text().to_string()
        } else {
            property.text().to_string()
        };
        Some((property, alias))
    })
}

fn add_declarator<'r>(
    declarations: &mut Vec<(JsNode<'r>, Vec<JsNode<'r>>)>,
    declarator: JsNode<'r>,
) {
    let Some(declaration) = declarator
        .parent()
        .filter(|parent| matches!(&*parent.kind(), LEXICAL_DECLARATION | VARIABLE_DECLARATION))
    else {
        log::debug!("Not removing declarator outside of a declaration: {}", declarator.text());
        return;
    };
    match declarations
        .iter_mut()
        .find(|(existing, _)| same_node(existing, &declaration))
    {
        Some((_, declarators)) => declarators.push(declarator),
        None => declarations.push((declaration, vec![declarator])),
    }
}

fn remove_import_member<'r>(
    edits: &mut EditSet,
    statements: &mut Vec<JsNode<'r>>,
    import: JsNode<'r>,
    member: &str,
) {
    let Some(list) = named_imports(&import) else {
        return;
    };
    let specifiers: Vec<JsNode<'r>> = named_children(&list)
        .into_iter()
        .filter(|specifier| specifier.kind() == IMPORT_SPECIFIER)
        .collect();
    let removed: Vec<bool> = specifiers
        .iter()
        .map(|specifier| imported_name(specifier).as_deref() == Some(member))
        .collect();
    if !removed.contains(&true) {
        return;
    }
    if !removed.iter().all(|removed| *removed) {
        remove_list_items(edits, &specifiers, &removed);
        return;
    }

    // The named list empties out: drop it, or the whole statement if the
    // import binds nothing else.
    match list.prev().filter(|previous| previous.text() == ",") {
        Some(comma) => match comma.prev() {
            Some(default) => edits.remove(default.range().end..list.range().end),
            None => statements.push(import),
        },
        None => statements.push(import),
    }
}

/// Remove the marked entries of a comma separated list, with their commas
fn remove_list_items(edits: &mut EditSet, items: &[JsNode<'_>], removed: &[bool]) {
    let mut index = 0;
    while index < items.len() {
        if !removed[index] {
            index += 1;
            continue;
        }
        let run_start = index;
        while index < items.len() && removed[index] {
            index += 1;
        }
        if index < items.len() {
            edits.remove(items[run_start].range().start..items[index].range().start);
        } else if run_start > 0 {
            let start = items[run_start - 1].range().end;
            edits.remove(start..items[index - 1].range().end);
        }
    }
}

/// Remove a statement, with its whole line when nothing else shares it
fn remove_statement(edits: &mut EditSet, source: &str, statement: &JsNode<'_>) {
    let range = statement.range();
    let start = line_start(source, range.start);
    let end = line_end(source, range.end);
    if source[start..range.start].trim().is_empty() && source[range.end..end].trim().is_empty() {
        edits.remove(start..end);
    } else {
        edits.remove(range);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Language, SourceFile};
    use std::path::PathBuf;

    fn tree(content: &str) -> SourceTree {
        SourceTree::parse(&SourceFile::with_language(
            PathBuf::from("imports.test.js"),
            content.to_string(),
            Language::JavaScript,
        ))
    }

    #[test]
    fn test_locate_whole_package() {
        assert_eq!(
            locate(&tree("const expect = require('expect');\n"), "expect").unwrap(),
            Some("expect".to_string())
        );
        assert_eq!(
            locate(&tree("import expectLib from \"expect\";\n"), "expect").unwrap(),
            Some("expectLib".to_string())
        );
        assert_eq!(
            locate(&tree("import * as ns from 'expect';\n"), "expect").unwrap(),
            Some("ns".to_string())
        );
        assert_eq!(
            locate(&tree("const e = require('expect').default;\n"), "expect").unwrap(),
            Some("e".to_string())
        );
        assert_eq!(
            locate(&tree("const chai = require('chai');\n"), "expect").unwrap(),
            None
        );
    }

    #[test]
    fn test_locate_ignores_destructuring() {
        let tree = tree("const { createSpy } = require('expect');\n");
        assert_eq!(locate(&tree, "expect").unwrap(), None);
    }

    #[test]
    fn test_locate_member_forms() {
        let cases = [
            ("const { expect } = require('chai');\n", "expect"),
            ("const { expect: check } = require('chai');\n", "check"),
            ("const check = require('chai').expect;\n", "check"),
            ("import { expect as check } from 'chai';\n", "check"),
            ("import { expect } from 'chai';\n", "expect"),
        ];
        for (source, alias) in cases {
            assert_eq!(
                locate_member(&tree(source), "chai", "expect").unwrap().as_deref(),
                Some(alias),
                "{source}"
            );
        }
        let chai = tree("const { assert } = require('chai');\n");
        assert_eq!(locate_member(&chai, "chai", "expect").unwrap(), None);
    }

    #[test]
    fn test_remove_whole_line() {
        let mut tree = tree("const expect = require('expect');\nconst a = 1;\n");
        let alias = remove(&mut tree, "expect", None).unwrap();

        assert_eq!(alias.as_deref(), Some("expect"));
        assert_eq!(tree.source(), "const a = 1;\n");
    }

    #[test]
    fn test_remove_import_and_bare_require() {
        let mut tree =
            tree("import expect from 'expect';\nrequire('expect');\nit('x', () => {});\n");
        remove(&mut tree, "expect", None).unwrap();

        assert_eq!(tree.source(), "it('x', () => {});\n");
    }

    #[test]
    fn test_remove_declarator_with_comma() {
        let mut tree = tree("const a = 1, expect = require('expect'), b = 2;\n");
        remove(&mut tree, "expect", None).unwrap();
        assert_eq!(tree.source(), "const a = 1, b = 2;\n");

        let mut tree = self::tree("var expect = require('expect'), sinon = require('sinon');\n");
        remove(&mut tree, "expect", None).unwrap();
        assert_eq!(tree.source(), "var sinon = require('sinon');\n");
    }

    #[test]
    fn test_remove_keeps_shared_line() {
        let mut tree = tree("const a = 1; const expect = require('expect');\n");
        remove(&mut tree, "expect", None).unwrap();
        assert_eq!(tree.source(), "const a = 1; \n");
    }

    #[test]
    fn test_remove_destructured_member() {
        let mut tree = tree("const { expect, assert } = require('chai');\n");
        let alias = remove(&mut tree, "chai", Some("expect")).unwrap();

        assert_eq!(alias.as_deref(), Some("expect"));
        assert_eq!(tree.source(), "const { assert } = require('chai');\n");

        let mut tree = self::tree("const { assert, expect: check } = require('chai');\n");
        remove(&mut tree, "chai", Some("expect")).unwrap();
        assert_eq!(tree.source(), "const { assert } = require('chai');\n");
    }

    #[test]
    fn test_remove_sole_member_prunes_declaration() {
        let mut tree = tree("const { expect } = require('chai');\nexpect(1);\n");
        remove(&mut tree, "chai", Some("expect")).unwrap();
        assert_eq!(tree.source(), "expect(1);\n");

        let mut tree = self::tree("const check = require('chai').expect;\n");
        let alias = remove(&mut tree, "chai", Some("expect")).unwrap();
        assert_eq!(alias.as_deref(), Some("check"));
        assert_eq!(tree.source(), "");
    }

    #[test]
    fn test_remove_import_specifier() {
        let mut tree = tree("import { assert, expect as check } from 'chai';\n");
        remove(&mut tree, "chai", Some("expect")).unwrap();
        assert_eq!(tree.source(), "import { assert } from 'chai';\n");

        let mut tree = self::tree("import chai, { expect } from 'chai';\n");
        remove(&mut tree, "chai", Some("expect")).unwrap();
        assert_eq!(tree.source(), "import chai from 'chai';\n");

        let mut tree = self::tree("import { expect } from 'chai';\nexpect(1);\n");
        remove(&mut tree, "chai", Some("expect")).unwrap();
        assert_eq!(tree.source(), "expect(1);\n");
    }

    #[test]
    fn test_remove_without_binding_is_noop() {
        let source = "const sinon = require('sinon');\n";
        let mut tree = tree(source);
        assert_eq!(remove(&mut tree, "expect", None).unwrap(), None);
        assert_eq!(tree.source(), source);
    }
}
