//! Spy passes
//!
//! Three passes, in order: flag spy helpers that cannot be migrated and
//! rename `createSpy`; rewrite accesses made directly on factory results
//! while collecting the variables spies are stored in; rewrite accesses made
//! on those variables.

use super::{chain, RewriteContext, SpyBindings};
use crate::diagnostics::Diagnostics;
use crate::errors::Result;
use crate::tree::node_kinds::{
    AS_EXPRESSION, ASSIGNMENT_EXPRESSION, AWAIT_EXPRESSION, CALL_EXPRESSION, IDENTIFIER,
    MEMBER_EXPRESSION, NON_NULL_EXPRESSION, PARENTHESIZED_EXPRESSION, SATISFIES_EXPRESSION,
    VARIABLE_DECLARATOR,
};
use crate::tree::{is_field, EditSet, JsNode, MatchRule, SourceTree};

/// Spy helpers of the legacy API
const SPY_FUNCTIONS: &[&str] = &["createSpy", "spyOn", "isSpy", "restoreSpies"];

/// Spy helpers with no Jest counterpart
const UNSUPPORTED_SPY_FUNCTIONS: &[&str] = &["isSpy", "restoreSpies"];

/// Members of the binding that create a spy
const SPY_FACTORIES: &[&str] = &["fn", "spyOn", "createSpy"];

/// First pass: flag bare and unsupported spy helpers, `createSpy` → `fn`
pub(crate) fn flag_unsupported(
    tree: &mut SourceTree,
    context: &RewriteContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    let bare_calls = MatchRule::bare_calls(tree.language(), SPY_FUNCTIONS)?;
    let members = MatchRule::member_accesses(tree.language(), &[context.binding], None)?;

    let edits = {
        let mut edits = EditSet::new();
        for call in tree.find_all(&bare_calls) {
            let Some(function) = call.field("function") else {
                continue;
            };
            let name = function.text();
            diagnostics.warn(
                tree,
                &call,
                format!(
                    "\"{name}\" is currently not supported \
                     (use \"{binding}.{name}\" instead for transformation to work)",
                    binding = context.binding
                ),
            );
        }

        for access in tree.find_all(&members) {
            let Some(property) = access.field("property") else {
                continue;
            };
            let name = property.text();
            if name == "createSpy" {
                edits.replace(property.range(), "fn");
            } else if UNSUPPORTED_SPY_FUNCTIONS.contains(&&*name) {
                diagnostics.warn(tree, &access, format!("\"{name}\" is currently not supported"));
            }
        }
        edits
    };
    tree.apply(&edits);
    Ok(())
}

/// Second pass: accesses on spy factory results, e.g.
/// `expect.spyOn(obj, 'm').andReturn(1)`
///
/// Returns the variables the created spies are bound to.
pub(crate) fn rewrite_factories(
    tree: &mut SourceTree,
    context: &RewriteContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<SpyBindings> {
    let rule = MatchRule::member_accesses(
        tree.language(),
        &[context.binding],
        Some(SPY_FACTORIES),
    )?;
    let mut spies = SpyBindings::default();

    let edits = {
        let mut edits = EditSet::new();
        let factories = tree.find_all(&rule);
        for factory in factories.iter().rev() {
            if let Some(variable) = bound_variable(factory) {
                log::trace!("Tracking spy variable '{variable}'");
                spies.insert(variable);
            }
            if let Some(access) = access_on_result(factory) {
                chain::rewrite(tree, &access, &mut edits, diagnostics);
            }
        }
        edits
    };
    tree.apply(&edits);
    Ok(spies)
}

/// Third pass: accesses on variables holding a spy
pub(crate) fn rewrite_spy_variables(
    tree: &mut SourceTree,
    spies: &SpyBindings,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    if spies.is_empty() {
        return Ok(());
    }
    let rule = MatchRule::member_accesses(tree.language(), &spies.names(), None)?;

    let edits = {
        let mut edits = EditSet::new();
        let accesses = tree.find_all(&rule);
        for access in accesses.iter().rev() {
            chain::rewrite(tree, access, &mut edits, diagnostics);
        }
        edits
    };
    tree.apply(&edits);
    Ok(())
}

/// `factory(...).property` for the factory member `factory`
fn access_on_result<'r>(factory: &JsNode<'r>) -> Option<JsNode<'r>> {
    let call = factory.parent().filter(|parent| {
        parent.kind() == CALL_EXPRESSION && is_field(parent, "function", factory)
    })?;
    call.parent()
        .filter(|parent| parent.kind() == MEMBER_EXPRESSION && is_field(parent, "object", &call))
}

/// Variable the spy created by `factory` ends up in
///
/// Follows the expression up through the factory call, configuration
/// calls chained on it (`.andReturn(1)`), parentheses, `await` and
/// TypeScript casts, to a `const x = ...` declarator or an `x = ...`
/// assignment.
fn bound_variable(factory: &JsNode<'_>) -> Option<String> {
    let mut current = factory.clone();
    loop {
        let parent = current.parent()?;
        match &*parent.kind() {
            CALL_EXPRESSION if is_field(&parent, "function", &current) => {}
            MEMBER_EXPRESSION if is_field(&parent, "object", &current) => {
                let called = parent.parent().is_some_and(|call| {
                    call.kind() == CALL_EXPRESSION && is_field(&call, "function", &parent)
                });
                if !called {
                    return None;
                }
            }
            PARENTHESIZED_EXPRESSION | AWAIT_EXPRESSION | AS_EXPRESSION | NON_NULL_EXPRESSION
            | SATISFIES_EXPRESSION => {}
            VARIABLE_DECLARATOR if is_field(&parent, "value", &current) => {
                return identifier_name(parent.field("name")?);
            }
            ASSIGNMENT_EXPRESSION if is_field(&parent, "right", &current) => {
                return identifier_name(parent.field("left")?);
            }
            _ => return None,
        }
        current = parent;
    }
}

fn identifier_name(node: JsNode<'_>) -> Option<String> {
    (node.kind() == IDENTIFIER).then(|| node.text().to_string())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{messages, run, run_standalone};
    use super::*;
    use crate::{Language, SourceFile};
    use std::path::PathBuf;

    const HEADER: &str = "const expect = require('expect');\n";

    fn factory_binding(source: &str, language: Language) -> Option<String> {
        let tree = SourceTree::parse(&SourceFile::with_language(
            PathBuf::from("spy.test.ts"),
            source.to_string(),
            language,
        ));
        let rule = MatchRule::member_accesses(language, &["expect"], Some(SPY_FACTORIES)).unwrap();
        let factories = tree.find_all(&rule);
        bound_variable(&factories[0])
    }

    #[test]
    fn test_bound_variable_shapes() {
        let js = Language::JavaScript;
        assert_eq!(factory_binding("const s = expect.fn();", js).as_deref(), Some("s"));
        assert_eq!(
            factory_binding("let s; s = expect.spyOn(o, 'm').andReturn(1);", js).as_deref(),
            Some("s")
        );
        assert_eq!(factory_binding("var s = (expect.fn());", js).as_deref(), Some("s"));
        assert_eq!(
            factory_binding("const s = expect.fn() as jest.Mock;", Language::TypeScript).as_deref(),
            Some("s")
        );
        assert_eq!(factory_binding("const c = expect.fn().calls;", js), None);
        assert_eq!(factory_binding("const r = wrap(expect.fn());", js), None);
        assert_eq!(factory_binding("this.s = expect.fn();", js), None);
    }

    #[test]
    fn test_bare_spy_functions_flagged() {
        let output = run(&format!("{HEADER}const s = createSpy();\nspyOn(a, 'b');\n"));

        assert_eq!(
            messages(&output),
            vec![
                "\"createSpy\" is currently not supported (use \"expect.createSpy\" instead for transformation to work)",
                "\"spyOn\" is currently not supported (use \"expect.spyOn\" instead for transformation to work)",
            ]
        );
        assert_eq!(output.source, "const s = createSpy();\nspyOn(a, 'b');\n");
    }

    #[test]
    fn test_unsupported_members_flagged() {
        let output =
            run(&format!("{HEADER}expect.restoreSpies();\nexpect(expect.isSpy(a)).toBe(true);\n"));
        assert_eq!(
            messages(&output),
            vec![
                "\"restoreSpies\" is currently not supported",
                "\"isSpy\" is currently not supported",
            ]
        );
    }

    #[test]
    fn test_create_spy_becomes_jest_fn() {
        let output = run(&format!("{HEADER}const s = expect.createSpy();\n"));
        assert_eq!(output.source, "const s = jest.fn();\n");

        let output = run_standalone(&format!("{HEADER}const s = expect.createSpy();\n"));
        assert_eq!(output.source, format!("{HEADER}const s = expect.fn();\n"));
    }

    #[test]
    fn test_factory_chain_rewritten() {
        let output = run(&format!("{HEADER}expect.spyOn(console, 'log').andReturn(null);\n"));
        assert_eq!(
            output.source,
            "jest.spyOn(console, 'log').mockImplementation(() => null);\n"
        );
    }

    #[test]
    fn test_spy_variable_tracked_across_passes() {
        let output = run(&format!(
            "{HEADER}const s = expect.spyOn(api, 'get');\ns.andReturn(1);\nexpect(s.calls.length).toBe(1);\n"
        ));
        assert_eq!(
            output.source,
            "const s = jest.spyOn(api, 'get');\ns.mockImplementation(() => 1);\nexpect(s.mock.calls.length).toBe(1);\n"
        );
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_assigned_spy_is_tracked() {
        let output = run(&format!(
            "{HEADER}let s;\nbeforeEach(() => {{\n  s = expect.createSpy().andReturn(2);\n}});\nit('x', () => s.reset());\n"
        ));
        assert_eq!(
            output.source,
            "let s;\nbeforeEach(() => {\n  s = jest.fn().mockImplementation(() => 2);\n});\nit('x', () => s.mockClear());\n"
        );
    }
}
