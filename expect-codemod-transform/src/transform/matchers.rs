//! Assertion call rewriting: `expect(subject).matcher(args)`

use regex::Regex;

use super::{RewriteContext, JEST_EXPECT};
use crate::catalog::{Arity, MatcherCategory, TargetMatcher};
use crate::diagnostics::Diagnostics;
use crate::errors::Result;
use crate::tree::node_kinds::{
    ARRAY, CALL_EXPRESSION, IDENTIFIER, MEMBER_EXPRESSION, OBJECT, SUBSCRIPT_EXPRESSION,
    TEMPLATE_STRING, THIS, UNDEFINED,
};
use crate::tree::{call_arguments, is_field, is_literal, EditSet, JsNode, MatchRule, SourceTree};

const CHAINING_NOT_SUPPORTED: &str = "Chaining expect matchers is currently not supported";

/// Rewrite every matcher call made on the legacy binding
pub(crate) fn rewrite(
    tree: &mut SourceTree,
    context: &RewriteContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    let rule = MatchRule::matcher_accesses(tree.language(), context.binding)?;
    let edits = {
        let mut edits = EditSet::new();
        let accesses = tree.find_all(&rule);
        log::trace!("{} matcher accesses in {}", accesses.len(), tree.path().display());
        for access in accesses.iter().rev() {
            rewrite_assertion(tree, context, access, &mut edits, diagnostics)?;
        }
        edits
    };
    tree.apply(&edits);
    Ok(())
}

/// The pieces of one `entry(subject).matcher(args)` call
struct Assertion<'r> {
    /// `entry(subject).matcher`
    access: JsNode<'r>,
    /// `entry(subject).matcher(args)`
    call: JsNode<'r>,
    /// `entry`
    callee: JsNode<'r>,
    subject: Option<JsNode<'r>>,
    matcher: JsNode<'r>,
    args: Vec<JsNode<'r>>,
}

impl<'r> Assertion<'r> {
    fn from_access(access: &JsNode<'r>) -> Option<Self> {
        let call = access.parent().filter(|parent| {
            parent.kind() == CALL_EXPRESSION && is_field(parent, "function", access)
        })?;
        let entry_call = access.field("object")?;
        Some(Self {
            callee: entry_call.field("function")?,
            subject: call_arguments(&entry_call).into_iter().next(),
            matcher: access.field("property")?,
            args: call_arguments(&call),
            access: access.clone(),
            call,
        })
    }

    /// Whether the result of the matcher call is itself accessed, as in
    /// `expect(a).toBe(1).toBe(2)`
    fn is_chained(&self) -> bool {
        self.call.parent().is_some_and(|parent| {
            parent.kind() == MEMBER_EXPRESSION && is_field(&parent, "object", &self.call)
        })
    }
}

fn rewrite_assertion(
    tree: &SourceTree,
    context: &RewriteContext<'_>,
    access: &JsNode<'_>,
    edits: &mut EditSet,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    let Some(assertion) = Assertion::from_access(access) else {
        log::debug!("Skipping matcher access that is not called: {}", access.text());
        return Ok(());
    };
    if assertion.is_chained() {
        diagnostics.warn(tree, access, CHAINING_NOT_SUPPORTED);
        return Ok(());
    }

    let name = assertion.matcher.text().to_string();
    let negated = name.contains("Not") || name.contains("Exclude");
    let rule = context.catalog.resolve(&name);

    let target = match rule.category {
        MatcherCategory::Rename => rule.target.clone(),
        MatcherCategory::TypeCheck => {
            let compares_type_name = assertion.args.first().is_some_and(is_literal);
            match &assertion.subject {
                Some(subject) if compares_type_name => {
                    prefix_operand(edits, subject, "typeof ");
                    TargetMatcher::new("toBe", negated)
                }
                _ => rule.target.clone(),
            }
        }
        MatcherCategory::KeyContainment => {
            if let Some(subject) = &assertion.subject {
                edits.insert(subject.range().start, "Object.keys(");
                edits.insert(subject.range().end, ")");
            }
            TargetMatcher::new("toContain", negated)
        }
        MatcherCategory::KeysContainment => {
            return expand_keys(
                tree,
                context,
                &assertion,
                &name,
                negated,
                edits,
                diagnostics,
            );
        }
        MatcherCategory::PatternMatch => {
            if assertion.args.first().is_some_and(|arg| arg.kind() == OBJECT) {
                TargetMatcher::new("toMatchObject", negated)
            } else {
                rule.target.clone()
            }
        }
    };

    let max_args = context.catalog.max_args(&target)?;
    balance_arguments(tree, &assertion, &target, max_args, edits, diagnostics);

    if !context.standalone && assertion.callee.text() != JEST_EXPECT {
        edits.replace(assertion.callee.range(), JEST_EXPECT);
    }
    let path = target.path();
    if path != name {
        edits.replace(assertion.matcher.range(), path);
    }
    Ok(())
}

/// Drop a trailing literal (the legacy assertion message) when the call has
/// more arguments than the target matcher accepts, and flag what still
/// does not fit.
fn balance_arguments(
    tree: &SourceTree,
    assertion: &Assertion<'_>,
    target: &TargetMatcher,
    max_args: Arity,
    edits: &mut EditSet,
    diagnostics: &mut Diagnostics,
) {
    let mut count = assertion.args.len();
    if !max_args.is_exceeded_by(count) {
        return;
    }

    if let Some(last) = assertion.args.last().filter(|arg| is_literal(arg)) {
        let start = match assertion.args.len() {
            1 => last.range().start,
            n => assertion.args[n - 2].range().end,
        };
        edits.remove(start..last.range().end);
        count -= 1;
    }

    if max_args.is_exceeded_by(count) {
        diagnostics.warn(
            tree,
            &assertion.access,
            too_many_arguments(&target.name, max_args, count),
        );
    }
}

fn too_many_arguments(matcher: &str, max_args: Arity, count: usize) -> String {
    format!("Too many arguments given to \"{matcher}\". Expected max {max_args} but got {count}")
}

/// `expect(obj).toContainKeys(keys)` becomes an iteration over `keys`
/// asserting each key against `Object.keys(obj)`.
fn expand_keys(
    tree: &SourceTree,
    context: &RewriteContext<'_>,
    assertion: &Assertion<'_>,
    name: &str,
    negated: bool,
    edits: &mut EditSet,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    let Some((keys, rest)) = assertion.args.split_first() else {
        diagnostics.warn(
            tree,
            &assertion.access,
            format!("\"{name}\" expects a collection of keys as its first argument"),
        );
        return Ok(());
    };

    let target = TargetMatcher::new("toContain", negated);
    let max_args = context.catalog.max_args(&target)?;

    let mut rest: Vec<&JsNode<'_>> = rest.iter().collect();
    if max_args.is_exceeded_by(rest.len() + 1) && rest.last().is_some_and(|arg| is_literal(arg)) {
        rest.pop();
    }
    if max_args.is_exceeded_by(rest.len() + 1) {
        diagnostics.warn(
            tree,
            &assertion.access,
            too_many_arguments(&target.name, max_args, rest.len() + 1),
        );
    }

    let source = tree.source();
    let keys = edits.render(source, keys.range());
    let subject = assertion
        .subject
        .as_ref()
        .map(|subject| edits.render(source, subject.range()))
        .unwrap_or_default();
    let rest: Vec<String> = rest
        .iter()
        .map(|arg| edits.render(source, arg.range()))
        .collect();
    let callee = if context.standalone {
        assertion.callee.text().to_string()
    } else {
        JEST_EXPECT.to_string()
    };

    let mut pieces: Vec<&str> = vec![keys.as_str(), subject.as_str()];
    pieces.extend(rest.iter().map(String::as_str));
    let variable = iteration_variable(&pieces);

    let indent = tree.line_indent(assertion.call.range().start);
    let unit = tree.indent_unit();
    let extra: String = rest.iter().map(|arg| format!(", {arg}")).collect();
    let expansion = format!(
        "{keys}.forEach({variable} => {{\n\
         {indent}{unit}{callee}(Object.keys({subject})).{path}({variable}{extra});\n\
         {indent}}})",
        path = target.path(),
    );
    edits.replace(assertion.call.range(), expansion);
    Ok(())
}

/// `e`, or the first of `e1`, `e2`, ... not already used in `pieces`
fn iteration_variable(pieces: &[&str]) -> String {
    let is_free = |candidate: &str| {
        Regex::new(&format!(r"\b{}\b", regex::escape(candidate)))
            .map(|word| pieces.iter().all(|piece| !word.is_match(piece)))
            .unwrap_or(false)
    };
    std::iter::once("e".to_string())
        .chain((1..).map(|n| format!("e{n}")))
        .find(|candidate| is_free(candidate))
        .unwrap_or_else(|| "e".to_string())
}

/// Prefix `node` with a unary operator, parenthesizing it unless it is a
/// primary expression
fn prefix_operand(edits: &mut EditSet, node: &JsNode<'_>, operator: &str) {
    let primary = is_literal(node)
        || matches!(
            &*node.kind(),
            IDENTIFIER
                | MEMBER_EXPRESSION
                | SUBSCRIPT_EXPRESSION
                | CALL_EXPRESSION
                | THIS
                | TEMPLATE_STRING
                | ARRAY
                | OBJECT
                | UNDEFINED
        );
    let range = node.range();
    if primary {
        edits.insert(range.start, operator);
    } else {
        edits.insert(range.start, format!("{operator}("));
        edits.insert(range.end, ")");
    }
}
