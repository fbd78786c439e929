//! Spy configuration and introspection accesses
//!
//! Given a property access made on a spy (`spy.andReturn`, `spy.calls`, ...),
//! rewrite it to the Jest mock API. The access may be the callee of a
//! configuration call, or the head of an index path into recorded calls.

use crate::diagnostics::Diagnostics;
use crate::tree::node_kinds::{CALL_EXPRESSION, MEMBER_EXPRESSION, SUBSCRIPT_EXPRESSION};
use crate::tree::{call_arguments, is_field, EditSet, JsNode, SourceTree};

/// One-to-one property renames
const PROPERTY_RENAMES: &[(&str, &str)] = &[
    ("andCall", "mockImplementation"),
    ("calls", "mock.calls"),
    ("reset", "mockClear"),
    ("restore", "mockReset"),
];

const MOCK_IMPLEMENTATION: &str = "mockImplementation";

/// Rewrite the spy property access `access` (an `object.property` node)
pub(crate) fn rewrite(
    tree: &SourceTree,
    access: &JsNode<'_>,
    edits: &mut EditSet,
    diagnostics: &mut Diagnostics,
) {
    let Some(property) = access.field("property") else {
        return;
    };
    let name = property.text();

    match &*name {
        "andReturn" => {
            configure_implementation(tree, access, &property, edits, |value| match value {
                // An arrow body starting with `{` would parse as a block
                Some(text) if text.trim_start().starts_with('{') => format!("() => ({text})"),
                Some(text) => format!("() => {text}"),
                None => "() => undefined".to_string(),
            });
        }
        "andThrow" => {
            configure_implementation(tree, access, &property, edits, |value| {
                let error = value.unwrap_or_else(|| "undefined".to_string());
                format!("() => {{ throw {error}; }}")
            });
        }
        "andCallThrough" => {
            diagnostics.warn(tree, access, format!("\"{name}\" is currently not supported"));
        }
        "calls" => {
            if !remap_call_arguments(tree, access, edits) {
                edits.replace(property.range(), "mock.calls");
            }
        }
        other => {
            if let Some((_, renamed)) = PROPERTY_RENAMES.iter().find(|(from, _)| *from == other) {
                edits.replace(property.range(), *renamed);
            }
        }
    }
}

/// `spy.andReturn(v)` style calls: rename to `mockImplementation` and
/// replace the argument list with a single function built by `implementation`
/// from the rendered first argument.
fn configure_implementation(
    tree: &SourceTree,
    access: &JsNode<'_>,
    property: &JsNode<'_>,
    edits: &mut EditSet,
    implementation: impl FnOnce(Option<String>) -> String,
) {
    let Some(call) = access
        .parent()
        .filter(|parent| parent.kind() == CALL_EXPRESSION && is_field(parent, "function", access))
    else {
        log::debug!("Spy configuration {} is not called", access.text());
        return;
    };
    let Some(arguments) = call.field("arguments") else {
        return;
    };

    let value = call_arguments(&call)
        .into_iter()
        .next()
        .map(|first| edits.render(tree.source(), first.range()));
    edits.replace(arguments.range(), format!("({})", implementation(value)));
    edits.replace(property.range(), MOCK_IMPLEMENTATION);
}

/// `spy.calls[i].arguments[j]` → `spy.mock.calls[i][j]` and
/// `spy.calls[i].arguments` → `spy.mock.calls[i]`
///
/// Returns `false` when `access` is not the head of such a path.
fn remap_call_arguments(tree: &SourceTree, access: &JsNode<'_>, edits: &mut EditSet) -> bool {
    let Some(call_index) = access.parent().filter(|parent| {
        parent.kind() == SUBSCRIPT_EXPRESSION && is_field(parent, "object", access)
    }) else {
        return false;
    };
    let Some(arguments) = call_index.parent().filter(|parent| {
        parent.kind() == MEMBER_EXPRESSION
            && is_field(parent, "object", &call_index)
            && parent
                .field("property")
                .is_some_and(|property| property.text() == "arguments")
    }) else {
        return false;
    };
    let (Some(spy), Some(i)) = (access.field("object"), call_index.field("index")) else {
        return false;
    };

    let source = tree.source();
    let spy = edits.render(source, spy.range());
    let i = edits.render(source, i.range());

    let argument_index = arguments.parent().filter(|parent| {
        parent.kind() == SUBSCRIPT_EXPRESSION && is_field(parent, "object", &arguments)
    });
    match argument_index {
        Some(outer) => {
            let Some(j) = outer.field("index") else {
                return false;
            };
            let j = edits.render(source, j.range());
            edits.replace(outer.range(), format!("{spy}.mock.calls[{i}][{j}]"));
        }
        None => {
            edits.replace(arguments.range(), format!("{spy}.mock.calls[{i}]"));
        }
    }
    true
}
