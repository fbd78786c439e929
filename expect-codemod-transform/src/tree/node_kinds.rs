//! Tree-sitter node kind constants for the JavaScript and TypeScript grammars
//!
//! The values come from the tree-sitter grammars and cannot be changed; the
//! constants only keep string literals for node kinds out of the rewriters.

/// A call (e.g., `expect(x)`)
pub(crate) const CALL_EXPRESSION: &str = "call_expression";

/// A dotted property access (e.g., `spy.calls`)
pub(crate) const MEMBER_EXPRESSION: &str = "member_expression";

/// A computed access (e.g., `calls[0]`)
pub(crate) const SUBSCRIPT_EXPRESSION: &str = "subscript_expression";

/// A plain identifier in expression position
pub(crate) const IDENTIFIER: &str = "identifier";

/// The name after the dot of a member expression
pub(crate) const PROPERTY_IDENTIFIER: &str = "property_identifier";

/// A comment; appears as an extra anywhere in the tree
pub(crate) const COMMENT: &str = "comment";

/// `name = value` inside a `const`/`let`/`var` declaration
pub(crate) const VARIABLE_DECLARATOR: &str = "variable_declarator";

/// A `const` or `let` declaration statement
pub(crate) const LEXICAL_DECLARATION: &str = "lexical_declaration";

/// A `var` declaration statement
pub(crate) const VARIABLE_DECLARATION: &str = "variable_declaration";

/// `target = value`
pub(crate) const ASSIGNMENT_EXPRESSION: &str = "assignment_expression";

/// A statement consisting of a single expression
pub(crate) const EXPRESSION_STATEMENT: &str = "expression_statement";

/// Destructuring pattern `{ a, b: c }`
pub(crate) const OBJECT_PATTERN: &str = "object_pattern";

/// `{ a }` entry of an object pattern
pub(crate) const SHORTHAND_PROPERTY_IDENTIFIER_PATTERN: &str =
    "shorthand_property_identifier_pattern";

/// `{ a: b }` entry of an object pattern
pub(crate) const PAIR_PATTERN: &str = "pair_pattern";

/// The bindings part of an import statement
pub(crate) const IMPORT_CLAUSE: &str = "import_clause";

/// `* as name` in an import clause
pub(crate) const NAMESPACE_IMPORT: &str = "namespace_import";

/// `{ a, b as c }` in an import clause
pub(crate) const NAMED_IMPORTS: &str = "named_imports";

/// One entry of `named_imports`
pub(crate) const IMPORT_SPECIFIER: &str = "import_specifier";

/// Object literal
pub(crate) const OBJECT: &str = "object";

/// String literal, including its quotes
pub(crate) const STRING: &str = "string";

/// Numeric literal
pub(crate) const NUMBER: &str = "number";

/// `true`
pub(crate) const TRUE: &str = "true";

/// `false`
pub(crate) const FALSE: &str = "false";

/// `null`
pub(crate) const NULL: &str = "null";

/// Regular expression literal
pub(crate) const REGEX: &str = "regex";

/// `( expr )`
pub(crate) const PARENTHESIZED_EXPRESSION: &str = "parenthesized_expression";

/// `await expr`
pub(crate) const AWAIT_EXPRESSION: &str = "await_expression";

/// TypeScript `expr as T`
pub(crate) const AS_EXPRESSION: &str = "as_expression";

/// TypeScript `expr!`
pub(crate) const NON_NULL_EXPRESSION: &str = "non_null_expression";

/// TypeScript `expr satisfies T`
pub(crate) const SATISFIES_EXPRESSION: &str = "satisfies_expression";

/// `this`
pub(crate) const THIS: &str = "this";

/// Array literal
pub(crate) const ARRAY: &str = "array";

/// Template literal
pub(crate) const TEMPLATE_STRING: &str = "template_string";

/// `undefined`
pub(crate) const UNDEFINED: &str = "undefined";
