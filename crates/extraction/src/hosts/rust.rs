// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Rust binding
//!
//! Macro arguments are not parsed as expressions by the Rust grammar: a
//! macro body is a flat `token_tree`. Arguments are recovered by splitting
//! the token tree on top-level commas; an argument carries a fragment only
//! when it consists of a single string literal token.

use tree_sitter::Node;

use embedded_sql_ir::LiteralDelimiter;

use crate::shape::{CallShape, HostBinding, LiteralSpan, node_text};

/// Binding for the Rust grammar
#[derive(Debug, Default, Clone, Copy)]
pub struct RustBinding;

impl HostBinding for RustBinding {
    fn classify<'a>(&self, node: Node<'a>, source: &'a str) -> Option<CallShape<'a>> {
        match node.kind() {
            "macro_invocation" => {
                let path = node.child_by_field_name("macro")?;
                let name = path_name(path, source)?;
                let mut cursor = node.walk();
                let token_tree = node
                    .children(&mut cursor)
                    .find(|child| child.kind() == "token_tree")?;

                Some(CallShape::MacroArgument {
                    name,
                    anchor: path.start_byte(),
                    arguments: macro_arguments(token_tree, source),
                })
            }
            "call_expression" => {
                let function = node.child_by_field_name("function")?;
                let arguments = node.child_by_field_name("arguments")?;
                let callee = callee_name(function, source)?;

                let mut cursor = arguments.walk();
                let arguments = arguments
                    .named_children(&mut cursor)
                    .filter(|child| !is_comment(*child))
                    .map(|child| literal_span(child, source))
                    .collect();

                Some(CallShape::CallArgument {
                    callee,
                    anchor: function.start_byte(),
                    arguments,
                })
            }
            _ => None,
        }
    }
}

fn is_comment(node: Node<'_>) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment")
}

/// Last segment of `name` or `a::b::name`
fn path_name<'a>(path: Node<'_>, source: &'a str) -> Option<&'a str> {
    match path.kind() {
        "identifier" => node_text(path, source),
        "scoped_identifier" => node_text(path.child_by_field_name("name")?, source),
        _ => None,
    }
}

/// Callee of `f(…)`, `a::f(…)`, `x.f(…)` and `f::<T>(…)`
fn callee_name<'a>(function: Node<'_>, source: &'a str) -> Option<&'a str> {
    match function.kind() {
        "identifier" | "scoped_identifier" => path_name(function, source),
        "field_expression" => node_text(function.child_by_field_name("field")?, source),
        "generic_function" => callee_name(function.child_by_field_name("function")?, source),
        _ => None,
    }
}

/// Split a macro token tree into comma-separated argument slots
fn macro_arguments(token_tree: Node<'_>, source: &str) -> Vec<Option<LiteralSpan>> {
    let mut cursor = token_tree.walk();
    let tokens: Vec<Node<'_>> = token_tree.children(&mut cursor).collect();

    // First and last children are the delimiters of the token tree
    let inner = match tokens.len() {
        0..=2 => return Vec::new(),
        len => &tokens[1..len - 1],
    };

    let mut groups: Vec<Vec<Node<'_>>> = vec![Vec::new()];
    for token in inner {
        if is_comment(*token) {
            continue;
        }
        let is_separator = !token.is_named()
            && node_text(*token, source).is_some_and(|text| text.contains(','));
        if is_separator {
            groups.push(Vec::new());
        } else if let Some(group) = groups.last_mut() {
            group.push(*token);
        }
    }

    // A trailing comma does not open another argument
    if groups.len() > 1 && groups.last().is_some_and(|group| group.is_empty()) {
        groups.pop();
    }

    groups
        .into_iter()
        .map(|group| match group.as_slice() {
            [single] => literal_span(*single, source),
            _ => None,
        })
        .collect()
}

/// Span of a plain, raw, byte or C string literal
fn literal_span(node: Node<'_>, source: &str) -> Option<LiteralSpan> {
    let raw = match node.kind() {
        "string_literal" => false,
        "raw_string_literal" => true,
        _ => return None,
    };

    let text = node_text(node, source)?;
    let open_quote = text.find('"')?;
    let close_quote = text.rfind('"')?;
    if close_quote <= open_quote {
        return None;
    }

    let delimiter = if raw {
        let hashes = u8::try_from(text.len() - close_quote - 1).ok()?;
        LiteralDelimiter::Raw { hashes }
    } else {
        LiteralDelimiter::DoubleQuote
    };

    LiteralSpan::delimited(
        node.byte_range(),
        open_quote + 1,
        text.len() - close_quote,
        delimiter,
    )
}
