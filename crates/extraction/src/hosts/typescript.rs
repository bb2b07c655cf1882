// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! TypeScript / JavaScript binding
//!
//! Both tagged templates and ordinary calls are `call_expression` nodes in
//! the TypeScript grammar; they differ in the kind of the `arguments` field
//! (`template_string` versus `arguments`).

use tree_sitter::Node;

use embedded_sql_ir::LiteralDelimiter;

use crate::shape::{CallShape, HostBinding, LiteralSpan, node_text};

/// Binding for the TypeScript and TSX grammars
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeScriptBinding;

impl HostBinding for TypeScriptBinding {
    fn classify<'a>(&self, node: Node<'a>, source: &'a str) -> Option<CallShape<'a>> {
        if node.kind() != "call_expression" {
            return None;
        }

        let function = node.child_by_field_name("function")?;
        let arguments = node.child_by_field_name("arguments")?;
        let name = callee_name(function, source)?;
        let anchor = function.start_byte();

        match arguments.kind() {
            "template_string" => Some(CallShape::TaggedTemplate {
                tag: name,
                anchor,
                template: literal_span(arguments, source),
            }),
            "arguments" => {
                let mut cursor = arguments.walk();
                let arguments = arguments
                    .named_children(&mut cursor)
                    .filter(|child| child.kind() != "comment")
                    .map(|child| literal_span(child, source))
                    .collect();

                Some(CallShape::CallArgument {
                    callee: name,
                    anchor,
                    arguments,
                })
            }
            _ => None,
        }
    }
}

/// `name` for `name`, `a.b.name`, `a?.name` and `this.#name`
///
/// A typed tag such as `` prisma.$queryRaw<User[]>`…` `` parses as an
/// instantiation wrapped in a recovered non-null expression, with a leading
/// `await` pulled inside it; those wrappers are looked through.
fn callee_name<'a>(function: Node<'_>, source: &'a str) -> Option<&'a str> {
    match function.kind() {
        "identifier" => node_text(function, source),
        "member_expression" => node_text(function.child_by_field_name("property")?, source),
        "non_null_expression" | "instantiation_expression" | "await_expression" => {
            callee_name(function.named_child(0)?, source)
        }
        _ => None,
    }
}

/// Span of a string literal or a template without substitutions
fn literal_span(node: Node<'_>, source: &str) -> Option<LiteralSpan> {
    match node.kind() {
        "string" => {
            let delimiter = match node_text(node, source)?.as_bytes().first()? {
                b'"' => LiteralDelimiter::DoubleQuote,
                b'\'' => LiteralDelimiter::SingleQuote,
                _ => return None,
            };
            LiteralSpan::delimited(node.byte_range(), 1, 1, delimiter)
        }
        "template_string" => {
            let mut cursor = node.walk();
            let interpolated = node
                .named_children(&mut cursor)
                .any(|child| child.kind() == "template_substitution");
            if interpolated {
                return None;
            }
            LiteralSpan::delimited(node.byte_range(), 1, 1, LiteralDelimiter::Backtick)
        }
        _ => None,
    }
}
