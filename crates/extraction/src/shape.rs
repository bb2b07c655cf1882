// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Call shapes
//!
//! The binding layer between host grammars and the extractor. Each host
//! binding inspects a syntax node once and reports the call shape it has, if
//! any, as a closed [`CallShape`] value. The extractor then matches rules
//! against shapes exhaustively and never looks at grammar node kinds itself.
//!
//! ## Shapes
//!
//! | Shape | TypeScript | Rust |
//! |-------|------------|------|
//! | `TaggedTemplate` | `` tag`…` ``, `` a.b.tag`…` `` | - |
//! | `CallArgument` | `f(…)`, `a.f(…)` | `f(…)`, `a::f(…)`, `x.f(…)` |
//! | `MacroArgument` | - | `f!(…)`, `a::f!(…)` |

use std::ops::Range;

use embedded_sql_ir::LiteralDelimiter;
use tree_sitter::Node;

/// Byte spans of a literal that can carry a fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralSpan {
    /// Whole literal including delimiters
    pub outer: Range<usize>,
    /// Text between the delimiters
    pub inner: Range<usize>,
    pub delimiter: LiteralDelimiter,
}

impl LiteralSpan {
    /// Span for a literal whose delimiters are `open` and `close` bytes long
    pub fn delimited(
        outer: Range<usize>,
        open: usize,
        close: usize,
        delimiter: LiteralDelimiter,
    ) -> Option<Self> {
        let inner_start = outer.start.checked_add(open)?;
        let inner_end = outer.end.checked_sub(close)?;
        if inner_start > inner_end {
            return None;
        }
        Some(Self {
            inner: inner_start..inner_end,
            outer,
            delimiter,
        })
    }
}

/// Call-like construct found at a syntax node
///
/// Literal slots are `None` when the literal cannot carry a fragment: an
/// argument that is not a literal, or a template with `${}` substitutions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallShape<'a> {
    /// `` tag`…` ``
    TaggedTemplate {
        /// Last segment of the tag expression
        tag: &'a str,
        /// Byte offset where the tag expression starts
        anchor: usize,
        template: Option<LiteralSpan>,
    },

    /// `callee(arg0, arg1, …)`
    CallArgument {
        /// Last segment of the callee expression
        callee: &'a str,
        anchor: usize,
        arguments: Vec<Option<LiteralSpan>>,
    },

    /// `name!(arg0, arg1, …)`
    MacroArgument {
        /// Macro name without `!` or path
        name: &'a str,
        anchor: usize,
        arguments: Vec<Option<LiteralSpan>>,
    },
}

impl CallShape<'_> {
    /// Byte offset of the tag / callee / macro path
    pub fn anchor(&self) -> usize {
        match self {
            CallShape::TaggedTemplate { anchor, .. }
            | CallShape::CallArgument { anchor, .. }
            | CallShape::MacroArgument { anchor, .. } => *anchor,
        }
    }
}

/// Grammar-specific classification of syntax nodes
pub trait HostBinding: Send + Sync {
    /// Classify `node`, returning `None` for nodes that are not call shapes
    fn classify<'a>(&self, node: Node<'a>, source: &'a str) -> Option<CallShape<'a>>;
}

/// Source text of a node
pub(crate) fn node_text<'a>(node: Node<'_>, source: &'a str) -> Option<&'a str> {
    source.get(node.byte_range())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimited_span() {
        let span = LiteralSpan::delimited(10..20, 1, 1, LiteralDelimiter::Backtick).unwrap();
        assert_eq!(span.inner, 11..19);
        assert_eq!(span.outer, 10..20);
    }

    #[test]
    fn test_delimited_span_empty_literal() {
        let span = LiteralSpan::delimited(4..6, 1, 1, LiteralDelimiter::DoubleQuote).unwrap();
        assert_eq!(span.inner, 5..5);
    }

    #[test]
    fn test_delimited_span_rejects_overlapping_delimiters() {
        assert!(LiteralSpan::delimited(0..1, 1, 1, LiteralDelimiter::DoubleQuote).is_none());
    }

    #[test]
    fn test_anchor() {
        let shape = CallShape::CallArgument {
            callee: "query",
            anchor: 7,
            arguments: vec![None],
        };
        assert_eq!(shape.anchor(), 7);
    }
}
