// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Fragment Extractor
//!
//! Locates embedded SQL fragments in host source text.
//!
//! ## Algorithm
//!
//! 1. Parse the source with the host grammar ([`ParserManager`])
//! 2. Walk the tree depth-first, pre-order, with an explicit stack
//! 3. Classify each node once through the host binding ([`CallShape`])
//! 4. Test every rule against the shape; a match selects one literal
//! 5. Keep the first rule's match when several select the same literal
//! 6. Order matches by source position and convert them to fragments
//!
//! A match never prunes the walk: calls nested inside a matched call are
//! extracted independently.
//!
//! ## Example
//!
//! ```rust
//! use embedded_sql_extraction::FragmentExtractor;
//! use embedded_sql_ir::{HostLanguage, PositionEncoding, RuleSet};
//!
//! let source = "const rows = await prisma.$queryRaw`SELECT 1`;";
//! let rules = RuleSet::builtin(HostLanguage::TypeScript);
//!
//! let fragments = FragmentExtractor::new()
//!     .extract(source, &rules, PositionEncoding::Utf16)
//!     .unwrap();
//! assert_eq!(fragments[0].content, "SELECT 1");
//! ```

use std::collections::HashSet;
use std::ops::Range;

use tracing::{debug, warn};
use tree_sitter::Tree;

use embedded_sql_ir::{
    EmbeddedFragment, ExtractionRule, LiteralKind, PositionEncoding, Range as CodeRange, RuleSet,
};

use crate::coords::LineIndex;
use crate::error::ExtractionError;
use crate::hosts::binding_for;
use crate::parsing::ParserManager;
use crate::shape::{CallShape, LiteralSpan};

/// Stateless fragment extractor
#[derive(Debug, Default, Clone)]
pub struct FragmentExtractor {
    parser: ParserManager,
}

/// A literal selected by a rule, before coordinate conversion
#[derive(Debug)]
struct Candidate {
    span: LiteralSpan,
    anchor: usize,
}

impl FragmentExtractor {
    pub fn new() -> Self {
        Self {
            parser: ParserManager::new(),
        }
    }

    /// Extract the ordered fragment list of `text`
    ///
    /// # Arguments
    ///
    /// * `text` - Full host source text
    /// * `rules` - Validated rules; their host language selects the grammar
    /// * `encoding` - Code unit `Position::character` is counted in
    ///
    /// # Returns
    ///
    /// Fragments in source order with `index` assigned from 0, or an error
    /// when the source produced no syntax tree. Sources with syntax errors are
    /// still scanned.
    pub fn extract(
        &self,
        text: &str,
        rules: &RuleSet,
        encoding: PositionEncoding,
    ) -> Result<Vec<EmbeddedFragment>, ExtractionError> {
        let host = rules.host();
        let result = self.parser.parse_text(host, text);

        if let Some(errors) = result.errors() {
            debug!(
                "{} source has {} syntax error(s), scanning recovered tree",
                host,
                errors.len()
            );
        }

        let tree = result.into_tree().map_err(|source| {
            warn!("Failed to parse {} source: {}", host, source);
            ExtractionError::ParseFailure { host, source }
        })?;

        self.extract_from_tree(&tree, text, rules, encoding)
    }

    /// Extract fragments from an already parsed tree of `text`
    pub fn extract_from_tree(
        &self,
        tree: &Tree,
        text: &str,
        rules: &RuleSet,
        encoding: PositionEncoding,
    ) -> Result<Vec<EmbeddedFragment>, ExtractionError> {
        let candidates = collect_candidates(tree, text, rules);
        let index = LineIndex::new(text, encoding);

        let mut fragments = Vec::with_capacity(candidates.len());
        for (position, candidate) in candidates.into_iter().enumerate() {
            let start = index.offset_to_position(candidate.span.inner.start)?;
            let end = index.offset_to_position(candidate.span.inner.end)?;
            let anchor = index.offset_to_position(candidate.anchor)?;
            let content = text
                .get(candidate.span.inner.clone())
                .unwrap_or_default()
                .to_string();

            fragments.push(EmbeddedFragment {
                code_range: CodeRange::new(start, end),
                content,
                anchor_line: anchor.line,
                index: position,
                delimiter: candidate.span.delimiter,
            });
        }

        debug!(
            "Extracted {} fragment(s) from {} source using {} rule(s)",
            fragments.len(),
            rules.host(),
            rules.rules().len()
        );

        Ok(fragments)
    }
}

/// Walk the tree and collect rule matches in source order
fn collect_candidates(tree: &Tree, text: &str, rules: &RuleSet) -> Vec<Candidate> {
    let binding = binding_for(rules.host());
    let mut seen: HashSet<Range<usize>> = HashSet::new();
    let mut candidates = Vec::new();
    let mut stack = vec![tree.root_node()];

    while let Some(node) = stack.pop() {
        if let Some(shape) = binding.classify(node, text) {
            for rule in rules.rules() {
                let Some(span) = select(&shape, rule) else {
                    continue;
                };
                if seen.insert(span.inner.clone()) {
                    candidates.push(Candidate {
                        span: span.clone(),
                        anchor: shape.anchor(),
                    });
                }
            }
        }

        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    candidates.sort_by_key(|candidate| candidate.span.inner.start);
    candidates
}

/// Literal selected by `rule` in `shape`, if the rule applies
fn select<'s>(shape: &'s CallShape<'_>, rule: &ExtractionRule) -> Option<&'s LiteralSpan> {
    match shape {
        CallShape::TaggedTemplate { tag, template, .. } => {
            let applies = rule.literal_kind == LiteralKind::TaggedTemplate
                && !rule.is_macro_like
                && *tag == rule.function_name;
            if applies { template.as_ref() } else { None }
        }
        CallShape::CallArgument {
            callee, arguments, ..
        } => {
            let applies = rule.literal_kind == LiteralKind::StringOrTemplateArgument
                && !rule.is_macro_like
                && *callee == rule.function_name;
            if applies {
                argument(arguments, rule)
            } else {
                None
            }
        }
        CallShape::MacroArgument {
            name, arguments, ..
        } => {
            let applies = rule.literal_kind == LiteralKind::StringOrTemplateArgument
                && rule.is_macro_like
                && *name == rule.function_name;
            if applies {
                argument(arguments, rule)
            } else {
                None
            }
        }
    }
}

/// Argument slot a rule points at; missing arguments are no match
fn argument<'s>(arguments: &'s [Option<LiteralSpan>], rule: &ExtractionRule) -> Option<&'s LiteralSpan> {
    arguments.get(rule.argument_position.zero_based()?)?.as_ref()
}
