// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Tree-sitter Parsing Integration
//!
//! This module provides low-level Tree-sitter integration for parsing host
//! source files.
//!
//! ## Overview
//!
//! The parsing module handles:
//! - Parser creation for every supported host language
//! - Full parsing of the in-memory document text
//! - Collection of syntax errors left in the tree by error recovery
//!
//! Tree-sitter recovers from syntax errors, so a source with mistakes still
//! yields a tree ([`ParseResult::Partial`]). Only a missing tree is a failure.
//!
//! ## Usage
//!
//! ```rust
//! use embedded_sql_extraction::parsing::{ParseResult, ParserManager};
//! use embedded_sql_ir::HostLanguage;
//!
//! let manager = ParserManager::new();
//! let result = manager.parse_text(HostLanguage::TypeScript, "const x = 1;");
//! assert!(result.is_success());
//! ```

use std::time::{Duration, Instant};
use tracing::debug;

use embedded_sql_grammar::language_for_host;
use embedded_sql_ir::HostLanguage;

/// Parser manager for the supported host languages
///
/// Stateless: creates a parser per call, so it can be shared freely.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParserManager;

impl ParserManager {
    /// Create a new parser manager
    pub fn new() -> Self {
        Self
    }

    /// Create a new parser for a host language
    fn create_parser(&self, host: HostLanguage) -> Result<tree_sitter::Parser, ParseError> {
        let mut parser = tree_sitter::Parser::new();

        parser
            .set_language(language_for_host(host))
            .map_err(|e| ParseError::Generic {
                message: format!("Failed to set language {}: {}", host, e),
            })?;

        Ok(parser)
    }

    /// Parse text with full parsing
    ///
    /// # Returns
    ///
    /// - `ParseResult::Success` - Clean parse with no errors
    /// - `ParseResult::Partial` - Parse with syntax errors (tree includes ERROR nodes)
    /// - `ParseResult::Failed` - No tree could be produced
    pub fn parse_text(&self, host: HostLanguage, text: &str) -> ParseResult {
        let start = Instant::now();

        debug!("Parsing {} bytes of {} source", text.len(), host);

        let mut parser = match self.create_parser(host) {
            Ok(p) => p,
            Err(e) => {
                return ParseResult::Failed { error: e };
            }
        };

        let tree = match parser.parse(text, None) {
            Some(tree) => tree,
            None => {
                return ParseResult::Failed {
                    error: ParseError::Generic {
                        message: "Parser returned None".to_string(),
                    },
                };
            }
        };

        let parse_time = start.elapsed();

        let errors = if tree.root_node().has_error() {
            self.collect_errors(&tree, text)
        } else {
            Vec::new()
        };

        if errors.is_empty() {
            ParseResult::Success { tree, parse_time }
        } else {
            ParseResult::Partial { tree, errors }
        }
    }

    /// Collect ERROR and MISSING nodes from the tree
    fn collect_errors(&self, tree: &tree_sitter::Tree, text: &str) -> Vec<ParseError> {
        let mut errors = Vec::new();
        let mut stack = vec![tree.root_node()];

        while let Some(node) = stack.pop() {
            if node.is_error() || node.is_missing() {
                let start = node.start_position();
                let snippet = text
                    .get(node.start_byte()..node.end_byte())
                    .unwrap_or("<invalid bytes>");
                let message = if node.is_missing() {
                    format!("Missing {}", node.kind())
                } else {
                    format!("Syntax error: {}", snippet)
                };

                errors.push(ParseError::InvalidInput {
                    line: start.row,
                    column: start.column,
                    message,
                    node_type: Some(node.kind().to_string()),
                });
                continue;
            }

            if node.has_error() {
                let mut cursor = node.walk();
                let children: Vec<_> = node.children(&mut cursor).collect();
                stack.extend(children.into_iter().rev());
            }
        }

        errors
    }
}

/// Result of a parsing operation
#[derive(Debug, Clone)]
pub enum ParseResult {
    /// Successful parse with no errors
    Success {
        /// Parsed syntax tree
        tree: tree_sitter::Tree,

        /// Time taken to parse
        parse_time: Duration,
    },

    /// Partial parse with syntax errors
    ///
    /// The tree is still valid and contains ERROR nodes marking the problematic areas.
    Partial {
        /// Parsed syntax tree (contains ERROR nodes)
        tree: tree_sitter::Tree,

        /// List of parse errors
        errors: Vec<ParseError>,
    },

    /// Failed parse (critical error)
    Failed {
        /// Parse error details
        error: ParseError,
    },
}

impl ParseResult {
    /// Check if parse was successful (no errors)
    pub fn is_success(&self) -> bool {
        matches!(self, ParseResult::Success { .. })
    }

    /// Check if parse was partial (has errors)
    pub fn is_partial(&self) -> bool {
        matches!(self, ParseResult::Partial { .. })
    }

    /// Check if parse failed
    pub fn is_failed(&self) -> bool {
        matches!(self, ParseResult::Failed { .. })
    }

    /// Get the tree if available
    pub fn tree(&self) -> Option<&tree_sitter::Tree> {
        match self {
            ParseResult::Success { tree, .. } | ParseResult::Partial { tree, .. } => Some(tree),
            ParseResult::Failed { .. } => None,
        }
    }

    /// Get parse errors if any
    pub fn errors(&self) -> Option<&[ParseError]> {
        match self {
            ParseResult::Partial { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// Take the tree, or the error when parsing failed
    pub fn into_tree(self) -> Result<tree_sitter::Tree, ParseError> {
        match self {
            ParseResult::Success { tree, .. } | ParseResult::Partial { tree, .. } => Ok(tree),
            ParseResult::Failed { error } => Err(error),
        }
    }
}

/// Parse error details
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Invalid input at specific location
    #[error("Invalid input at line {line}, column {column}: {message}")]
    InvalidInput {
        line: usize,
        column: usize,
        message: String,
        node_type: Option<String>,
    },

    /// Generic parse error
    #[error("Parse error: {message}")]
    Generic { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clean_typescript() {
        let manager = ParserManager::new();
        let result = manager.parse_text(
            HostLanguage::TypeScript,
            "const todo = await prisma.$queryRaw`SELECT 1`;",
        );

        assert!(result.is_success());
        assert!(result.tree().is_some());
        assert!(result.errors().is_none());
    }

    #[test]
    fn test_parse_clean_rust() {
        let manager = ParserManager::new();
        let result = manager.parse_text(
            HostLanguage::Rust,
            "fn main() { let q = sqlx::query!(\"SELECT 1\"); }",
        );

        assert!(result.is_success());
    }

    #[test]
    fn test_parse_with_errors_is_partial() {
        let manager = ParserManager::new();
        let result = manager.parse_text(HostLanguage::TypeScript, "const = sql`SELECT 1`;");

        assert!(result.is_partial());
        let errors = result.errors().unwrap();
        assert!(!errors.is_empty());
        assert!(matches!(errors[0], ParseError::InvalidInput { .. }));
        assert!(result.tree().is_some());
    }

    #[test]
    fn test_into_tree() {
        let manager = ParserManager::new();
        let tree = manager
            .parse_text(HostLanguage::Rust, "fn main() {}")
            .into_tree()
            .unwrap();
        assert_eq!(tree.root_node().kind(), "source_file");

        let failed = ParseResult::Failed {
            error: ParseError::Generic {
                message: "boom".to_string(),
            },
        };
        assert!(failed.is_failed());
        assert!(failed.into_tree().is_err());
    }
}
