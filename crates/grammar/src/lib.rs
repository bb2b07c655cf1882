// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Embedded SQL Grammar
//!
//! This crate binds each supported host language to its tree-sitter grammar.
//! The extractor never writes a parser of its own: it walks the trees these
//! grammars produce.
//!
//! ## Supported Host Languages
//!
//! - **typescript**: TypeScript and JavaScript
//! - **tsx**: TypeScript / JavaScript with JSX
//! - **rust**: Rust
//!
//! ## Usage
//!
//! ```rust
//! use embedded_sql_grammar::language_for_host;
//! use embedded_sql_ir::HostLanguage;
//!
//! let mut parser = tree_sitter::Parser::new();
//! parser.set_language(language_for_host(HostLanguage::Rust)).unwrap();
//! let tree = parser.parse("fn main() {}", None).unwrap();
//! assert!(!tree.root_node().has_error());
//! ```

use std::sync::OnceLock;

use embedded_sql_ir::HostLanguage;

/// Get the tree-sitter Language for a host language
pub fn language_for_host(host: HostLanguage) -> &'static tree_sitter::Language {
    static TYPESCRIPT_LANG: OnceLock<tree_sitter::Language> = OnceLock::new();
    static TSX_LANG: OnceLock<tree_sitter::Language> = OnceLock::new();
    static RUST_LANG: OnceLock<tree_sitter::Language> = OnceLock::new();

    match host {
        HostLanguage::TypeScript => TYPESCRIPT_LANG
            .get_or_init(|| tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        HostLanguage::Tsx => TSX_LANG.get_or_init(|| tree_sitter_typescript::LANGUAGE_TSX.into()),
        HostLanguage::Rust => RUST_LANG.get_or_init(|| tree_sitter_rust::LANGUAGE.into()),
    }
}
