// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Embedded fragments
//!
//! An [`EmbeddedFragment`] is one run of SQL text found inside a host source
//! file. Fragments are transient: they are recomputed on every extraction pass
//! and their `index` is only stable within that pass.

use serde::{Deserialize, Serialize};

use crate::position::Range;

/// Delimiter that surrounded the fragment in the host source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum LiteralDelimiter {
    /// `` `…` `` template literal
    Backtick,
    /// `"…"` string literal (including Rust byte / C strings)
    DoubleQuote,
    /// `'…'` string literal
    SingleQuote,
    /// Rust raw string `r#"…"#` with the given number of `#`
    Raw { hashes: u8 },
}

impl LiteralDelimiter {
    /// Whether the literal is a plain quoted string (`"…"` or `'…'`)
    pub fn is_quoted(&self) -> bool {
        matches!(self, LiteralDelimiter::DoubleQuote | LiteralDelimiter::SingleQuote)
    }

    /// Whether `\` starts an escape sequence inside the literal
    pub fn interprets_escapes(&self) -> bool {
        !matches!(self, LiteralDelimiter::Raw { .. })
    }
}

/// A SQL fragment embedded in host-language source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedFragment {
    /// Range of the text between the delimiters (delimiters excluded)
    pub code_range: Range,

    /// Verbatim source text inside `code_range`
    pub content: String,

    /// Line of the call or tag expression that produced the fragment
    pub anchor_line: u32,

    /// Position of the fragment in the source-ordered fragment list
    pub index: usize,

    /// Delimiter kind of the enclosing literal
    pub delimiter: LiteralDelimiter,
}

impl EmbeddedFragment {
    /// Whether the fragment holds only whitespace
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Whether the fragment is a one-line `"…"` / `'…'` literal
    pub fn is_single_line_quoted(&self) -> bool {
        self.delimiter.is_quoted() && !self.code_range.is_multiline()
    }

    /// Whether the content holds an escape sequence of the host literal
    pub fn has_escapes(&self) -> bool {
        self.delimiter.interprets_escapes() && self.content.contains('\\')
    }
}
