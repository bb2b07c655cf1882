// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Source coordinates
//!
//! Zero-based `(line, character)` coordinates shared by the extractor, the
//! virtual document registry and the formatter.
//!
//! `character` is counted in the code units of a [`PositionEncoding`]. The
//! same encoding must be used end to end: a range computed in UTF-16 and read
//! back as UTF-8 is off as soon as a line contains multi-byte text.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Position in a document (line, character)
///
/// Mirrors `lsp_types::Position` without pulling the protocol types into the
/// data model crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Line position in a document (zero-based)
    pub line: u32,
    /// Character offset on a line in a document (zero-based)
    pub character: u32,
}

impl Position {
    /// Create a new position
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.line, self.character).cmp(&(other.line, other.character))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

/// Range in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Range {
    /// The range's start position
    pub start: Position,
    /// The range's end position
    pub end: Position,
}

impl Range {
    /// Create a new range
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Check whether `position` lies inside the range, both ends inclusive
    ///
    /// A cursor sitting right after the last character of a fragment still
    /// belongs to it, which is where completion is usually requested.
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }

    /// Whether the range spans more than one line
    pub fn is_multiline(&self) -> bool {
        self.start.line != self.end.line
    }
}

/// Code unit used to count `Position::character`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PositionEncoding {
    /// Bytes of the UTF-8 source (tree-sitter's native column unit)
    #[serde(rename = "utf-8")]
    Utf8,
    /// UTF-16 code units (the editor protocol default)
    #[default]
    #[serde(rename = "utf-16")]
    Utf16,
    /// Unicode scalar values
    #[serde(rename = "utf-32")]
    Utf32,
}

impl PositionEncoding {
    /// Parse an encoding name as negotiated by editor clients
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(PositionEncoding::Utf8),
            "utf-16" | "utf16" => Some(PositionEncoding::Utf16),
            "utf-32" | "utf32" => Some(PositionEncoding::Utf32),
            _ => None,
        }
    }

    /// Number of code units `ch` occupies in this encoding
    pub fn len_of(&self, ch: char) -> usize {
        match self {
            PositionEncoding::Utf8 => ch.len_utf8(),
            PositionEncoding::Utf16 => ch.len_utf16(),
            PositionEncoding::Utf32 => 1,
        }
    }
}
