// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Builders for hand-made fragments

use embedded_sql_ir::{EmbeddedFragment, LiteralDelimiter, Position, Range};

/// Builder for [`EmbeddedFragment`] values that were not produced by extraction
///
/// # Example
///
/// ```rust
/// use embedded_sql_test_utils::FragmentBuilder;
///
/// let fragment = FragmentBuilder::new("SELECT 1").at(2, 10).index(1).build();
/// assert_eq!(fragment.code_range.end.character, 18);
/// ```
#[derive(Debug, Clone)]
pub struct FragmentBuilder {
    content: String,
    start: Position,
    anchor_line: Option<u32>,
    index: usize,
    delimiter: LiteralDelimiter,
}

impl FragmentBuilder {
    /// Fragment at line 0, column 1 with backtick delimiters
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            start: Position::new(0, 1),
            anchor_line: None,
            index: 0,
            delimiter: LiteralDelimiter::Backtick,
        }
    }

    /// Place the fragment start
    pub fn at(mut self, line: u32, character: u32) -> Self {
        self.start = Position::new(line, character);
        self
    }

    /// Anchor line (defaults to the start line)
    pub fn anchor_line(mut self, line: u32) -> Self {
        self.anchor_line = Some(line);
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn delimiter(mut self, delimiter: LiteralDelimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Build the fragment; the end position is derived from the content
    /// counting one unit per `char`
    pub fn build(self) -> EmbeddedFragment {
        let mut end = self.start;
        for ch in self.content.chars() {
            if ch == '\n' {
                end.line += 1;
                end.character = 0;
            } else {
                end.character += 1;
            }
        }

        EmbeddedFragment {
            code_range: Range::new(self.start, end),
            anchor_line: self.anchor_line.unwrap_or(self.start.line),
            content: self.content,
            index: self.index,
            delimiter: self.delimiter,
        }
    }
}
