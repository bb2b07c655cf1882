// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Coordinate Mapper
//!
//! Converts between linear byte offsets (what tree-sitter reports) and
//! `(line, character)` positions counted in a [`PositionEncoding`].
//!
//! Only `\n` separates lines. A `\r` is an ordinary character; the editor
//! layer is expected to hand over normalised text. The rope is built with
//! ropey's Unicode / CR line breaks disabled so that it agrees.
//!
//! ## Example
//!
//! ```rust
//! use embedded_sql_extraction::coords::LineIndex;
//! use embedded_sql_ir::{Position, PositionEncoding};
//!
//! let index = LineIndex::new("SELECT *\nFROM users", PositionEncoding::Utf16);
//! assert_eq!(index.offset_to_position(9).unwrap(), Position::new(1, 0));
//! assert_eq!(index.position_to_offset(Position::new(1, 4)).unwrap(), 13);
//! ```

use ropey::Rope;

use embedded_sql_ir::{Position, PositionEncoding};

/// Line index over a source text
#[derive(Debug, Clone)]
pub struct LineIndex {
    rope: Rope,
    encoding: PositionEncoding,
}

impl LineIndex {
    /// Build an index for `text`, counting characters in `encoding`
    pub fn new(text: &str, encoding: PositionEncoding) -> Self {
        Self {
            rope: Rope::from_str(text),
            encoding,
        }
    }

    /// Encoding `Position::character` is counted in
    pub fn encoding(&self) -> PositionEncoding {
        self.encoding
    }

    /// Number of lines (a trailing `\n` starts an empty last line)
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Length of the indexed text in bytes
    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Text of a line without its line ending
    pub fn line_text(&self, line: usize) -> Option<String> {
        if line >= self.line_count() {
            return None;
        }
        let text = self.rope.line(line).to_string();
        Some(text.strip_suffix('\n').unwrap_or(&text).to_string())
    }

    /// Convert a byte offset to a position
    pub fn offset_to_position(&self, offset: usize) -> Result<Position, CoordinateError> {
        let len = self.rope.len_bytes();
        if offset > len {
            return Err(CoordinateError::OffsetOutOfBounds { offset, len });
        }

        let char_idx = self
            .rope
            .try_byte_to_char(offset)
            .map_err(|_| CoordinateError::OffsetOutOfBounds { offset, len })?;
        if self.rope.char_to_byte(char_idx) != offset {
            return Err(CoordinateError::NotCharBoundary { offset });
        }

        let line = self.rope.char_to_line(char_idx);
        let line_start_char = self.rope.line_to_char(line);

        let character = match self.encoding {
            PositionEncoding::Utf8 => offset - self.rope.line_to_byte(line),
            PositionEncoding::Utf16 => {
                self.rope.char_to_utf16_cu(char_idx) - self.rope.char_to_utf16_cu(line_start_char)
            }
            PositionEncoding::Utf32 => char_idx - line_start_char,
        };

        Ok(Position::new(line as u32, character as u32))
    }

    /// Convert a position to a byte offset
    ///
    /// `character` may point at the end of the line content but not past it,
    /// and never into the middle of a multi-unit character.
    pub fn position_to_offset(&self, position: Position) -> Result<usize, CoordinateError> {
        let line = position.line as usize;
        let character = position.character as usize;
        let line_count = self.line_count();
        if line >= line_count {
            return Err(CoordinateError::LineOutOfBounds { line, line_count });
        }

        let line_start_char = self.rope.line_to_char(line);
        let line_slice = self.rope.line(line);
        let mut content_chars = line_slice.len_chars();
        if content_chars > 0 && line_slice.char(content_chars - 1) == '\n' {
            content_chars -= 1;
        }
        let line_end_char = line_start_char + content_chars;
        let out_of_range = || CoordinateError::CharacterOutOfRange { position };

        let char_idx = match self.encoding {
            PositionEncoding::Utf8 => {
                let line_start_byte = self.rope.char_to_byte(line_start_char);
                let target = line_start_byte + character;
                if target > self.rope.char_to_byte(line_end_char) {
                    return Err(out_of_range());
                }
                let char_idx = self.rope.byte_to_char(target);
                if self.rope.char_to_byte(char_idx) != target {
                    return Err(out_of_range());
                }
                char_idx
            }
            PositionEncoding::Utf16 => {
                let line_start_cu = self.rope.char_to_utf16_cu(line_start_char);
                let target = line_start_cu + character;
                if target > self.rope.char_to_utf16_cu(line_end_char) {
                    return Err(out_of_range());
                }
                let char_idx = self.rope.utf16_cu_to_char(target);
                if self.rope.char_to_utf16_cu(char_idx) != target {
                    return Err(out_of_range());
                }
                char_idx
            }
            PositionEncoding::Utf32 => {
                let target = line_start_char + character;
                if target > line_end_char {
                    return Err(out_of_range());
                }
                target
            }
        };

        Ok(self.rope.char_to_byte(char_idx))
    }
}

/// Convert a byte offset in `text` to a position
pub fn offset_to_position(
    text: &str,
    offset: usize,
    encoding: PositionEncoding,
) -> Result<Position, CoordinateError> {
    LineIndex::new(text, encoding).offset_to_position(offset)
}

/// Convert a position in `text` to a byte offset
pub fn position_to_offset(
    text: &str,
    position: Position,
    encoding: PositionEncoding,
) -> Result<usize, CoordinateError> {
    LineIndex::new(text, encoding).position_to_offset(position)
}

/// Coordinate conversion errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinateError {
    /// Offset past the end of the text
    #[error("Offset {offset} out of bounds (len={len})")]
    OffsetOutOfBounds { offset: usize, len: usize },

    /// Offset inside a multi-byte character
    #[error("Offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    /// Line past the last line
    #[error("Line {line} out of bounds (line_count={line_count})")]
    LineOutOfBounds { line: usize, line_count: usize },

    /// Character past the end of its line or inside a character
    #[error("Character out of range at {position}")]
    CharacterOutOfRange { position: Position },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_position_ascii() {
        let index = LineIndex::new("SELECT *\nFROM users", PositionEncoding::Utf16);

        assert_eq!(index.offset_to_position(0).unwrap(), Position::new(0, 0));
        assert_eq!(index.offset_to_position(7).unwrap(), Position::new(0, 7));
        assert_eq!(index.offset_to_position(8).unwrap(), Position::new(0, 8));
        assert_eq!(index.offset_to_position(9).unwrap(), Position::new(1, 0));
        assert_eq!(index.offset_to_position(19).unwrap(), Position::new(1, 10));
    }

    #[test]
    fn test_offset_out_of_bounds() {
        let index = LineIndex::new("abc", PositionEncoding::Utf16);
        assert_eq!(
            index.offset_to_position(4),
            Err(CoordinateError::OffsetOutOfBounds { offset: 4, len: 3 })
        );
    }

    #[test]
    fn test_carriage_return_is_ordinary_character() {
        let index = LineIndex::new("a\r\nb\rc", PositionEncoding::Utf16);

        assert_eq!(index.line_count(), 2);
        assert_eq!(index.offset_to_position(1).unwrap(), Position::new(0, 1));
        assert_eq!(index.offset_to_position(3).unwrap(), Position::new(1, 0));
        assert_eq!(index.offset_to_position(5).unwrap(), Position::new(1, 2));
    }

    #[test]
    fn test_multibyte_columns_per_encoding() {
        // "é" is 2 bytes / 1 UTF-16 unit, "𝄞" is 4 bytes / 2 UTF-16 units
        let text = "é𝄞x";
        let x_offset = text.find('x').unwrap();

        let utf8 = LineIndex::new(text, PositionEncoding::Utf8);
        let utf16 = LineIndex::new(text, PositionEncoding::Utf16);
        let utf32 = LineIndex::new(text, PositionEncoding::Utf32);

        assert_eq!(utf8.offset_to_position(x_offset).unwrap(), Position::new(0, 6));
        assert_eq!(utf16.offset_to_position(x_offset).unwrap(), Position::new(0, 3));
        assert_eq!(utf32.offset_to_position(x_offset).unwrap(), Position::new(0, 2));

        assert_eq!(utf8.position_to_offset(Position::new(0, 6)).unwrap(), x_offset);
        assert_eq!(utf16.position_to_offset(Position::new(0, 3)).unwrap(), x_offset);
        assert_eq!(utf32.position_to_offset(Position::new(0, 2)).unwrap(), x_offset);
    }

    #[test]
    fn test_offset_inside_character_is_rejected() {
        let index = LineIndex::new("é", PositionEncoding::Utf8);
        assert_eq!(
            index.offset_to_position(1),
            Err(CoordinateError::NotCharBoundary { offset: 1 })
        );
    }

    #[test]
    fn test_position_inside_surrogate_pair_is_rejected() {
        let index = LineIndex::new("𝄞", PositionEncoding::Utf16);
        assert!(matches!(
            index.position_to_offset(Position::new(0, 1)),
            Err(CoordinateError::CharacterOutOfRange { .. })
        ));
    }

    #[test]
    fn test_position_to_offset_bounds() {
        let index = LineIndex::new("SELECT *\nFROM users", PositionEncoding::Utf16);

        assert_eq!(index.position_to_offset(Position::new(0, 8)).unwrap(), 8);
        assert!(matches!(
            index.position_to_offset(Position::new(0, 9)),
            Err(CoordinateError::CharacterOutOfRange { .. })
        ));
        assert_eq!(
            index.position_to_offset(Position::new(2, 0)),
            Err(CoordinateError::LineOutOfBounds {
                line: 2,
                line_count: 2
            })
        );
    }

    #[test]
    fn test_trailing_newline_opens_empty_line() {
        let index = LineIndex::new("a\n", PositionEncoding::Utf16);

        assert_eq!(index.line_count(), 2);
        assert_eq!(index.offset_to_position(2).unwrap(), Position::new(1, 0));
        assert_eq!(index.position_to_offset(Position::new(1, 0)).unwrap(), 2);
    }

    #[test]
    fn test_line_text() {
        let index = LineIndex::new("  foo\n\tbar\n", PositionEncoding::Utf16);

        assert_eq!(index.line_text(0).as_deref(), Some("  foo"));
        assert_eq!(index.line_text(1).as_deref(), Some("\tbar"));
        assert_eq!(index.line_text(2).as_deref(), Some(""));
        assert_eq!(index.line_text(3), None);
    }

    #[test]
    fn test_free_functions_round_trip() {
        let text = "const x = 1;\nconst y = `é`;";
        for offset in text.char_indices().map(|(i, _)| i) {
            let position = offset_to_position(text, offset, PositionEncoding::Utf16).unwrap();
            assert_eq!(
                position_to_offset(text, position, PositionEncoding::Utf16).unwrap(),
                offset
            );
        }
    }
}
