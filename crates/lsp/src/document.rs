// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Host Documents
//!
//! A [`Document`] is one open host source file (TypeScript, TSX or Rust)
//! that may carry embedded SQL.
//!
//! ## Overview
//!
//! The document keeps:
//! - Text content as a rope for efficient edits
//! - The absolute path it is registered under
//! - Its editor language id and version
//!
//! Incremental changes are applied in the negotiated position encoding.
//!
//! ## Example
//!
//! ```rust
//! use embedded_sql_lsp::Document;
//!
//! let doc = Document::new("/project/src/db.ts", "sql`SELECT 1`;\n", 1, "typescript");
//! assert_eq!(doc.get_line(0), Some("sql`SELECT 1`;".to_string()));
//! ```

use ropey::Rope;
use std::path::{Path, PathBuf};

use embedded_sql_extraction::{CoordinateError, LineIndex};
use embedded_sql_ir::{HostLanguage, Position, PositionEncoding, Range};
use lsp_types::{TextDocumentContentChangeEvent, Url};

/// An open host document
#[derive(Debug, Clone)]
pub struct Document {
    /// Absolute path of the host file
    path: PathBuf,

    /// Language identifier (e.g., "typescript", "rust")
    language_id: String,

    /// Document version, as sent by the editor
    version: i32,

    /// Document content as a rope for efficient editing
    content: Rope,
}

impl Document {
    /// Create a new document
    pub fn new(
        path: impl Into<PathBuf>,
        content: &str,
        version: i32,
        language_id: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            language_id: language_id.into(),
            version,
            content: Rope::from_str(content),
        }
    }

    /// Create a document from a `file://` URI
    pub fn from_uri(
        uri: &Url,
        content: &str,
        version: i32,
        language_id: impl Into<String>,
    ) -> Result<Self, DocumentError> {
        let path = uri
            .to_file_path()
            .map_err(|_| DocumentError::NotAFile(uri.clone()))?;
        Ok(Self::new(path, content, version, language_id))
    }

    /// Get the host file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the document language ID
    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    /// Host language of the document
    ///
    /// The language id wins; the file extension is the fallback.
    pub fn host(&self) -> Result<HostLanguage, DocumentError> {
        HostLanguage::from_language_id(&self.language_id)
            .or_else(|| {
                self.path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .and_then(HostLanguage::from_extension)
            })
            .ok_or_else(|| DocumentError::UnsupportedLanguage(self.language_id.clone()))
    }

    /// Get the document version
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Get the line count
    pub fn line_count(&self) -> usize {
        self.content.len_lines()
    }

    /// Get the full document content as a string
    pub fn get_content(&self) -> String {
        self.content.to_string()
    }

    /// Get a line of text without its line ending
    pub fn get_line(&self, line: usize) -> Option<String> {
        if line >= self.line_count() {
            return None;
        }

        let text = self.content.line(line).to_string();
        Some(text.strip_suffix('\n').unwrap_or(&text).to_string())
    }

    /// Replace the content wholesale
    pub fn set_content(&mut self, content: &str, version: i32) {
        self.content = Rope::from_str(content);
        self.version = version;
    }

    /// Apply content changes to the document
    ///
    /// Ranges are interpreted in `encoding`. Changes apply in order, each
    /// against the result of the previous one. On error the document is left
    /// unchanged.
    pub fn apply_changes(
        &mut self,
        changes: &[TextDocumentContentChangeEvent],
        new_version: i32,
        encoding: PositionEncoding,
    ) -> Result<(), DocumentError> {
        let mut content = self.content.clone();

        for change in changes {
            match (&change.range, &change.range_length) {
                (Some(range), _) => {
                    // Incremental change
                    let text = content.to_string();
                    let index = LineIndex::new(&text, encoding);
                    let start = index.position_to_offset(from_lsp_position(range.start))?;
                    let end = index.position_to_offset(from_lsp_position(range.end))?;

                    if start > end {
                        return Err(DocumentError::InvalidRange {
                            start: (range.start.line, range.start.character),
                            end: (range.end.line, range.end.character),
                        });
                    }

                    let start_char = content.byte_to_char(start);
                    let end_char = content.byte_to_char(end);
                    content.remove(start_char..end_char);
                    content.insert(start_char, &change.text);
                }
                (None, None) => {
                    // Full document change
                    content = Rope::from_str(&change.text);
                }
                (None, Some(_)) => {
                    // Range length without a range
                    return Err(DocumentError::InvalidChange);
                }
            }
        }

        self.content = content;
        self.version = new_version;

        Ok(())
    }
}

/// Convert a protocol position
pub(crate) fn from_lsp_position(position: lsp_types::Position) -> Position {
    Position::new(position.line, position.character)
}

/// Convert to a protocol range
pub(crate) fn to_lsp_range(range: Range) -> lsp_types::Range {
    lsp_types::Range {
        start: lsp_types::Position::new(range.start.line, range.start.character),
        end: lsp_types::Position::new(range.end.line, range.end.character),
    }
}

/// Document-related errors
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Neither language id nor extension names a supported host language
    #[error("Unsupported host language: {0}")]
    UnsupportedLanguage(String),

    /// URI that does not name a local file
    #[error("Not a file URI: {0}")]
    NotAFile(Url),

    /// Invalid range for text operation
    #[error("Invalid range: start={start:?}, end={end:?}")]
    InvalidRange { start: (u32, u32), end: (u32, u32) },

    /// Invalid content change
    #[error("Invalid content change")]
    InvalidChange,

    /// Range endpoint outside the document
    #[error(transparent)]
    Coordinate(#[from] CoordinateError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(
        start: (u32, u32),
        end: (u32, u32),
        text: &str,
    ) -> TextDocumentContentChangeEvent {
        TextDocumentContentChangeEvent {
            range: Some(lsp_types::Range {
                start: lsp_types::Position::new(start.0, start.1),
                end: lsp_types::Position::new(end.0, end.1),
            }),
            range_length: None,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_document_new() {
        let doc = Document::new("/project/db.ts", "sql`SELECT 1`", 1, "typescript");

        assert_eq!(doc.path(), Path::new("/project/db.ts"));
        assert_eq!(doc.language_id(), "typescript");
        assert_eq!(doc.version(), 1);
        assert_eq!(doc.get_content(), "sql`SELECT 1`");
        assert_eq!(doc.host().unwrap(), HostLanguage::TypeScript);
    }

    #[test]
    fn test_document_from_uri() {
        let uri = Url::parse("file:///project/src/main.rs").unwrap();
        let doc = Document::from_uri(&uri, "", 1, "rust").unwrap();
        assert_eq!(doc.path(), Path::new("/project/src/main.rs"));

        let uri = Url::parse("untitled:Untitled-1").unwrap();
        assert!(matches!(
            Document::from_uri(&uri, "", 1, "rust"),
            Err(DocumentError::NotAFile(_))
        ));
    }

    #[test]
    fn test_host_falls_back_to_extension() {
        let doc = Document::new("/project/view.tsx", "", 1, "plaintext");
        assert_eq!(doc.host().unwrap(), HostLanguage::Tsx);

        let doc = Document::new("/project/notes.md", "", 1, "markdown");
        assert!(matches!(
            doc.host(),
            Err(DocumentError::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn test_document_get_line() {
        let doc = Document::new("/p/a.ts", "const a = 1;\n  sql`x`;\n", 1, "typescript");

        assert_eq!(doc.get_line(0), Some("const a = 1;".to_string()));
        assert_eq!(doc.get_line(1), Some("  sql`x`;".to_string()));
        assert_eq!(doc.get_line(2), Some(String::new()));
        assert_eq!(doc.get_line(3), None);
    }

    #[test]
    fn test_apply_changes_full() {
        let mut doc = Document::new("/p/a.ts", "old", 1, "typescript");
        let changes = vec![TextDocumentContentChangeEvent {
            range: None,
            range_length: None,
            text: "new content".to_string(),
        }];

        doc.apply_changes(&changes, 2, PositionEncoding::Utf16).unwrap();

        assert_eq!(doc.get_content(), "new content");
        assert_eq!(doc.version(), 2);
    }

    #[test]
    fn test_apply_changes_incremental_in_order() {
        let mut doc = Document::new("/p/a.ts", "sql`SELECT 1`;\n", 1, "typescript");
        let changes = vec![
            change((0, 11), (0, 12), "id"),
            change((0, 4), (0, 4), "  "),
        ];

        doc.apply_changes(&changes, 2, PositionEncoding::Utf16).unwrap();

        assert_eq!(doc.get_content(), "sql`  SELECT id`;\n");
    }

    #[test]
    fn test_apply_changes_utf16_columns() {
        // "𝄞" occupies two UTF-16 code units
        let mut doc = Document::new("/p/a.ts", "'𝄞' + x", 1, "typescript");

        doc.apply_changes(&[change((0, 7), (0, 8), "y")], 2, PositionEncoding::Utf16)
            .unwrap();

        assert_eq!(doc.get_content(), "'𝄞' + y");
    }

    #[test]
    fn test_failed_change_leaves_document_untouched() {
        let mut doc = Document::new("/p/a.ts", "abc\n", 1, "typescript");
        let changes = vec![change((0, 0), (0, 1), "x"), change((5, 0), (5, 1), "y")];

        let result = doc.apply_changes(&changes, 2, PositionEncoding::Utf16);

        assert!(matches!(result, Err(DocumentError::Coordinate(_))));
        assert_eq!(doc.get_content(), "abc\n");
        assert_eq!(doc.version(), 1);
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let mut doc = Document::new("/p/a.ts", "abcdef", 1, "typescript");
        let result = doc.apply_changes(&[change((0, 4), (0, 2), "")], 2, PositionEncoding::Utf16);
        assert!(matches!(result, Err(DocumentError::InvalidRange { .. })));
    }

    #[test]
    fn test_range_length_without_range_is_rejected() {
        let mut doc = Document::new("/p/a.ts", "abc", 1, "typescript");
        let changes = vec![TextDocumentContentChangeEvent {
            range: None,
            range_length: Some(1),
            text: "x".to_string(),
        }];

        assert!(matches!(
            doc.apply_changes(&changes, 2, PositionEncoding::Utf16),
            Err(DocumentError::InvalidChange)
        ));
    }
}
