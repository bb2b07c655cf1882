// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Round-trip Formatting
//!
//! Formats the SQL of each fragment with an external formatter and maps the
//! result back onto the host document as text edits.
//!
//! ## Per-fragment pipeline
//!
//! 1. Skip blank fragments
//! 2. Split the content into leading whitespace, body and trailing whitespace
//! 3. Skip one-line `"…"` / `'…'` literals in hosts whose quoted strings
//!    cannot span lines
//! 4. Replace placeholders (`$1`, `${id}`, `?`) with an opaque token
//! 5. Format the body
//! 6. Put the placeholders back in order; skip the fragment if the token
//!    count changed
//! 7. Optionally re-indent relative to the anchor line
//! 8. Replace `code_range` with `prefix + formatted + suffix`
//!
//! A skipped fragment never aborts the pass; it is reported in
//! [`FormatOutcome::skipped`].

use lsp_types::TextEdit;
use regex::Regex;
use tracing::{debug, info};

use embedded_sql_extraction::{CoordinateError, LineIndex};
use embedded_sql_ir::{EmbeddedFragment, HostLanguage, PositionEncoding};
use sqlformat::{FormatOptions, Indent, QueryParams};

use crate::config::{FormatSqlConfig, FormatterOptions, KeywordCase};
use crate::document::{Document, DocumentError, from_lsp_position, to_lsp_range};

/// Token substituted for placeholders while formatting
///
/// Quoted so SQL formatters treat it as a single identifier.
pub const PLACEHOLDER_TOKEN: &str = "\"EMBEDDED_SQL_PLACEHOLDER\"";

/// External SQL formatter
pub trait SqlFormatter {
    fn format(&self, sql: &str, options: &FormatterOptions) -> Result<String, FormatError>;
}

/// [`SqlFormatter`] backed by the `sqlformat` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlFormatAdapter;

impl SqlFormatter for SqlFormatAdapter {
    fn format(&self, sql: &str, options: &FormatterOptions) -> Result<String, FormatError> {
        let indent = if options.use_tabs {
            Indent::Tabs
        } else {
            Indent::Spaces(options.tab_width)
        };
        let uppercase = match options.keyword_case {
            KeywordCase::Preserve => None,
            KeywordCase::Upper => Some(true),
            KeywordCase::Lower => Some(false),
        };

        let format_options = FormatOptions {
            indent,
            uppercase,
            lines_between_queries: options.lines_between_queries,
            ..FormatOptions::default()
        };

        Ok(sqlformat::format(sql, &QueryParams::None, &format_options))
    }
}

/// Leading whitespace, body and trailing whitespace of a fragment
///
/// `leading + body + trailing` is always the original content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WhitespaceShape<'a> {
    pub leading: &'a str,
    pub body: &'a str,
    pub trailing: &'a str,
}

impl<'a> WhitespaceShape<'a> {
    /// Leading whitespace without the indentation spaces that end it
    pub fn prefix(&self) -> &'a str {
        self.leading.trim_end_matches(' ')
    }

    /// Trailing whitespace, verbatim
    pub fn suffix(&self) -> &'a str {
        self.trailing
    }
}

/// Split `content` around its non-whitespace body
pub fn split_whitespace_shape(content: &str) -> WhitespaceShape<'_> {
    let body_start = content.len() - content.trim_start().len();
    let body_end = content.trim_end().len().max(body_start);

    WhitespaceShape {
        leading: &content[..body_start],
        body: &content[body_start..body_end],
        trailing: &content[body_end..],
    }
}

/// Placeholder pattern of a host language
///
/// - TypeScript / TSX: `${…}` and `$1`
/// - Rust: `$1` and `?`
pub fn placeholder_pattern(host: HostLanguage) -> Result<Regex, FormatError> {
    let pattern = match host {
        HostLanguage::TypeScript | HostLanguage::Tsx => r"\$(\{[^}]*\}|\d+)",
        HostLanguage::Rust => r"(\$\d+|\?)",
    };
    Ok(Regex::new(pattern)?)
}

/// SQL with placeholders replaced by [`PLACEHOLDER_TOKEN`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedSql {
    pub text: String,
    /// Original placeholders in source order
    pub placeholders: Vec<String>,
}

/// Replace every placeholder in `sql` with [`PLACEHOLDER_TOKEN`]
pub fn protect_placeholders(sql: &str, pattern: &Regex) -> ProtectedSql {
    let placeholders = pattern
        .find_iter(sql)
        .map(|m| m.as_str().to_string())
        .collect();
    let text = pattern.replace_all(sql, PLACEHOLDER_TOKEN).into_owned();

    ProtectedSql { text, placeholders }
}

/// Put `placeholders` back in place of the tokens, first to first
pub fn restore_placeholders(formatted: &str, placeholders: &[String]) -> Result<String, FragmentSkip> {
    let found = formatted.matches(PLACEHOLDER_TOKEN).count();
    if found != placeholders.len() {
        return Err(FragmentSkip::PlaceholderMismatch {
            expected: placeholders.len(),
            found,
        });
    }

    let mut restored = String::with_capacity(formatted.len());
    let mut pieces = formatted.split(PLACEHOLDER_TOKEN);
    if let Some(first) = pieces.next() {
        restored.push_str(first);
    }
    for (piece, placeholder) in pieces.zip(placeholders) {
        restored.push_str(placeholder);
        restored.push_str(piece);
    }

    Ok(restored)
}

/// Indent every non-empty line one level deeper than `anchor_line`
///
/// The extra level is a tab when the anchor line is tab-indented, otherwise
/// `tab_size` spaces.
pub fn reindent(formatted: &str, anchor_line: &str, tab_size: u32) -> String {
    let ambient: String = anchor_line
        .chars()
        .take_while(|ch| *ch == ' ' || *ch == '\t')
        .collect();
    let one_level = if ambient.starts_with('\t') {
        "\t".to_string()
    } else {
        " ".repeat(tab_size as usize)
    };
    let indent = format!("{}{}", ambient, one_level);

    formatted
        .split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reason a fragment was left unedited
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FragmentSkip {
    /// Empty or whitespace-only content
    #[error("fragment is blank")]
    Blank,

    /// One-line quoted literal that cannot hold formatted output
    #[error("fragment is a single-line quoted string")]
    SingleLineQuoted,

    /// Content holds `\` escapes the formatter could split from what they escape
    #[error("fragment contains escape sequences")]
    EscapedContent,

    /// Formatter changed the number of placeholder tokens
    #[error("placeholder count changed during formatting (expected {expected}, found {found})")]
    PlaceholderMismatch { expected: usize, found: usize },

    /// Formatter rejected the SQL
    #[error("formatter failed: {0}")]
    Formatter(String),
}

/// Result of formatting one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatOutcome {
    /// One edit per formatted fragment, in fragment order
    pub edits: Vec<TextEdit>,
    /// Fragment index and reason for every fragment left as is
    pub skipped: Vec<(usize, FragmentSkip)>,
}

/// Formats fragments and maps the results back onto the host document
#[derive(Debug, Clone, Default)]
pub struct RoundTripFormatter<F: SqlFormatter = SqlFormatAdapter> {
    formatter: F,
    indent: FormatSqlConfig,
}

impl<F: SqlFormatter> RoundTripFormatter<F> {
    pub fn new(formatter: F) -> Self {
        Self {
            formatter,
            indent: FormatSqlConfig::default(),
        }
    }

    /// Re-indentation settings
    pub fn with_indent(mut self, indent: FormatSqlConfig) -> Self {
        self.indent = indent;
        self
    }

    pub fn set_indent(&mut self, indent: FormatSqlConfig) {
        self.indent = indent;
    }

    /// Format every fragment of `document`
    ///
    /// Fails only when the document's host language is unsupported; every
    /// per-fragment problem ends up in [`FormatOutcome::skipped`].
    pub fn format(
        &self,
        document: &Document,
        fragments: &[EmbeddedFragment],
        options: &FormatterOptions,
    ) -> Result<FormatOutcome, FormatError> {
        let host = document.host()?;
        let pattern = placeholder_pattern(host)?;

        let mut outcome = FormatOutcome::default();
        for fragment in fragments {
            match self.format_fragment(host, document, fragment, &pattern, options) {
                Ok(edit) => outcome.edits.push(edit),
                Err(skip) => {
                    debug!(fragment = fragment.index, "Skipping fragment: {}", skip);
                    outcome.skipped.push((fragment.index, skip));
                }
            }
        }

        info!(
            path = %document.path().display(),
            edits = outcome.edits.len(),
            skipped = outcome.skipped.len(),
            "Formatted embedded SQL"
        );

        Ok(outcome)
    }

    fn format_fragment(
        &self,
        host: HostLanguage,
        document: &Document,
        fragment: &EmbeddedFragment,
        pattern: &Regex,
        options: &FormatterOptions,
    ) -> Result<TextEdit, FragmentSkip> {
        if fragment.is_blank() {
            return Err(FragmentSkip::Blank);
        }

        if fragment.is_single_line_quoted() && !host.quoted_literals_allow_newlines() {
            return Err(FragmentSkip::SingleLineQuoted);
        }

        if fragment.has_escapes() {
            return Err(FragmentSkip::EscapedContent);
        }

        let shape = split_whitespace_shape(&fragment.content);
        let protected = protect_placeholders(shape.body, pattern);

        let formatted = self
            .formatter
            .format(&protected.text, options)
            .map_err(|e| FragmentSkip::Formatter(e.to_string()))?;
        let mut formatted = restore_placeholders(&formatted, &protected.placeholders)?;

        if self.indent.indent {
            let anchor = document
                .get_line(fragment.anchor_line as usize)
                .unwrap_or_default();
            formatted = reindent(&formatted, &anchor, self.indent.tab_size);
        }

        Ok(TextEdit {
            range: to_lsp_range(fragment.code_range),
            new_text: format!("{}{}{}", shape.prefix(), formatted, shape.suffix()),
        })
    }
}

/// Apply `edits` to `text` as one atomic change
///
/// Edits must not overlap; they may come in any order. Either every edit
/// applies or `text` is returned unchanged as an error.
pub fn apply_edits(
    text: &str,
    edits: &[TextEdit],
    encoding: PositionEncoding,
) -> Result<String, FormatError> {
    let index = LineIndex::new(text, encoding);

    let mut spans = Vec::with_capacity(edits.len());
    for edit in edits {
        let start = index.position_to_offset(from_lsp_position(edit.range.start))?;
        let end = index.position_to_offset(from_lsp_position(edit.range.end))?;
        if start > end {
            return Err(FormatError::InvalidEdit { start, end });
        }
        spans.push((start, end, edit.new_text.as_str()));
    }

    spans.sort_by_key(|(start, end, _)| (*start, *end));
    for pair in spans.windows(2) {
        if pair[0].1 > pair[1].0 {
            return Err(FormatError::OverlappingEdits {
                first: pair[0].0..pair[0].1,
                second: pair[1].0..pair[1].1,
            });
        }
    }

    let mut result = text.to_string();
    for (start, end, new_text) in spans.into_iter().rev() {
        result.replace_range(start..end, new_text);
    }

    Ok(result)
}

/// Formatting errors
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// Host document problem
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Placeholder pattern failed to compile
    #[error("Invalid placeholder pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Formatter rejected its input
    #[error("SQL formatter failed: {message}")]
    Formatter { message: String },

    /// Edit with its end before its start
    #[error("Invalid edit range {start}..{end}")]
    InvalidEdit { start: usize, end: usize },

    /// Two edits touching the same text
    #[error("Overlapping edits at {first:?} and {second:?}")]
    OverlappingEdits {
        first: std::ops::Range<usize>,
        second: std::ops::Range<usize>,
    },

    /// Edit position outside the text
    #[error(transparent)]
    Coordinate(#[from] CoordinateError),
}
