// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Completion delegation
//!
//! Completion inside embedded SQL is answered by a secondary language
//! service against the fragment's virtual document. Because virtual
//! documents are line-aligned with their host, the cursor position is
//! forwarded unchanged.

use std::path::PathBuf;

use embedded_sql_ir::{EmbeddedFragment, Position};
use lsp_types::Url;

/// Fragment containing `position`
///
/// Both range ends are inclusive so a cursor right after the last character
/// still belongs to the fragment. Fragments are searched in order.
pub fn fragment_at(fragments: &[EmbeddedFragment], position: Position) -> Option<&EmbeddedFragment> {
    fragments
        .iter()
        .find(|fragment| fragment.code_range.contains(position))
}

/// Where a completion request should be forwarded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionTarget {
    /// Virtual document URI
    pub uri: Url,
    pub virtual_path: PathBuf,
    /// Full virtual document content, blank prefix included
    pub content: String,
    /// Cursor position, valid in both host and virtual document
    pub position: Position,
    pub fragment: EmbeddedFragment,
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_sql_test_utils::FragmentBuilder;

    #[test]
    fn test_fragment_at_inclusive_bounds() {
        let fragments = vec![
            FragmentBuilder::new("SELECT 1").at(2, 10).index(0).build(),
            FragmentBuilder::new("SELECT\n  2").at(4, 5).index(1).build(),
        ];

        assert_eq!(fragment_at(&fragments, Position::new(2, 10)).map(|f| f.index), Some(0));
        assert_eq!(fragment_at(&fragments, Position::new(2, 18)).map(|f| f.index), Some(0));
        assert_eq!(fragment_at(&fragments, Position::new(5, 0)).map(|f| f.index), Some(1));
        assert_eq!(fragment_at(&fragments, Position::new(2, 19)), None);
        assert_eq!(fragment_at(&fragments, Position::new(3, 0)), None);
    }

    #[test]
    fn test_fragment_at_empty_list() {
        assert_eq!(fragment_at(&[], Position::new(0, 0)), None);
    }
}
