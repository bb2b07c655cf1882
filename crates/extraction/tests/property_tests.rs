// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Property-based tests for fragment extraction
//!
//! Sources are assembled from random statements, some carrying SQL in
//! tagged templates or call arguments, some not.

use embedded_sql_extraction::{FragmentExtractor, position_to_offset};
use embedded_sql_ir::{ArgumentPosition, ExtractionRule, HostLanguage, PositionEncoding, RuleSet};
use proptest::prelude::*;

// ============================================================================
// Arbitrary generators
// ============================================================================

fn arb_sql() -> impl Strategy<Value = String> {
    // No delimiters, escapes or substitution markers
    "[A-Za-z0-9 ,*=;\n\t()é𝄞]{0,40}"
}

fn arb_statement() -> impl Strategy<Value = (String, bool)> {
    prop_oneof![
        arb_sql().prop_map(|sql| (format!("await db.sql`{}`;", sql), true)),
        arb_sql().prop_map(|sql| (format!("sql`{}`;", sql), true)),
        arb_sql().prop_map(|sql| (format!("query(conn, `{}`, []);", sql), true)),
        "[A-Za-z0-9 ]{0,20}".prop_map(|sql| (format!("query(conn, \"{}\");", sql), true)),
        arb_sql().prop_map(|sql| (format!("sql`{} ${{id}}`;", sql), false)),
        Just(("query(conn);".to_string(), false)),
        Just(("const x = other(\"SELECT 1\");".to_string(), false)),
    ]
}

fn arb_source() -> impl Strategy<Value = (String, usize)> {
    prop::collection::vec((arb_statement(), "[ \n]{1,3}"), 0..8).prop_map(|statements| {
        let mut source = String::new();
        let mut expected = 0;
        for ((statement, extracts), separator) in statements {
            source.push_str(&statement);
            source.push_str(&separator);
            if extracts {
                expected += 1;
            }
        }
        (source, expected)
    })
}

fn rules() -> RuleSet {
    RuleSet::new(
        HostLanguage::TypeScript,
        vec![
            ExtractionRule::tagged_template("sql"),
            ExtractionRule::call_argument("query", ArgumentPosition::one(2)),
        ],
    )
    .unwrap()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_extraction_is_idempotent((source, _) in arb_source()) {
        let extractor = FragmentExtractor::new();
        let rules = rules();

        let first = extractor.extract(&source, &rules, PositionEncoding::Utf16).unwrap();
        let second = extractor.extract(&source, &rules, PositionEncoding::Utf16).unwrap();

        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_every_literal_found_once((source, expected) in arb_source()) {
        let fragments = FragmentExtractor::new()
            .extract(&source, &rules(), PositionEncoding::Utf16)
            .unwrap();

        prop_assert_eq!(fragments.len(), expected);
        for (index, fragment) in fragments.iter().enumerate() {
            prop_assert_eq!(fragment.index, index);
        }
    }

    #[test]
    fn prop_content_is_range_slice_without_delimiters(
        (source, _) in arb_source(),
        encoding in prop_oneof![
            Just(PositionEncoding::Utf8),
            Just(PositionEncoding::Utf16),
            Just(PositionEncoding::Utf32),
        ],
    ) {
        let fragments = FragmentExtractor::new()
            .extract(&source, &rules(), encoding)
            .unwrap();

        let mut previous_start = None;
        for fragment in &fragments {
            let start = position_to_offset(&source, fragment.code_range.start, encoding).unwrap();
            let end = position_to_offset(&source, fragment.code_range.end, encoding).unwrap();

            prop_assert_eq!(&source[start..end], fragment.content.as_str());
            prop_assert!(!fragment.content.contains(['`', '"']));
            prop_assert!(previous_start.is_none_or(|previous| previous < start));
            previous_start = Some(start);
        }
    }
}
