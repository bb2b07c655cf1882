// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Cursor markers in test input
//!
//! Test sources mark the cursor with `|`.

use embedded_sql_ir::Position;

/// Byte offset of the cursor marker
fn get_cursor_offset(input: &str) -> Option<usize> {
    input.find('|')
}

/// Remove the cursor marker from input
fn remove_cursor_marker(input: &str) -> String {
    input.replacen('|', "", 1)
}

/// Source without the marker and the marker's UTF-16 position
pub fn split_cursor(input: &str) -> Option<(String, Position)> {
    let offset = get_cursor_offset(input)?;
    let before = &input[..offset];
    let line = before.matches('\n').count() as u32;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let character = before[line_start..].encode_utf16().count() as u32;

    Some((remove_cursor_marker(input), Position::new(line, character)))
}
