// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! `embedded-sql` binary tests

use std::fs;
use std::process::Command;

use embedded_sql_test_utils::HostFixtures;

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_embedded-sql"))
}

#[test]
fn test_extract_prints_fragments_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("todo.ts");
    fs::write(&file, HostFixtures::prisma()).unwrap();

    let output = binary().arg("extract").arg(&file).output().unwrap();
    assert!(output.status.success());

    let fragments: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let fragments = fragments.as_array().unwrap();
    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments[0]["content"], "SELECT * FROM todos WHERE id = 1;");
    assert_eq!(fragments[0]["anchorLine"], 6);
    assert_eq!(fragments[0]["codeRange"]["start"]["character"], 38);
}

#[test]
fn test_virtual_prints_aligned_documents() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("todo.rs");
    fs::write(&file, HostFixtures::sqlx()).unwrap();

    let output = binary().arg("virtual").arg(&file).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("todo.rs@0.sql <=="));
    assert!(stdout.contains("todo.rs@1.sql <=="));
    assert!(stdout.contains("RETURNING id"));
}

#[test]
fn test_format_write_rewrites_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("todo.ts");
    fs::write(&file, "const rows = prisma.$queryRaw`select id from todos`;\n").unwrap();

    let status = binary()
        .args(["format", "--write"])
        .arg(&file)
        .status()
        .unwrap();
    assert!(status.success());

    let formatted = fs::read_to_string(&file).unwrap();
    assert!(formatted.starts_with("const rows = prisma.$queryRaw`select\n"));
    assert!(formatted.ends_with("todos`;\n"));
}

#[test]
fn test_unknown_file_fails() {
    let output = binary().args(["extract", "/nonexistent/file.ts"]).output().unwrap();
    assert!(!output.status.success());
}
