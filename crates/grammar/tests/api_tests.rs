// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Grammar API integration tests
//!
//! Checks that the node kinds the extractor relies on are produced by the
//! bundled grammars.

use embedded_sql_grammar::language_for_host;
use embedded_sql_ir::HostLanguage;
use tree_sitter::{Node, Parser};

fn parse(host: HostLanguage, source: &str) -> tree_sitter::Tree {
    let mut parser = Parser::new();
    parser
        .set_language(language_for_host(host))
        .expect("Failed to set language");
    parser.parse(source, None).expect("Parser returned None")
}

fn collect_kinds(node: Node, kinds: &mut Vec<String>) {
    kinds.push(node.kind().to_string());
    for child in node.children(&mut node.walk()) {
        collect_kinds(child, kinds);
    }
}

fn kinds(host: HostLanguage, source: &str) -> Vec<String> {
    let tree = parse(host, source);
    let mut kinds = Vec::new();
    collect_kinds(tree.root_node(), &mut kinds);
    kinds
}

#[test]
fn test_typescript_tagged_template_is_call_with_template_arguments() {
    let tree = parse(HostLanguage::TypeScript, "prisma.$queryRaw`SELECT 1`;");
    let root = tree.root_node();
    let statement = root.named_child(0).unwrap();
    let call = statement.named_child(0).unwrap();

    assert_eq!(call.kind(), "call_expression");
    assert_eq!(
        call.child_by_field_name("function").unwrap().kind(),
        "member_expression"
    );
    assert_eq!(
        call.child_by_field_name("arguments").unwrap().kind(),
        "template_string"
    );
}

#[test]
fn test_typescript_substitution_kind() {
    let kinds = kinds(HostLanguage::TypeScript, "sql`SELECT ${id}`;");
    assert!(kinds.iter().any(|k| k == "template_substitution"));
}

#[test]
fn test_typescript_string_argument() {
    let kinds = kinds(HostLanguage::TypeScript, "query(conn, \"SELECT 1\", []);");
    assert!(kinds.iter().any(|k| k == "arguments"));
    assert!(kinds.iter().any(|k| k == "string"));
}

#[test]
fn test_tsx_parses_jsx() {
    let tree = parse(
        HostLanguage::Tsx,
        "const el = <div>{sql`SELECT 1`}</div>;",
    );
    assert!(!tree.root_node().has_error());
}

#[test]
fn test_rust_macro_invocation_has_token_tree() {
    let kinds = kinds(
        HostLanguage::Rust,
        "fn f() { sqlx::query!(r#\"SELECT 1\"#, id); }",
    );
    assert!(kinds.iter().any(|k| k == "macro_invocation"));
    assert!(kinds.iter().any(|k| k == "token_tree"));
    assert!(kinds.iter().any(|k| k == "raw_string_literal"));
}

#[test]
fn test_rust_call_expression_arguments() {
    let kinds = kinds(HostLanguage::Rust, "fn f() { sql_query(\"SELECT 1\"); }");
    assert!(kinds.iter().any(|k| k == "call_expression"));
    assert!(kinds.iter().any(|k| k == "arguments"));
    assert!(kinds.iter().any(|k| k == "string_literal"));
}
