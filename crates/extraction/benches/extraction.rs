// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Fragment extraction performance benchmarks
//!
//! Measures a full extraction pass (parse + walk + coordinate mapping) across:
//! - Host fixtures (Prisma, TypeORM, sqlx)
//! - Source size (fixture repeated)

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use embedded_sql_extraction::FragmentExtractor;
use embedded_sql_ir::{
    ArgumentPosition, ExtractionRule, HostLanguage, PositionEncoding, RuleSet,
};
use embedded_sql_test_utils::HostFixtures;

fn fixtures() -> Vec<(&'static str, &'static str, RuleSet)> {
    vec![
        (
            "prisma",
            HostFixtures::prisma(),
            RuleSet::builtin(HostLanguage::TypeScript),
        ),
        (
            "typeorm",
            HostFixtures::typeorm(),
            RuleSet::with_custom(
                HostLanguage::TypeScript,
                vec![ExtractionRule::call_argument("query", ArgumentPosition::one(1))],
            )
            .expect("Invalid rules"),
        ),
        (
            "sqlx",
            HostFixtures::sqlx(),
            RuleSet::builtin(HostLanguage::Rust),
        ),
    ]
}

fn bench_extract_fixtures(c: &mut Criterion) {
    let extractor = FragmentExtractor::new();
    let mut group = c.benchmark_group("extraction/fixtures");

    for (name, source, rules) in fixtures() {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                let fragments = extractor
                    .extract(black_box(source), &rules, PositionEncoding::Utf16)
                    .expect("Extraction failed");
                black_box(fragments);
            });
        });
    }

    group.finish();
}

fn bench_extract_scaling(c: &mut Criterion) {
    let extractor = FragmentExtractor::new();
    let rules = RuleSet::builtin(HostLanguage::TypeScript);
    let mut group = c.benchmark_group("extraction/scaling");

    for repeat in [1, 10, 100] {
        let source = HostFixtures::prisma().repeat(repeat);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(repeat), &source, |b, source| {
            b.iter(|| {
                let fragments = extractor
                    .extract(black_box(source), &rules, PositionEncoding::Utf16)
                    .expect("Extraction failed");
                black_box(fragments);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_extract_fixtures, bench_extract_scaling);
criterion_main!(benches);
