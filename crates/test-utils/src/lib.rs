// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for embedded-sql
//!
//! This crate provides common testing components including:
//! - Host source fixtures (Prisma, Bun, TypeORM, sqlx, diesel)
//! - Fragment builders for registry and formatter tests
//! - Cursor marker helpers for completion tests

pub mod builders;
pub mod cursor;
pub mod fixtures;

// Re-exports for convenience
pub use builders::FragmentBuilder;
pub use cursor::split_cursor;
pub use fixtures::HostFixtures;
