// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Embedded SQL - Data Model
//!
//! This crate provides the types shared by every layer of the embedded SQL
//! engine:
//! - Source coordinates and the code unit they are counted in
//! - Host languages that may carry SQL fragments
//! - Embedded fragments produced by extraction
//! - Extraction rules and their validation

pub mod fragment;
pub mod host;
pub mod position;
pub mod rule;

// Re-export commonly used types
pub use fragment::{EmbeddedFragment, LiteralDelimiter};
pub use host::HostLanguage;
pub use position::{Position, PositionEncoding, Range};
pub use rule::{ArgumentPosition, ExtractionRule, IndexBase, LiteralKind, RuleError, RuleSet};
