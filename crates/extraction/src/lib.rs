// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Embedded SQL - Extraction
//!
//! Finds SQL fragments embedded in host-language source files.
//!
//! ## Architecture
//!
//! ```text
//! host text ──► ParserManager ──► tree ──► HostBinding ──► CallShape
//!                                                            │
//!                              RuleSet ──► FragmentExtractor ◄┘
//!                                                │
//!                                  LineIndex ──► EmbeddedFragment[]
//! ```
//!
//! - [`coords`]: byte offset ⇄ `(line, character)` conversion
//! - [`parsing`]: tree-sitter parser management
//! - [`shape`] / [`hosts`]: grammar-specific call shape classification
//! - [`extractor`]: rule matching and fragment construction
//!
//! The extractor keeps no state between calls; the same text and rules
//! always produce the same fragments.

pub mod coords;
pub mod error;
pub mod extractor;
pub mod hosts;
pub mod parsing;
pub mod shape;

pub use coords::{CoordinateError, LineIndex, offset_to_position, position_to_offset};
pub use error::ExtractionError;
pub use extractor::FragmentExtractor;
pub use parsing::{ParseError, ParseResult, ParserManager};
pub use shape::{CallShape, HostBinding, LiteralSpan};
