// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Extraction errors

use embedded_sql_ir::HostLanguage;

use crate::coords::CoordinateError;
use crate::parsing::ParseError;

/// Errors surfaced by a fragment extraction pass
///
/// Any error means the pass produced no fragments at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    /// The host source could not be turned into a syntax tree
    #[error("Failed to parse {host} source: {source}")]
    ParseFailure {
        host: HostLanguage,
        #[source]
        source: ParseError,
    },

    /// A syntax tree offset could not be mapped to a position
    #[error(transparent)]
    Coordinate(#[from] CoordinateError),
}
