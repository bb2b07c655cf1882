// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Embedded SQL - Editor Integration
//!
//! This crate connects fragment extraction to editor features for SQL
//! embedded in TypeScript, TSX and Rust sources.
//!
//! ## Overview
//!
//! It provides:
//! - Engine configuration parsed from client settings
//! - Host document management
//! - Virtual SQL documents, one per fragment, line-aligned with the host
//! - Round-trip formatting of embedded SQL
//! - Completion delegation to a secondary SQL language service
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │     Editor / language client glue       │
//! └──────────────┬──────────────────────────┘
//!                │ open / change / save / close / completion
//!                ↓
//! ┌─────────────────────────────────────────┐
//! │              DocumentSync               │
//! └──────┬──────────────┬───────────────┬───┘
//!        ↓              ↓               ↓
//! ┌────────────┐ ┌──────────────┐ ┌────────────┐
//! │ Fragment   │ │  Workspace   │ │ Round-trip │
//! │ Extractor  │ │  Registries  │ │ Formatter  │
//! └────────────┘ └──────┬───────┘ └────────────┘
//!                       ↓
//!              SnapshotObserver
//!         (secondary language service)
//! ```
//!
//! ## Configuration
//!
//! ```json
//! {
//!   "embeddedSql": {
//!     "formatOnSave": true,
//!     "formatSql": { "indent": false, "tabSize": 2 },
//!     "customRawSqlQuery": {
//!       "language": "typescript",
//!       "configs": [{ "functionName": "query", "sqlArgNo": 1 }]
//!     }
//!   }
//! }
//! ```
//!
//! SQL formatter options are read from `.sql-formatter.json` in the
//! workspace root.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use embedded_sql_lsp::{Document, DocumentSync, EngineConfig, TracingObserver};
//!
//! let mut sync = DocumentSync::new(EngineConfig::default(), Arc::new(TracingObserver));
//! sync.add_workspace_root("/project");
//!
//! let doc = Document::new(
//!     "/project/src/db.ts",
//!     "const rows = prisma.$queryRaw`SELECT 1`;\n",
//!     1,
//!     "typescript",
//! );
//! let refresh = sync.refresh(&doc).unwrap();
//!
//! assert_eq!(refresh.fragments[0].content, "SELECT 1");
//! assert_eq!(
//!     refresh.virtual_paths.unwrap()[0].to_str(),
//!     Some("/project/src/db.ts@0.sql")
//! );
//! ```
//!
//! ## Error Handling
//!
//! Problems are contained at the smallest unit:
//! - Unparseable host source → error for that document, registry untouched
//! - No workspace root → extraction only, no virtual documents
//! - Fragment that cannot be formatted → reported and left as is

pub mod completion;
pub mod config;
pub mod document;
pub mod formatting;
pub mod registry;
pub mod sync;
pub mod workspace;

// Re-exports for convenience
pub use completion::{CompletionTarget, fragment_at};
pub use config::{
    ConfigError, CustomQueryConfig, CustomRawSqlQuery, EngineConfig, FormatSqlConfig,
    FormatterOptions, KeywordCase,
};
pub use document::{Document, DocumentError};
pub use formatting::{
    FormatError, FormatOutcome, FragmentSkip, RoundTripFormatter, SqlFormatAdapter, SqlFormatter,
    apply_edits, split_whitespace_shape,
};
pub use registry::{
    IncrementalSnapshot, NoopObserver, RegistryError, SnapshotEvent, SnapshotObserver,
    TracingObserver, VirtualDocumentRegistry, VirtualName,
};
pub use sync::{DocumentSync, Refresh, SyncError, VIRTUAL_SCHEME};
pub use workspace::WorkspaceRegistries;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Binary name
pub const BINARY_NAME: &str = "embedded-sql";
