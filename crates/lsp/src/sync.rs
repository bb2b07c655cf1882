// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Document Synchronization
//!
//! This module ties extraction, the virtual document registries and the
//! round-trip formatter to host document events.
//!
//! ## Overview
//!
//! The sync module handles:
//! - Rule resolution from the engine config per host language
//! - Refreshing fragments and virtual documents of a host document
//! - Completion delegation lookups
//! - Formatting on request and on save
//! - Cleanup when a host document closes
//!
//! ## Architecture
//!
//! ```text
//! DocumentSync
//!     ├─→ EngineConfig (rules, encoding, formatting switches)
//!     ├─→ FragmentExtractor
//!     ├─→ WorkspaceRegistries ─→ VirtualDocumentRegistry (one per root)
//!     └─→ RoundTripFormatter ─→ SqlFormatter
//!           ↓
//!        refresh()
//!        completion_target()
//!        format_document() / on_document_save()
//!        on_document_close()
//! ```
//!
//! Every call runs to completion before returning. An embedding server that
//! handles requests concurrently must serialize access to one `DocumentSync`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use embedded_sql_extraction::{ExtractionError, FragmentExtractor};
use embedded_sql_ir::{EmbeddedFragment, HostLanguage, Position, RuleSet};

use crate::completion::{CompletionTarget, fragment_at};
use crate::config::{ConfigError, EngineConfig, FormatterOptions};
use crate::document::{Document, DocumentError};
use crate::formatting::{FormatError, FormatOutcome, RoundTripFormatter, SqlFormatAdapter, SqlFormatter};
use crate::registry::{RegistryError, SnapshotObserver};
use crate::workspace::WorkspaceRegistries;

/// URI scheme of virtual documents
pub const VIRTUAL_SCHEME: &str = "embedded-sql";

/// Result of refreshing a host document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refresh {
    /// Fragments in source order
    pub fragments: Vec<EmbeddedFragment>,
    /// Virtual paths in fragment order, `None` outside every workspace root
    pub virtual_paths: Option<Vec<PathBuf>>,
}

/// Document synchronization manager
#[derive(Debug)]
pub struct DocumentSync<F: SqlFormatter = SqlFormatAdapter> {
    config: EngineConfig,
    extractor: FragmentExtractor,
    workspaces: WorkspaceRegistries,
    observer: Arc<dyn SnapshotObserver>,
    formatter: RoundTripFormatter<F>,
    /// Formatter options per workspace root, read on first use
    formatter_options: HashMap<PathBuf, FormatterOptions>,
    scheme: String,
}

impl DocumentSync<SqlFormatAdapter> {
    /// Create a sync manager using the `sqlformat` formatter
    pub fn new(config: EngineConfig, observer: Arc<dyn SnapshotObserver>) -> Self {
        Self::with_formatter(config, observer, SqlFormatAdapter)
    }
}

impl<F: SqlFormatter> DocumentSync<F> {
    /// Create a sync manager with a custom SQL formatter
    pub fn with_formatter(
        config: EngineConfig,
        observer: Arc<dyn SnapshotObserver>,
        formatter: F,
    ) -> Self {
        Self {
            workspaces: WorkspaceRegistries::new(config.position_encoding, Arc::clone(&observer)),
            formatter: RoundTripFormatter::new(formatter).with_indent(config.format_sql),
            extractor: FragmentExtractor::new(),
            formatter_options: HashMap::new(),
            scheme: VIRTUAL_SCHEME.to_string(),
            observer,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the engine config
    ///
    /// Changing the position encoding drops every registry, since existing
    /// snapshots were aligned in the old encoding.
    pub fn update_config(&mut self, config: EngineConfig) {
        if config.position_encoding != self.config.position_encoding {
            info!(
                "Position encoding changed to {:?}, resetting virtual documents",
                config.position_encoding
            );
            let mut workspaces =
                WorkspaceRegistries::new(config.position_encoding, Arc::clone(&self.observer));
            for root in self.workspaces.roots() {
                workspaces.add_root(root.clone());
            }
            self.workspaces = workspaces;
        }

        self.formatter.set_indent(config.format_sql);
        self.config = config;
    }

    pub fn add_workspace_root(&mut self, root: impl Into<PathBuf>) {
        self.workspaces.add_root(root);
    }

    pub fn remove_workspace_root(&mut self, root: &Path) {
        self.workspaces.remove_root(root);
        self.formatter_options.remove(root);
    }

    pub fn workspaces(&self) -> &WorkspaceRegistries {
        &self.workspaces
    }

    /// Validated rules for a host language
    pub fn rule_set(&self, host: HostLanguage) -> Result<RuleSet, SyncError> {
        Ok(self.config.rule_set(host)?)
    }

    /// Re-extract fragments and reconcile the document's virtual documents
    ///
    /// On a parse failure the error is returned and the registry is left
    /// as it was.
    pub fn refresh(&mut self, document: &Document) -> Result<Refresh, SyncError> {
        let host = document.host()?;
        let rules = self.rule_set(host)?;
        let text = document.get_content();

        let fragments = self
            .extractor
            .extract(&text, &rules, self.config.position_encoding)
            .inspect_err(|e| warn!(path = %document.path().display(), "Extraction failed: {}", e))?;

        let virtual_paths = match self.workspaces.registry_for(document.path()) {
            Some(registry) => Some(registry.reconcile(document.path(), &text, &fragments)),
            None => {
                debug!(
                    path = %document.path().display(),
                    "No workspace root, skipping virtual documents"
                );
                None
            }
        };

        debug!(
            path = %document.path().display(),
            version = document.version(),
            fragments = fragments.len(),
            "Refreshed host document"
        );

        Ok(Refresh {
            fragments,
            virtual_paths,
        })
    }

    /// Virtual document a completion request at `position` goes to
    ///
    /// `None` when the cursor is outside every fragment or the document is
    /// outside every workspace root.
    pub fn completion_target(
        &mut self,
        document: &Document,
        position: Position,
    ) -> Result<Option<CompletionTarget>, SyncError> {
        let refresh = self.refresh(document)?;
        let Some(virtual_paths) = refresh.virtual_paths else {
            return Ok(None);
        };
        let Some(fragment) = fragment_at(&refresh.fragments, position) else {
            debug!("Cursor {} is outside every fragment", position);
            return Ok(None);
        };
        let Some(virtual_path) = virtual_paths.get(fragment.index) else {
            return Ok(None);
        };
        let Some(registry) = self.workspaces.get(document.path()) else {
            return Ok(None);
        };

        let content = registry.read(virtual_path).unwrap_or_default().to_string();
        let uri = registry.uri(virtual_path, &self.scheme)?;

        Ok(Some(CompletionTarget {
            uri,
            virtual_path: virtual_path.clone(),
            content,
            position,
            fragment: fragment.clone(),
        }))
    }

    /// Formatter options for the document's workspace root
    fn formatter_options_for(&mut self, path: &Path) -> FormatterOptions {
        let Some(root) = self.workspaces.resolve_root(path) else {
            return FormatterOptions::default();
        };

        self.formatter_options
            .entry(root.to_path_buf())
            .or_insert_with(|| FormatterOptions::load(root))
            .clone()
    }

    /// Forget cached formatter options so the next format re-reads them
    pub fn reload_formatter_options(&mut self) {
        self.formatter_options.clear();
    }

    /// Format every fragment of a document
    pub fn format_document(&mut self, document: &Document) -> Result<FormatOutcome, SyncError> {
        let refresh = self.refresh(document)?;
        let options = self.formatter_options_for(document.path());
        Ok(self.formatter.format(document, &refresh.fragments, &options)?)
    }

    /// Format on save, when enabled
    pub fn on_document_save(&mut self, document: &Document) -> Result<Option<FormatOutcome>, SyncError> {
        if !self.config.format_on_save {
            return Ok(None);
        }
        self.format_document(document).map(Some)
    }

    /// Delete every virtual document of a closed host document
    pub fn on_document_close(&mut self, path: &Path) -> Vec<PathBuf> {
        match self.workspaces.registry_for(path) {
            Some(registry) => registry.clear_host(path),
            None => Vec::new(),
        }
    }
}

/// Synchronization errors
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Format(#[from] FormatError),
}
