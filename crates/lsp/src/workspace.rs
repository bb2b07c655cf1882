// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Workspace roots and their registries
//!
//! A host file belongs to the longest workspace root that contains it. Each
//! root owns one [`VirtualDocumentRegistry`], created on first use.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use embedded_sql_ir::PositionEncoding;
use tracing::{debug, info};

use crate::registry::{SnapshotObserver, VirtualDocumentRegistry};

/// Registries keyed by workspace root
#[derive(Debug)]
pub struct WorkspaceRegistries {
    roots: Vec<PathBuf>,
    registries: HashMap<PathBuf, VirtualDocumentRegistry>,
    encoding: PositionEncoding,
    observer: Arc<dyn SnapshotObserver>,
}

impl WorkspaceRegistries {
    pub fn new(encoding: PositionEncoding, observer: Arc<dyn SnapshotObserver>) -> Self {
        Self {
            roots: Vec::new(),
            registries: HashMap::new(),
            encoding,
            observer,
        }
    }

    /// Add a workspace root; returns false if it was already known
    pub fn add_root(&mut self, root: impl Into<PathBuf>) -> bool {
        let root = root.into();
        if self.roots.contains(&root) {
            return false;
        }
        info!(root = %root.display(), "Workspace root added");
        self.roots.push(root);
        true
    }

    /// Remove a workspace root together with its registry
    pub fn remove_root(&mut self, root: &Path) -> Option<VirtualDocumentRegistry> {
        self.roots.retain(|known| known != root);
        self.registries.remove(root)
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Longest root containing `host_path`
    pub fn resolve_root(&self, host_path: &Path) -> Option<&Path> {
        self.roots
            .iter()
            .filter(|root| host_path.starts_with(root))
            .max_by_key(|root| root.components().count())
            .map(PathBuf::as_path)
    }

    /// Registry responsible for `host_path`, created on first use
    ///
    /// `None` when no root contains the file.
    pub fn registry_for(&mut self, host_path: &Path) -> Option<&mut VirtualDocumentRegistry> {
        let root = self.resolve_root(host_path)?.to_path_buf();
        let encoding = self.encoding;
        let observer = Arc::clone(&self.observer);

        Some(self.registries.entry(root.clone()).or_insert_with(|| {
            debug!(root = %root.display(), "Creating virtual document registry");
            VirtualDocumentRegistry::new(root, encoding, observer)
        }))
    }

    /// Existing registry for `host_path`, if any
    pub fn get(&self, host_path: &Path) -> Option<&VirtualDocumentRegistry> {
        let root = self.resolve_root(host_path)?;
        self.registries.get(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::NoopObserver;

    fn workspaces() -> WorkspaceRegistries {
        WorkspaceRegistries::new(PositionEncoding::Utf16, Arc::new(NoopObserver))
    }

    #[test]
    fn test_resolve_longest_root() {
        let mut workspaces = workspaces();
        workspaces.add_root("/work");
        workspaces.add_root("/work/packages/api");

        assert_eq!(
            workspaces.resolve_root(Path::new("/work/packages/api/src/db.ts")),
            Some(Path::new("/work/packages/api"))
        );
        assert_eq!(
            workspaces.resolve_root(Path::new("/work/README.md")),
            Some(Path::new("/work"))
        );
        assert_eq!(workspaces.resolve_root(Path::new("/elsewhere/a.ts")), None);
    }

    #[test]
    fn test_root_matches_whole_components() {
        let mut workspaces = workspaces();
        workspaces.add_root("/work/app");

        assert_eq!(workspaces.resolve_root(Path::new("/work/application/a.ts")), None);
    }

    #[test]
    fn test_registry_created_once_per_root() {
        let mut workspaces = workspaces();
        assert!(workspaces.add_root("/work"));
        assert!(!workspaces.add_root("/work"));

        assert!(workspaces.get(Path::new("/work/a.ts")).is_none());

        let registry = workspaces.registry_for(Path::new("/work/a.ts")).unwrap();
        registry.write(Path::new("/work/a.ts@0.sql"), "SELECT 1");

        let registry = workspaces.registry_for(Path::new("/work/b.ts")).unwrap();
        assert_eq!(registry.project_root(), Path::new("/work"));
        assert!(registry.exists(Path::new("/work/a.ts@0.sql")));

        assert!(workspaces.registry_for(Path::new("/tmp/a.ts")).is_none());
    }

    #[test]
    fn test_remove_root_drops_registry() {
        let mut workspaces = workspaces();
        workspaces.add_root("/work");
        workspaces.registry_for(Path::new("/work/a.ts"));

        assert!(workspaces.remove_root(Path::new("/work")).is_some());
        assert!(workspaces.roots().is_empty());
        assert!(workspaces.resolve_root(Path::new("/work/a.ts")).is_none());
    }
}
