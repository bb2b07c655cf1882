// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Virtual Document Registry
//!
//! Path-indexed store of versioned snapshots, one per embedded fragment,
//! for a single project root.
//!
//! ## Virtual documents
//!
//! Each fragment is exposed as `<host path>@<name>.sql`. Its content is the
//! fragment text preceded by a blank copy of the host source up to the
//! fragment start: every newline is kept and every other code unit becomes
//! a space. Line and character positions in the virtual document therefore
//! equal those in the host document.
//!
//! ```text
//! host:     const q = sql`SELECT 1`;
//! virtual:                SELECT 1
//! ```
//!
//! ## Versions
//!
//! Versions are per path and strictly increasing. Deleting a snapshot
//! bumps the version too, and the counter survives deletion, so a
//! recreated path never reuses a version.
//!
//! ## Observers
//!
//! A [`SnapshotObserver`] injected at construction sees every write and
//! delete. It stands in for the secondary language service.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use embedded_sql_extraction::LineIndex;
use embedded_sql_ir::{EmbeddedFragment, PositionEncoding};
use lsp_types::Url;
use tracing::{debug, warn};

/// Default extension of virtual documents
pub const VIRTUAL_EXTENSION: &str = "sql";

/// Change to a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotEvent {
    /// Snapshot created or replaced
    Written {
        path: PathBuf,
        version: u64,
        len: usize,
    },
    /// Snapshot removed; `version` is the tombstone version
    Deleted { path: PathBuf, version: u64 },
}

impl SnapshotEvent {
    pub fn path(&self) -> &Path {
        match self {
            SnapshotEvent::Written { path, .. } | SnapshotEvent::Deleted { path, .. } => path,
        }
    }

    pub fn version(&self) -> u64 {
        match self {
            SnapshotEvent::Written { version, .. } | SnapshotEvent::Deleted { version, .. } => {
                *version
            }
        }
    }
}

/// Receiver of snapshot changes
pub trait SnapshotObserver: Send + Sync + fmt::Debug {
    fn notify(&self, event: &SnapshotEvent);
}

/// Observer that logs every change at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SnapshotObserver for TracingObserver {
    fn notify(&self, event: &SnapshotEvent) {
        match event {
            SnapshotEvent::Written { path, version, len } => {
                debug!(path = %path.display(), version, len, "Virtual document written");
            }
            SnapshotEvent::Deleted { path, version } => {
                debug!(path = %path.display(), version, "Virtual document deleted");
            }
        }
    }
}

/// Observer that ignores every change
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SnapshotObserver for NoopObserver {
    fn notify(&self, _event: &SnapshotEvent) {}
}

/// Versioned content of one virtual document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncrementalSnapshot {
    pub content: String,
    pub version: u64,
}

/// Name of a virtual document relative to its host file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VirtualName {
    /// Fragment index within the host file
    Index(usize),
    /// Explicit name
    Named(String),
}

impl VirtualName {
    /// `<host>@<name>.<extension>`
    ///
    /// An explicit name already ending in `.<extension>` is not suffixed again.
    pub fn virtual_path(&self, host_path: &Path, extension: &str) -> PathBuf {
        let name = match self {
            VirtualName::Index(index) => index.to_string(),
            VirtualName::Named(name) => name.clone(),
        };

        let suffix = format!(".{}", extension);
        let mut path = OsString::from(host_path.as_os_str());
        path.push("@");
        path.push(&name);
        if !name.ends_with(&suffix) {
            path.push(&suffix);
        }
        PathBuf::from(path)
    }
}

impl From<&EmbeddedFragment> for VirtualName {
    fn from(fragment: &EmbeddedFragment) -> Self {
        VirtualName::Index(fragment.index)
    }
}

/// Per-root store of virtual document snapshots
///
/// Not internally synchronized; callers serialize access per root.
#[derive(Debug)]
pub struct VirtualDocumentRegistry {
    project_root: PathBuf,
    extension: String,
    encoding: PositionEncoding,
    snapshots: HashMap<PathBuf, IncrementalSnapshot>,
    /// Last version per path, kept after deletion
    versions: HashMap<PathBuf, u64>,
    /// Virtual paths currently recorded for each host file
    host_files: HashMap<PathBuf, Vec<PathBuf>>,
    observer: Arc<dyn SnapshotObserver>,
}

impl VirtualDocumentRegistry {
    /// Create an empty registry for a project root
    pub fn new(
        project_root: impl Into<PathBuf>,
        encoding: PositionEncoding,
        observer: Arc<dyn SnapshotObserver>,
    ) -> Self {
        Self {
            project_root: normalize(&project_root.into()),
            extension: VIRTUAL_EXTENSION.to_string(),
            encoding,
            snapshots: HashMap::new(),
            versions: HashMap::new(),
            host_files: HashMap::new(),
            observer,
        }
    }

    /// Use a different extension for virtual documents
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn encoding(&self) -> PositionEncoding {
        self.encoding
    }

    /// Absolute, lexically normalized form of `path`
    ///
    /// Relative paths are resolved against the project root.
    pub fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            normalize(path)
        } else {
            normalize(&self.project_root.join(path))
        }
    }

    /// Virtual path of a fragment of `host_path`
    pub fn virtual_path(&self, host_path: &Path, name: &VirtualName) -> PathBuf {
        name.virtual_path(&self.normalize_path(host_path), &self.extension)
    }

    /// Virtual URI of a virtual path: `<scheme>:<path>`
    pub fn uri(&self, virtual_path: &Path, scheme: &str) -> Result<Url, RegistryError> {
        let path = self.normalize_path(virtual_path);
        let uri = format!("{}:{}", scheme, path.display());
        Url::parse(&uri).map_err(|e| RegistryError::InvalidUri {
            uri,
            message: e.to_string(),
        })
    }

    /// Synchronize the virtual documents of a host file with `fragments`
    ///
    /// Writes one snapshot per fragment (bumping its version even when the
    /// content is unchanged), then deletes the snapshots recorded for
    /// `host_path` that no fragment maps to any more. Returns the virtual
    /// paths in fragment order.
    pub fn reconcile(
        &mut self,
        host_path: &Path,
        host_text: &str,
        fragments: &[EmbeddedFragment],
    ) -> Vec<PathBuf> {
        let host_path = self.normalize_path(host_path);
        let index = LineIndex::new(host_text, self.encoding);

        let mut current = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            let path = self.virtual_path(&host_path, &VirtualName::from(fragment));
            let content = self.virtual_content(&index, host_text, fragment);
            self.write(&path, content);
            current.push(path);
        }

        let previous = self
            .host_files
            .insert(host_path.clone(), current.clone())
            .unwrap_or_default();
        let stale: Vec<PathBuf> = previous
            .into_iter()
            .filter(|path| !current.contains(path))
            .collect();
        for path in &stale {
            self.delete(path);
        }

        debug!(
            host = %host_path.display(),
            written = current.len(),
            deleted = stale.len(),
            "Reconciled virtual documents"
        );

        current
    }

    /// Blank prefix followed by the fragment content
    fn virtual_content(
        &self,
        index: &LineIndex,
        host_text: &str,
        fragment: &EmbeddedFragment,
    ) -> String {
        let start = fragment.code_range.start;
        let mut content = match index.position_to_offset(start) {
            Ok(offset) => blank_prefix(&host_text[..offset], self.encoding),
            Err(e) => {
                warn!(
                    fragment = fragment.index,
                    "Fragment start not found in host text ({}); aligning by position", e
                );
                let mut prefix = "\n".repeat(start.line as usize);
                prefix.push_str(&" ".repeat(start.character as usize));
                prefix
            }
        };
        content.push_str(&fragment.content);
        content
    }

    /// Replace a snapshot's content and bump its version
    ///
    /// Returns the new version.
    pub fn write(&mut self, path: &Path, content: impl Into<String>) -> u64 {
        let path = self.normalize_path(path);
        let content = content.into();
        let version = self.next_version(&path);
        let len = content.len();

        self.snapshots
            .insert(path.clone(), IncrementalSnapshot { content, version });
        self.observer
            .notify(&SnapshotEvent::Written { path, version, len });

        version
    }

    /// Remove a snapshot and record a tombstone version
    ///
    /// Returns the tombstone version, `None` when no snapshot existed.
    pub fn delete(&mut self, path: &Path) -> Option<u64> {
        let path = self.normalize_path(path);
        self.snapshots.remove(&path)?;

        let version = self.next_version(&path);
        self.observer
            .notify(&SnapshotEvent::Deleted { path, version });

        Some(version)
    }

    /// Delete every virtual document of a host file
    ///
    /// Returns the deleted paths.
    pub fn clear_host(&mut self, host_path: &Path) -> Vec<PathBuf> {
        let host_path = self.normalize_path(host_path);
        let paths = self.host_files.remove(&host_path).unwrap_or_default();
        for path in &paths {
            self.delete(path);
        }
        paths
    }

    /// Content of a snapshot
    pub fn read(&self, path: &Path) -> Option<&str> {
        self.snapshots
            .get(&self.normalize_path(path))
            .map(|snapshot| snapshot.content.as_str())
    }

    /// Snapshot of a path
    pub fn snapshot(&self, path: &Path) -> Option<&IncrementalSnapshot> {
        self.snapshots.get(&self.normalize_path(path))
    }

    /// Last version of a path, including tombstones
    pub fn version(&self, path: &Path) -> Option<u64> {
        self.versions.get(&self.normalize_path(path)).copied()
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.snapshots.contains_key(&self.normalize_path(path))
    }

    /// Virtual paths currently recorded for a host file
    pub fn virtual_paths(&self, host_path: &Path) -> &[PathBuf] {
        self.host_files
            .get(&self.normalize_path(host_path))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of live snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    fn next_version(&mut self, path: &Path) -> u64 {
        let version = self.versions.entry(path.to_path_buf()).or_insert(0);
        *version += 1;
        *version
    }
}

/// Replace every non-newline code unit of `text` with a space
pub fn blank_prefix(text: &str, encoding: PositionEncoding) -> String {
    let mut prefix = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '\n' {
            prefix.push('\n');
        } else {
            for _ in 0..encoding.len_of(ch) {
                prefix.push(' ');
            }
        }
    }
    prefix
}

/// Lexically resolve `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Virtual path that does not form a valid URI
    #[error("Invalid virtual URI '{uri}': {message}")]
    InvalidUri { uri: String, message: String },
}
