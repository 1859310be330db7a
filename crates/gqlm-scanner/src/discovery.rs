//! Document discovery under configured search roots.
//!
//! Any `*.gql` / `*.graphql` file under a search root is a document, with
//! two exclusions: files inside a `schemas` directory and zero-byte files.
//! Discovery order is deterministic (sorted by path).

use gqlm_core::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Returns `true` if the path has a GraphQL document extension.
#[must_use]
pub fn is_document_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("gql" | "graphql")
    )
}

fn in_schemas_dir(path: &Path) -> bool {
    path.components()
        .any(|component| component.as_os_str() == "schemas")
}

/// Discovers document files under the given search roots.
///
/// Nonexistent roots are skipped with a warning, matching the behavior for
/// invalid configured document paths. The result is sorted and
/// deduplicated.
///
/// # Errors
///
/// Returns [`Error::Io`] when a directory walk fails for a reason other
/// than a missing root.
///
/// # Examples
///
/// ```no_run
/// use gqlm_scanner::discover_documents;
/// use std::path::PathBuf;
///
/// let documents = discover_documents(&[PathBuf::from("src")]).unwrap();
/// for path in &documents {
///     println!("{}", path.display());
/// }
/// ```
pub fn discover_documents(roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();

    for root in roots {
        if !root.exists() {
            tracing::warn!(path = %root.display(), "Invalid document path");
            continue;
        }
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::Io {
                path: root.display().to_string(),
                source: e.into(),
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_document_path(path) || in_schemas_dir(path) {
                continue;
            }
            // Zero-byte documents are explicitly ignored.
            let len = entry
                .metadata()
                .map_err(|e| Error::Io {
                    path: path.display().to_string(),
                    source: e.into(),
                })?
                .len();
            if len == 0 {
                tracing::debug!(path = %path.display(), "Skipping empty document");
                continue;
            }
            documents.push(path.to_path_buf());
        }
    }

    documents.sort();
    documents.dedup();
    Ok(documents)
}

/// Kind of filesystem change affecting a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// File was created.
    Created,
    /// File contents changed.
    Modified,
    /// File was removed.
    Removed,
}

/// A filesystem change event fed in by the host build system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEvent {
    /// Path of the changed file.
    pub path: PathBuf,
    /// What happened to it.
    pub kind: ChangeKind,
}

impl DocumentEvent {
    /// Creates a new event.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Returns `true` if this event should trigger regeneration.
    ///
    /// Non-document paths never trigger. Zero-byte files are ignored on
    /// create/modify; removals always trigger since the file is gone and a
    /// last-known length cannot be checked.
    #[must_use]
    pub fn is_relevant(&self) -> bool {
        if !is_document_path(&self.path) {
            return false;
        }
        match self.kind {
            ChangeKind::Removed => true,
            ChangeKind::Created | ChangeKind::Modified => {
                std::fs::metadata(&self.path).is_ok_and(|meta| meta.len() > 0)
            }
        }
    }
}
