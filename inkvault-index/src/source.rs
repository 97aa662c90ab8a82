//! Where encrypted documents come from.
//!
//! The server can only filter by plaintext metadata, so every fetch here is
//! an over-fetch that the client narrows after decryption.

use crate::error::{IndexError, IndexResult};
use async_trait::async_trait;
use inkvault_crypto::EncryptedDocument;
use inkvault_types::{DocumentId, WorkspaceId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// Fetch boundary for encrypted documents.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Every document in a workspace.
    async fn fetch_workspace(
        &self,
        workspace: &WorkspaceId,
    ) -> IndexResult<Vec<EncryptedDocument>>;

    /// Candidates that may reference `title`. Content is opaque to the
    /// server, so by default this is the whole workspace.
    async fn fetch_backlink_candidates(
        &self,
        workspace: &WorkspaceId,
        _title: &str,
    ) -> IndexResult<Vec<EncryptedDocument>> {
        self.fetch_workspace(workspace).await
    }
}

/// In-process document source.
#[derive(Default)]
pub struct MemorySource {
    workspaces: Mutex<HashMap<WorkspaceId, Vec<EncryptedDocument>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a document, replacing one with the same ID.
    pub fn insert(&self, workspace: &WorkspaceId, document: EncryptedDocument) {
        let mut workspaces = self
            .workspaces
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let docs = workspaces.entry(workspace.clone()).or_default();
        match docs.iter_mut().find(|d| d.id == document.id) {
            Some(existing) => *existing = document,
            None => docs.push(document),
        }
    }

    pub fn remove(&self, workspace: &WorkspaceId, id: &DocumentId) -> bool {
        let mut workspaces = self
            .workspaces
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(docs) = workspaces.get_mut(workspace) else {
            return false;
        };
        let before = docs.len();
        docs.retain(|d| &d.id != id);
        docs.len() != before
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    async fn fetch_workspace(
        &self,
        workspace: &WorkspaceId,
    ) -> IndexResult<Vec<EncryptedDocument>> {
        let workspaces = self
            .workspaces
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(workspaces.get(workspace).cloned().unwrap_or_default())
    }
}

/// Documents stored as `<root>/<workspace>/<document id>.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn workspace_dir(&self, workspace: &WorkspaceId) -> IndexResult<PathBuf> {
        check_path_component(workspace.as_str())?;
        Ok(self.root.join(workspace.as_str()))
    }

    fn document_path(&self, workspace: &WorkspaceId, id: &DocumentId) -> IndexResult<PathBuf> {
        check_path_component(id.as_str())?;
        Ok(self.workspace_dir(workspace)?.join(format!("{id}.json")))
    }

    /// Writes a document, replacing any previous version.
    pub async fn write_document(
        &self,
        workspace: &WorkspaceId,
        document: &EncryptedDocument,
    ) -> IndexResult<PathBuf> {
        let path = self.document_path(workspace, &document.id)?;
        tokio::fs::create_dir_all(self.workspace_dir(workspace)?).await?;
        let json = serde_json::to_vec_pretty(document)?;
        tokio::fs::write(&path, json).await?;
        debug!(document_id = %document.id, path = %path.display(), "Wrote encrypted document");
        Ok(path)
    }

    pub async fn read_document(
        &self,
        workspace: &WorkspaceId,
        id: &DocumentId,
    ) -> IndexResult<EncryptedDocument> {
        let path = self.document_path(workspace, id)?;
        let bytes = tokio::fs::read(&path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl DocumentSource for DirectorySource {
    async fn fetch_workspace(
        &self,
        workspace: &WorkspaceId,
    ) -> IndexResult<Vec<EncryptedDocument>> {
        let dir = self.workspace_dir(workspace)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut documents = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable document file");
                    continue;
                }
            };
            match serde_json::from_slice::<EncryptedDocument>(&bytes) {
                Ok(doc) => documents.push(doc),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping malformed document file");
                }
            }
        }

        documents.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(documents)
    }
}

fn check_path_component(name: &str) -> IndexResult<()> {
    if name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.contains('\0')
    {
        return Err(IndexError::Source(format!(
            "'{name}' is not usable as a file name"
        )));
    }
    Ok(())
}
