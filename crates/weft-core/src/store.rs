//! Handler document storage
//!
//! Documents are loaded and saved whole. [`MemoryStore`] keeps encoded
//! documents in a concurrent map; [`FileStore`] writes one JSON file per
//! document under a root directory.

use crate::error::StoreError;
use async_trait::async_trait;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use weft_session::{DocumentId, HandlerSpec};

/// Persistence boundary for handler documents
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the whole document
    async fn load(&self, document: &DocumentId) -> Result<HandlerSpec, StoreError>;

    /// Replace the whole document
    async fn save(&self, document: &DocumentId, spec: &HandlerSpec) -> Result<(), StoreError>;
}

/// In-memory store holding encoded documents
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: DashMap<DocumentId, String>,
}

impl MemoryStore {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document, bypassing the async interface
    ///
    /// # Errors
    /// Only if `spec` cannot be encoded.
    pub fn insert(&self, document: DocumentId, spec: &HandlerSpec) -> Result<(), StoreError> {
        let encoded = encode(&document, spec)?;
        self.documents.insert(document, encoded);
        Ok(())
    }

    /// Seed raw stored text, valid or not
    pub fn insert_raw(&self, document: DocumentId, raw: impl Into<String>) {
        self.documents.insert(document, raw.into());
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, document: &DocumentId) -> bool {
        self.documents.contains_key(document)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self, document: &DocumentId) -> Result<HandlerSpec, StoreError> {
        let raw = self
            .documents
            .get(document)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound(document.clone()))?;
        decode(document, &raw)
    }

    async fn save(&self, document: &DocumentId, spec: &HandlerSpec) -> Result<(), StoreError> {
        self.insert(document.clone(), spec)
    }
}

/// One `<id>.json` file per document under `root`
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `document`; ids containing `/` map to subdirectories
    #[must_use]
    pub fn path_for(&self, document: &DocumentId) -> PathBuf {
        self.root.join(format!("{}.json", document.as_str()))
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn load(&self, document: &DocumentId) -> Result<HandlerSpec, StoreError> {
        let path = self.path_for(document);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(document.clone()));
            }
            Err(err) => return Err(err.into()),
        };
        decode(document, &raw)
    }

    async fn save(&self, document: &DocumentId, spec: &HandlerSpec) -> Result<(), StoreError> {
        let path = self.path_for(document);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let encoded = encode(document, spec)?;
        // Write-then-rename so a crash never leaves a half-written document.
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, encoded).await?;
        tokio::fs::rename(&staging, &path).await?;
        tracing::debug!(document = %document, path = %path.display(), "document written");
        Ok(())
    }
}

fn encode(document: &DocumentId, spec: &HandlerSpec) -> Result<String, StoreError> {
    spec.to_json_string().map_err(|source| StoreError::Corrupt {
        document: document.clone(),
        source,
    })
}

fn decode(document: &DocumentId, raw: &str) -> Result<HandlerSpec, StoreError> {
    HandlerSpec::from_json_str(raw).map_err(|source| {
        tracing::warn!(document = %document, error = %source, "stored document is invalid");
        StoreError::Corrupt {
            document: document.clone(),
            source,
        }
    })
}
