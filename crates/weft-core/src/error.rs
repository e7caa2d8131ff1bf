//! Error types for weft core
//!
//! Covers:
//! - Document storage failures
//! - Configuration loading and validation
//! - Editor operations that surface those to the caller
//!
//! Structural misses in the tree engine are not errors and never show up
//! here. Generator failures stay inside the preview area.

use std::path::PathBuf;
use weft_ast::NodeError;
use weft_preview::{GeneratorError, TargetError};
use weft_session::{DocumentId, SpecError};

/// Document storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No document under this id
    #[error("document not found: {0}")]
    NotFound(DocumentId),

    /// Stored bytes are not a valid handler document
    #[error("corrupt document {document}: {source}")]
    Corrupt {
        document: DocumentId,
        #[source]
        source: SpecError,
    },

    /// Backend refused the write
    #[error("store rejected save: {0}")]
    Rejected(String),

    /// Backend temporarily unreachable
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether the same call may succeed later
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Io(_))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid preview target: {0}")]
    Target(#[from] TargetError),
}

/// Editor errors
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Only from explicit project generation; previews never fail this way
    #[error("generator error: {0}")]
    Generator(#[from] GeneratorError),

    /// A palette entry named a type that does not exist
    #[error("node construction failed: {0}")]
    Node(#[from] NodeError),
}

impl EditorError {
    /// Whether the failed operation may be retried as-is
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store(err) => err.is_retryable(),
            Self::Generator(err) => err.is_retryable(),
            Self::Config(_) | Self::Node(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryability() {
        assert!(StoreError::Unavailable("down".into()).is_retryable());
        assert!(!StoreError::Rejected("quota".into()).is_retryable());
        assert!(!StoreError::NotFound(DocumentId::from("x")).is_retryable());

        let err: EditorError = GeneratorError::Timeout { after_ms: 10 }.into();
        assert!(err.is_retryable());
        let err: EditorError = NodeError::UnknownType("Hologram".into()).into();
        assert!(!err.is_retryable());
    }
}
