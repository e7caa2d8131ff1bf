//! External code generator seam

use crate::error::GeneratorError;
use crate::scheduler::Seq;
use crate::target::Target;
use async_trait::async_trait;
use indexmap::IndexMap;
use weft_ast::Body;

/// One regeneration request, tagged with its sequence number
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRequest {
    pub seq: Seq,
    pub target: Target,
    /// Name of the handler being edited, used for file selection
    pub artifact_name: String,
    pub body: Body,
}

/// Rendered source as returned by a generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewOutput {
    /// One source string
    Source(String),
    /// Named files, in the order the generator produced them
    Files(IndexMap<String, String>),
}

impl PreviewOutput {
    /// Output names in generator order; empty for a single source
    #[must_use]
    pub fn file_names(&self) -> Vec<String> {
        match self {
            Self::Source(_) => Vec::new(),
            Self::Files(files) => files.keys().cloned().collect(),
        }
    }
}

/// Black-box code generator
///
/// Implementations may answer with variable latency and out of order; the
/// orchestrator never relies on response ordering.
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    /// Render `request.body` for `request.target`
    async fn preview(&self, request: &PreviewRequest) -> Result<PreviewOutput, GeneratorError>;

    /// Write a full project for `target`; returns the written paths
    async fn generate_project(&self, target: &Target) -> Result<Vec<String>, GeneratorError> {
        tracing::debug!(%target, "generator has no project support");
        Err(GeneratorError::Unsupported("generate_project"))
    }
}
