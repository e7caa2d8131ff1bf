//! Error types for handler documents

use weft_ast::NodeId;

/// Problems with a handler document read from storage
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    /// Document is not valid structured data for a handler
    #[error("invalid handler document: {0}")]
    Decode(#[from] serde_json::Error),

    /// Same node id appears more than once in the body
    #[error("duplicate node ids in body: {ids:?}")]
    DuplicateIds { ids: Vec<NodeId> },
}
