//! Error types for node construction and decoding

/// Errors raised while building or decoding nodes
///
/// Tree-engine operations never produce these: a missing id is a no-op,
/// not an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    /// Discriminator outside the closed node-kind set
    #[error("unknown node type: {0}")]
    UnknownType(String),

    /// Tier outside 0..=3
    #[error("invalid tier: {0}")]
    InvalidTier(u64),

    /// Structured data that is not shaped like a node
    #[error("malformed node: {0}")]
    Malformed(String),
}
