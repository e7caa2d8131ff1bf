//! Preview error types

use thiserror::Error;

/// Target catalog errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    #[error("unknown framework: {0}")]
    UnknownFramework(String),

    #[error("{framework} is not a {language} framework")]
    Unsupported { language: String, framework: String },

    #[error("malformed target '{0}', expected language/framework")]
    Malformed(String),
}

/// Failures reported by a code generator
///
/// All of them are recovered inside the orchestrator and only ever reach
/// the preview area.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("generator rejected request: {0}")]
    Rejected(String),

    #[error("generator timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("generator unavailable: {0}")]
    Unavailable(String),

    #[error("generator does not support {0}")]
    Unsupported(&'static str),
}

impl GeneratorError {
    /// Whether re-issuing the same request may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Unavailable(_))
    }
}
