use thiserror::Error;

/// Library-level error type.
///
/// Provider and configuration failures are deliberately absent: they degrade
/// the engine to keyword fallback (with a log record) instead of surfacing
/// here. Only caller contract violations and unrecoverable source-data
/// problems reach this enum.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Profile file unreadable: {0}")]
    ProfileRead(#[from] std::io::Error),

    #[error("Profile JSON malformed: {0}")]
    ProfileParse(#[from] serde_json::Error),

    #[error("Embedding batch shape mismatch: {0}")]
    EmbeddingShape(String),
}
