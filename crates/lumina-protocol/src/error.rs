use thiserror::Error;

/// Failure of a single change block. Never aborts the rest of a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Missing content for {0}")]
    MissingContent(String),
}
