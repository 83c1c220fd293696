use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConversationError>;

/// Every failure the conversation core can report.
///
/// None of these are fatal: callers log them and keep the process running.
#[derive(Error, Debug)]
pub enum ConversationError {
    /// Empty user turn, or the session was already terminated.
    #[error("Input rejected: {0}")]
    InputRejected(String),

    /// Backend error or empty output. Session state is unchanged and the turn can be retried.
    #[error("Generation failed: {0}")]
    GenerationFailure(String),

    #[error("Failed to read session file {path}: {reason}")]
    PersistenceRead { path: PathBuf, reason: String },

    #[error("Failed to write session file {path}: {reason}")]
    PersistenceWrite { path: PathBuf, reason: String },
}

impl ConversationError {
    /// True when the same turn may be submitted again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ConversationError::GenerationFailure(_))
    }
}
