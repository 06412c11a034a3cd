use std::io;

use thiserror::Error;

/// Raised when a query cannot be scored. Recoverable: the picker keeps the
/// previous results and stays open.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("operator `{operator}` needs a search term")]
    EmptyTerm { operator: String },

    #[error("empty alternative around `|`")]
    EmptyGroup,

    #[error("query is {len} characters long (limit {max})")]
    PatternTooLong { len: usize, max: usize },
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read tab snapshot: {0}")]
    Io(#[from] io::Error),

    #[error("invalid tab snapshot: {0}")]
    Json(#[from] serde_json::Error),
}
