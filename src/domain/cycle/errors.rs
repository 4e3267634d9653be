//! Cycle-specific error types.

use thiserror::Error;

use crate::domain::foundation::ErrorCode;

/// Misuse errors returned to callers of the cycle operations.
///
/// Corruption is deliberately absent: it is repaired in place and never
/// surfaced as a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    #[error("Cycle already holds {position} of {cycle_length} outcomes; request the next outcome to start a new cycle")]
    CycleExhausted { position: usize, cycle_length: usize },
}

impl CommitError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CommitError::CycleExhausted { .. } => ErrorCode::CycleExhausted,
        }
    }
}
