//! Construction-time validation errors.

/// Errors raised while building value types from raw input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Challenge numbers start from 1.
    #[error("Challenge number must start from 1, got {0}")]
    InvalidChallengeNumber(i64),

    /// Input could not be read as a challenge number at all.
    #[error("Cannot convert '{0}' to a challenge number")]
    UnparsableChallengeNumber(String),

    /// User ids must contain at least one non-whitespace character.
    #[error("User id cannot be blank")]
    BlankUserId,
}
