//! Progression errors.

use pacer_core::ChallengeNumber;
use pacer_storage::StorageError;
use std::fmt;

/// Why a challenge cannot be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    /// The challenge is locked in the catalog
    Locked,
    /// Some prerequisite has not been completed
    PrerequisitesNotMet,
}

impl UnavailableReason {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnavailableReason::Locked => "locked",
            UnavailableReason::PrerequisitesNotMet => "prerequisites not met",
        }
    }
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A challenge failed an availability check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Challenge {number} is {reason}")]
pub struct ChallengeUnavailable {
    /// The challenge that was refused
    pub number: ChallengeNumber,
    /// The first check that failed
    pub reason: UnavailableReason,
}

impl ChallengeUnavailable {
    /// The challenge is locked.
    pub fn locked(number: ChallengeNumber) -> Self {
        Self {
            number,
            reason: UnavailableReason::Locked,
        }
    }

    /// The challenge has unmet prerequisites.
    pub fn prerequisites_not_met(number: ChallengeNumber) -> Self {
        Self {
            number,
            reason: UnavailableReason::PrerequisitesNotMet,
        }
    }
}

/// Coarse classification for outer transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The referenced challenge does not exist (404)
    NotFound,
    /// A precondition on the challenge failed (412)
    PreconditionFailed,
    /// Anything else (500)
    Internal,
}

/// Errors from the progression workflow.
#[derive(Debug, thiserror::Error)]
pub enum ProgressionError {
    /// No challenge with this number in the catalog
    #[error("No such challenge: {0}")]
    NoSuchChallenge(ChallengeNumber),

    /// The challenge exists but cannot be started
    #[error(transparent)]
    Unavailable(#[from] ChallengeUnavailable),

    /// A started record points at a number the catalog does not know
    #[error("Started challenge {0} is missing from the catalog")]
    CatalogInconsistent(ChallengeNumber),

    /// Storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ProgressionError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProgressionError::NoSuchChallenge(_) => ErrorKind::NotFound,
            ProgressionError::Unavailable(_) => ErrorKind::PreconditionFailed,
            ProgressionError::CatalogInconsistent(_) | ProgressionError::Storage(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// Result type for progression operations.
pub type Result<T> = std::result::Result<T, ProgressionError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn n(value: i64) -> ChallengeNumber {
        ChallengeNumber::new(value).unwrap()
    }

    #[test]
    fn test_unavailable_messages() {
        assert_eq!(ChallengeUnavailable::locked(n(3)).to_string(), "Challenge 3 is locked");
        assert_eq!(
            ChallengeUnavailable::prerequisites_not_met(n(2)).to_string(),
            "Challenge 2 is prerequisites not met"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(ProgressionError::NoSuchChallenge(n(9)).kind(), ErrorKind::NotFound);
        assert_eq!(
            ProgressionError::from(ChallengeUnavailable::locked(n(1))).kind(),
            ErrorKind::PreconditionFailed
        );
        assert_eq!(
            ProgressionError::Storage(StorageError::Other("disk".into())).kind(),
            ErrorKind::Internal
        );
        assert_eq!(ProgressionError::NoSuchChallenge(n(9)).to_string(), "No such challenge: 9");
    }
}
