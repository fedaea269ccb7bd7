//! Unique identifiers for pacer records.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique identifier for a completion record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompletionId(Ulid);

impl CompletionId {
    /// Generate a new CompletionId
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for CompletionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CompletionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for CompletionId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Identifier of a submitted activity.
///
/// Producers that deliver the same activity more than once should reuse
/// the same id; otherwise one is generated on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityId(Ulid);

impl ActivityId {
    /// Generate a new ActivityId
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ActivityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ActivityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for ActivityId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}
