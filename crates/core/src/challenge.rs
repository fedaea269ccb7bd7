//! Challenge model - catalog entries and their numbers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Position of a challenge in the catalog sequence. Always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ChallengeNumber(u32);

impl ChallengeNumber {
    /// Create a challenge number, rejecting anything below 1.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if value < 1 || value > i64::from(u32::MAX) {
            return Err(ValidationError::InvalidChallengeNumber(value));
        }
        Ok(Self(value as u32))
    }

    /// The raw number.
    pub fn value(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for ChallengeNumber {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChallengeNumber> for i64 {
    fn from(number: ChallengeNumber) -> Self {
        i64::from(number.0)
    }
}

impl fmt::Display for ChallengeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ChallengeNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: i64 = trimmed
            .parse()
            .map_err(|_| ValidationError::UnparsableChallengeNumber(s.to_string()))?;
        Self::new(value)
    }
}

/// A catalog-defined unit of progress.
///
/// Identity is the `number`; everything else is configuration that gates
/// starting (`locked`, `prerequisites`) or completing (the thresholds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    /// Position in the sequence
    pub number: ChallengeNumber,

    /// Locked challenges can never be started
    #[serde(default)]
    pub locked: bool,

    /// Challenges that must be completed first
    #[serde(default)]
    pub prerequisites: BTreeSet<ChallengeNumber>,

    /// Minimum distance in km an activity must cover
    #[serde(default)]
    pub minimum_distance: Option<f64>,

    /// Slowest acceptable pace in minutes per km
    #[serde(default)]
    pub minimum_pace: Option<f64>,
}

impl Challenge {
    /// Create an open challenge with no requirements.
    pub fn new(number: ChallengeNumber) -> Self {
        Self {
            number,
            locked: false,
            prerequisites: BTreeSet::new(),
            minimum_distance: None,
            minimum_pace: None,
        }
    }

    /// Mark the challenge as locked.
    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Require another challenge to be completed first.
    pub fn with_prerequisite(mut self, number: ChallengeNumber) -> Self {
        self.prerequisites.insert(number);
        self
    }

    /// Require a minimum distance in km.
    pub fn with_minimum_distance(mut self, km: f64) -> Self {
        self.minimum_distance = Some(km);
        self
    }

    /// Require a pace of at most `minutes_per_km`.
    pub fn with_minimum_pace(mut self, minutes_per_km: f64) -> Self {
        self.minimum_pace = Some(minutes_per_km);
        self
    }
}
