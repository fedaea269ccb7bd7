//! Read projection of the catalog for one user.

use pacer_core::{Challenge, StartedChallenge};
use serde::{Deserialize, Serialize};

use crate::availability::AvailabilityEvaluator;
use crate::tracker::ProgressSnapshot;

/// One row of a user's challenge list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MyChallenge {
    /// Challenge number
    pub number: u32,

    /// Completed at least once
    pub is_completed: bool,

    /// Passes every availability rule
    pub is_available: bool,

    /// The user's current started challenge
    pub is_started: bool,

    /// Minimum distance in km, if required
    pub minimum_distance: Option<f64>,

    /// Slowest acceptable pace in minutes per km, if required
    pub minimum_pace: Option<f64>,
}

impl MyChallenge {
    /// Project a challenge against a user's progress.
    pub fn project(
        challenge: &Challenge,
        progress: &ProgressSnapshot,
        availability: &AvailabilityEvaluator,
    ) -> Self {
        Self {
            number: challenge.number.value(),
            is_completed: progress.has_completed(challenge.number),
            is_available: availability.test(challenge, progress),
            is_started: progress.is_started(challenge.number),
            minimum_distance: challenge.minimum_distance,
            minimum_pace: challenge.minimum_pace,
        }
    }

    /// The row for a challenge that was just started.
    ///
    /// Completion history is not consulted: `is_completed` is always false,
    /// even when the challenge was completed before. Use
    /// [`project`](Self::project) for a row that reflects history.
    pub fn from_started(started: &StartedChallenge, challenge: &Challenge) -> Self {
        Self {
            number: started.number.value(),
            is_completed: false,
            is_available: true,
            is_started: true,
            minimum_distance: challenge.minimum_distance,
            minimum_pace: challenge.minimum_pace,
        }
    }
}
