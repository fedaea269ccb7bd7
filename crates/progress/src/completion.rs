//! Completion criteria - does an activity complete a challenge?

use pacer_core::{Activity, Challenge};
use tracing::debug;

/// A numeric requirement an activity must meet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Criterion {
    /// Distance in km must be at least this much
    MinimumDistance(f64),
    /// Pace in minutes per km must be at most this much
    MinimumPace(f64),
}

impl Criterion {
    /// Whether `activity` meets the requirement. Activities without
    /// metrics never do.
    pub fn is_satisfied_by(&self, activity: &Activity) -> bool {
        match *self {
            Criterion::MinimumDistance(threshold) => activity
                .distance_km()
                .map_or(false, |distance| distance >= threshold),
            // Lower pace is faster.
            Criterion::MinimumPace(threshold) => {
                activity.pace().map_or(false, |pace| pace <= threshold)
            }
        }
    }
}

/// Criteria derived from a challenge's thresholds: distance first, then pace.
pub fn criteria_for(challenge: &Challenge) -> Vec<Criterion> {
    let mut criteria = Vec::new();
    if let Some(distance) = challenge.minimum_distance {
        criteria.push(Criterion::MinimumDistance(distance));
    }
    if let Some(pace) = challenge.minimum_pace {
        criteria.push(Criterion::MinimumPace(pace));
    }
    criteria
}

/// Decides whether an activity completes a challenge.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionEvaluator;

impl CompletionEvaluator {
    /// Create an evaluator.
    pub fn new() -> Self {
        Self
    }

    /// A missing activity never completes anything; a challenge without
    /// criteria is completed by any activity.
    pub fn can_be_completed_by(&self, challenge: &Challenge, activity: Option<&Activity>) -> bool {
        let Some(activity) = activity else {
            return false;
        };

        let criteria = criteria_for(challenge);
        if criteria.is_empty() {
            return true;
        }

        let unmet: Vec<_> = criteria
            .iter()
            .filter(|c| !c.is_satisfied_by(activity))
            .collect();
        if !unmet.is_empty() {
            debug!(
                "Activity {} does not complete challenge {}: unmet {:?}",
                activity.id, challenge.number, unmet
            );
        }
        unmet.is_empty()
    }
}
