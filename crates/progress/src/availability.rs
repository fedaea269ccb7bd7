//! Availability rules - may a user start a challenge?
//!
//! The rules are an ordered list evaluated against a [`ProgressSnapshot`].
//! `test` is the plain conjunction; `validate` walks the same list and
//! reports the first failure, so the order decides which reason a caller
//! sees when several checks fail.

use pacer_core::Challenge;
use tracing::debug;

use crate::error::ChallengeUnavailable;
use crate::tracker::ProgressSnapshot;

/// A single availability rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilitySpec {
    /// The challenge must not be locked
    NotLocked,
    /// Every prerequisite must be among the user's completed challenges
    PrerequisitesMet,
}

/// Evaluation order of the default rule set. Locked is reported before
/// unmet prerequisites.
pub const AVAILABILITY_ORDER: [AvailabilitySpec; 2] =
    [AvailabilitySpec::NotLocked, AvailabilitySpec::PrerequisitesMet];

impl AvailabilitySpec {
    /// Whether the rule passes.
    pub fn test(&self, challenge: &Challenge, progress: &ProgressSnapshot) -> bool {
        match self {
            AvailabilitySpec::NotLocked => !challenge.locked,
            AvailabilitySpec::PrerequisitesMet => challenge
                .prerequisites
                .iter()
                .all(|p| progress.has_completed(*p)),
        }
    }

    /// Like [`test`](Self::test) but returns the failure reason.
    pub fn validate(
        &self,
        challenge: &Challenge,
        progress: &ProgressSnapshot,
    ) -> Result<(), ChallengeUnavailable> {
        if self.test(challenge, progress) {
            return Ok(());
        }
        Err(match self {
            AvailabilitySpec::NotLocked => ChallengeUnavailable::locked(challenge.number),
            AvailabilitySpec::PrerequisitesMet => {
                ChallengeUnavailable::prerequisites_not_met(challenge.number)
            }
        })
    }
}

/// Ordered composite of availability rules.
#[derive(Debug, Clone)]
pub struct AvailabilityEvaluator {
    specs: Vec<AvailabilitySpec>,
}

impl AvailabilityEvaluator {
    /// Create an evaluator with a custom rule order.
    pub fn new(specs: Vec<AvailabilitySpec>) -> Self {
        Self { specs }
    }

    /// The rules, in evaluation order.
    pub fn specs(&self) -> &[AvailabilitySpec] {
        &self.specs
    }

    /// Whether every rule passes.
    pub fn test(&self, challenge: &Challenge, progress: &ProgressSnapshot) -> bool {
        self.specs.iter().all(|spec| spec.test(challenge, progress))
    }

    /// Stop at the first failing rule and report it.
    pub fn validate(
        &self,
        challenge: &Challenge,
        progress: &ProgressSnapshot,
    ) -> Result<(), ChallengeUnavailable> {
        for spec in &self.specs {
            if let Err(e) = spec.validate(challenge, progress) {
                debug!(
                    "Challenge {} unavailable to {}: {:?} failed",
                    challenge.number, progress.user_id, spec
                );
                return Err(e);
            }
        }
        Ok(())
    }
}

impl Default for AvailabilityEvaluator {
    fn default() -> Self {
        Self::new(AVAILABILITY_ORDER.to_vec())
    }
}
