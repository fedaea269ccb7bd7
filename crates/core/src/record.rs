//! Progress records - what the store keeps per user.

use serde::{Deserialize, Serialize};

use crate::activity::Activity;
use crate::challenge::ChallengeNumber;
use crate::id::{ActivityId, CompletionId};
use crate::user::UserId;
use crate::Time;

/// The challenge a user is currently working on. At most one per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartedChallenge {
    /// Owner, also the record key
    pub user_id: UserId,

    /// Which challenge was started
    pub number: ChallengeNumber,

    /// When it was started
    pub started_at: Time,
}

impl StartedChallenge {
    /// Start `number` for `user_id` now.
    pub fn new(user_id: UserId, number: ChallengeNumber) -> Self {
        Self {
            user_id,
            number,
            started_at: chrono::Utc::now(),
        }
    }
}

/// An append-only record of a completed challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedChallenge {
    /// Unique identifier
    pub id: CompletionId,

    /// Who completed it
    pub user_id: UserId,

    /// Which challenge
    pub number: ChallengeNumber,

    /// The activity that completed it
    pub activity_id: ActivityId,

    /// When the activity occurred
    pub completed_at: Time,
}

impl CompletedChallenge {
    /// Record `activity` as completing `number`.
    pub fn for_activity(number: ChallengeNumber, activity: &Activity) -> Self {
        Self {
            id: CompletionId::new(),
            user_id: activity.user_id.clone(),
            number,
            activity_id: activity.id,
            completed_at: activity.occurred_at,
        }
    }
}
