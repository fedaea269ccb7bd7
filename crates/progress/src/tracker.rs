//! Per-user progress snapshots.

use chrono::{DateTime, Utc};
use pacer_core::{ChallengeNumber, CompletedChallenge, StartedChallenge, UserId};
use pacer_storage::{ProgressStore, Result};
use std::collections::BTreeSet;

/// A user's progress at a point in time.
///
/// Loaded once per operation so that rules evaluated over many challenges
/// all see the same data and the store is not queried per challenge.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    /// Whose progress this is
    pub user_id: UserId,

    /// When snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Numbers of every completed challenge
    pub completed: BTreeSet<ChallengeNumber>,

    /// The current started challenge, if any
    pub started: Option<StartedChallenge>,
}

impl ProgressSnapshot {
    /// Build a snapshot from already-loaded records.
    pub fn new(
        user_id: UserId,
        completed: &[CompletedChallenge],
        started: Option<StartedChallenge>,
    ) -> Self {
        Self {
            user_id,
            timestamp: Utc::now(),
            completed: completed.iter().map(|c| c.number).collect(),
            started,
        }
    }

    /// A user with no progress at all.
    pub fn empty(user_id: UserId) -> Self {
        Self::new(user_id, &[], None)
    }

    /// Load a snapshot from the store.
    pub async fn load(store: &dyn ProgressStore, user_id: &UserId) -> Result<Self> {
        let completed = store.list_completed(user_id).await?;
        let started = store.find_started(user_id).await?;
        Ok(Self::new(user_id.clone(), &completed, started))
    }

    /// Whether `number` appears among the completed challenges.
    pub fn has_completed(&self, number: ChallengeNumber) -> bool {
        self.completed.contains(&number)
    }

    /// Whether `number` is the current started challenge.
    pub fn is_started(&self, number: ChallengeNumber) -> bool {
        self.started.as_ref().map(|s| s.number) == Some(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacer_core::Activity;
    use pacer_storage::InMemoryStore;

    fn n(value: i64) -> ChallengeNumber {
        ChallengeNumber::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_load_collects_numbers_once() {
        let store = InMemoryStore::new();
        let user = UserId::new("alice").unwrap();
        let activity = Activity::new(user.clone(), Utc::now());

        store.append_completed(&CompletedChallenge::for_activity(n(1), &activity)).await.unwrap();
        store.append_completed(&CompletedChallenge::for_activity(n(1), &activity)).await.unwrap();
        store.append_completed(&CompletedChallenge::for_activity(n(2), &activity)).await.unwrap();
        store.upsert_started(&StartedChallenge::new(user.clone(), n(3))).await.unwrap();

        let snapshot = ProgressSnapshot::load(&store, &user).await.unwrap();
        assert_eq!(snapshot.completed.len(), 2);
        assert!(snapshot.has_completed(n(1)));
        assert!(snapshot.has_completed(n(2)));
        assert!(snapshot.is_started(n(3)));
        assert!(!snapshot.is_started(n(1)));
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = ProgressSnapshot::empty(UserId::new("bob").unwrap());
        assert!(snapshot.completed.is_empty());
        assert!(snapshot.started.is_none());
        assert!(!snapshot.is_started(n(1)));
    }
}
