//! In-memory progress store.

use async_trait::async_trait;
use pacer_core::{CompletedChallenge, StartedChallenge, UserId};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{ProgressStore, Result};

/// Volatile store backed by maps behind async locks.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    started: RwLock<HashMap<UserId, StartedChallenge>>,
    completed: RwLock<Vec<CompletedChallenge>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressStore for InMemoryStore {
    async fn find_started(&self, user_id: &UserId) -> Result<Option<StartedChallenge>> {
        Ok(self.started.read().await.get(user_id).cloned())
    }

    async fn upsert_started(&self, started: &StartedChallenge) -> Result<StartedChallenge> {
        self.started
            .write()
            .await
            .insert(started.user_id.clone(), started.clone());
        Ok(started.clone())
    }

    async fn list_completed(&self, user_id: &UserId) -> Result<Vec<CompletedChallenge>> {
        Ok(self
            .completed
            .read()
            .await
            .iter()
            .filter(|c| &c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn append_completed(&self, completed: &CompletedChallenge) -> Result<CompletedChallenge> {
        self.completed.write().await.push(completed.clone());
        Ok(completed.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacer_core::{Activity, ChallengeNumber};
    use std::sync::Arc;

    fn n(value: i64) -> ChallengeNumber {
        ChallengeNumber::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_replaces_previous_started() {
        let store = InMemoryStore::new();
        let user = UserId::new("alice").unwrap();

        store.upsert_started(&StartedChallenge::new(user.clone(), n(1))).await.unwrap();
        store.upsert_started(&StartedChallenge::new(user.clone(), n(2))).await.unwrap();

        let started = store.find_started(&user).await.unwrap().unwrap();
        assert_eq!(started.number, n(2));
    }

    #[tokio::test]
    async fn test_concurrent_upserts_leave_one_record() {
        let store = Arc::new(InMemoryStore::new());
        let user = UserId::new("alice").unwrap();

        let mut handles = Vec::new();
        for i in 1..=8 {
            let store = store.clone();
            let user = user.clone();
            handles.push(tokio::spawn(async move {
                store.upsert_started(&StartedChallenge::new(user, n(i))).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.started.read().await.len(), 1);
        assert!(store.find_started(&user).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_completed_filters_by_user() {
        let store = InMemoryStore::new();
        let alice = UserId::new("alice").unwrap();
        let bob = UserId::new("bob").unwrap();

        let now = chrono::Utc::now();
        store
            .append_completed(&CompletedChallenge::for_activity(n(1), &Activity::new(alice.clone(), now)))
            .await
            .unwrap();
        store
            .append_completed(&CompletedChallenge::for_activity(n(2), &Activity::new(bob.clone(), now)))
            .await
            .unwrap();

        let completed = store.list_completed(&alice).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].number, n(1));
        assert!(store.find_started(&bob).await.unwrap().is_none());
    }
}
