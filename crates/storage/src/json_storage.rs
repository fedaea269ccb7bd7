//! JSON file storage implementation.
//!
//! Keeps all started records in a single `started.json` map keyed by user id
//! and writes one `completed/<user>/<id>.json` file per completion record,
//! where `<user>` is the hex-encoded user id. Every write goes to a
//! temporary file first and is renamed into place.

use async_trait::async_trait;
use pacer_core::{CompletedChallenge, StartedChallenge, UserId};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use super::{ProgressStore, Result};

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
    // Serializes read-modify-write cycles on started.json.
    started_lock: Mutex<()>,
}

impl JsonStorage {
    /// Create storage rooted at `root`, creating directories as needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("completed")).await?;

        Ok(Self {
            root,
            started_lock: Mutex::new(()),
        })
    }

    fn started_path(&self) -> PathBuf {
        self.root.join("started.json")
    }

    fn user_completed_dir(&self, user_id: &UserId) -> PathBuf {
        self.root.join("completed").join(user_dir_name(user_id))
    }

    fn completed_path(&self, completed: &CompletedChallenge) -> PathBuf {
        self.user_completed_dir(&completed.user_id)
            .join(format!("{}.json", completed.id))
    }

    async fn read_started(&self) -> Result<BTreeMap<UserId, StartedChallenge>> {
        Ok(read_json(&self.started_path()).await?.unwrap_or_default())
    }
}

#[async_trait]
impl ProgressStore for JsonStorage {
    async fn find_started(&self, user_id: &UserId) -> Result<Option<StartedChallenge>> {
        let _guard = self.started_lock.lock().await;
        Ok(self.read_started().await?.remove(user_id))
    }

    async fn upsert_started(&self, started: &StartedChallenge) -> Result<StartedChallenge> {
        let _guard = self.started_lock.lock().await;
        let mut all = self.read_started().await?;
        all.insert(started.user_id.clone(), started.clone());
        write_json(&self.started_path(), &all).await?;
        debug!("Saved started challenge {} for {}", started.number, started.user_id);
        Ok(started.clone())
    }

    async fn list_completed(&self, user_id: &UserId) -> Result<Vec<CompletedChallenge>> {
        let dir = self.user_completed_dir(user_id);
        if !fs::try_exists(&dir).await? {
            return Ok(Vec::new());
        }
        let mut mine: Vec<CompletedChallenge> = list_dir(&dir).await?;
        mine.sort_by(|a, b| a.completed_at.cmp(&b.completed_at).then(a.id.cmp(&b.id)));
        Ok(mine)
    }

    async fn append_completed(&self, completed: &CompletedChallenge) -> Result<CompletedChallenge> {
        fs::create_dir_all(self.user_completed_dir(&completed.user_id)).await?;
        write_json(&self.completed_path(completed), completed).await?;
        debug!("Saved completion {} for {}", completed.id, completed.user_id);
        Ok(completed.clone())
    }
}

// User ids are opaque text; hex keeps them safe as directory names.
fn user_dir_name(user_id: &UserId) -> String {
    user_id
        .as_str()
        .bytes()
        .map(|b| format!("{:02x}", b))
        .collect()
}

async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json.as_bytes()).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        if let Some(item) = read_json(&entry.path()).await? {
            items.push(item);
        }
    }
    Ok(items)
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
    async fn test_started_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let user = UserId::new("alice").unwrap();

        {
            let storage = JsonStorage::new(dir.path()).await.unwrap();
            storage.upsert_started(&StartedChallenge::new(user.clone(), n(3))).await.unwrap();
        }

        let storage = JsonStorage::new(dir.path()).await.unwrap();
        let started = storage.find_started(&user).await.unwrap().unwrap();
        assert_eq!(started.number, n(3));
    }

    #[tokio::test]
    async fn test_upsert_is_keyed_by_user() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();
        let alice = UserId::new("alice").unwrap();
        let bob = UserId::new("bob").unwrap();

        storage.upsert_started(&StartedChallenge::new(alice.clone(), n(1))).await.unwrap();
        storage.upsert_started(&StartedChallenge::new(bob.clone(), n(2))).await.unwrap();
        storage.upsert_started(&StartedChallenge::new(alice.clone(), n(4))).await.unwrap();

        assert_eq!(storage.find_started(&alice).await.unwrap().unwrap().number, n(4));
        assert_eq!(storage.find_started(&bob).await.unwrap().unwrap().number, n(2));
    }

    #[tokio::test]
    async fn test_concurrent_upserts_are_serialized() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(JsonStorage::new(dir.path()).await.unwrap());

        let mut handles = Vec::new();
        for i in 1..=6 {
            let storage = storage.clone();
            handles.push(tokio::spawn(async move {
                let user = UserId::new(format!("user-{}", i)).unwrap();
                storage.upsert_started(&StartedChallenge::new(user, n(i))).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        for i in 1..=6 {
            let user = UserId::new(format!("user-{}", i)).unwrap();
            assert_eq!(storage.find_started(&user).await.unwrap().unwrap().number, n(i));
        }
    }

    #[tokio::test]
    async fn test_completed_sorted_by_time() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();
        let user = UserId::new("alice").unwrap();
        let earlier = chrono::Utc::now() - chrono::Duration::hours(2);
        let later = chrono::Utc::now();

        storage
            .append_completed(&CompletedChallenge::for_activity(n(2), &Activity::new(user.clone(), later)))
            .await
            .unwrap();
        storage
            .append_completed(&CompletedChallenge::for_activity(n(1), &Activity::new(user.clone(), earlier)))
            .await
            .unwrap();

        let completed = storage.list_completed(&user).await.unwrap();
        let numbers: Vec<_> = completed.iter().map(|c| c.number).collect();
        assert_eq!(numbers, vec![n(1), n(2)]);
    }

    #[tokio::test]
    async fn test_completed_stored_per_user() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();
        let alice = UserId::new("alice").unwrap();
        let bob = UserId::new("../bob").unwrap();
        let now = chrono::Utc::now();

        let mine = storage
            .append_completed(&CompletedChallenge::for_activity(n(1), &Activity::new(alice.clone(), now)))
            .await
            .unwrap();
        storage
            .append_completed(&CompletedChallenge::for_activity(n(2), &Activity::new(bob.clone(), now)))
            .await
            .unwrap();

        let alice_dir = dir.path().join("completed").join(user_dir_name(&alice));
        assert!(alice_dir.join(format!("{}.json", mine.id)).exists());

        // A damaged file of another user is never read when listing alice.
        let bob_dir = dir.path().join("completed").join(user_dir_name(&bob));
        std::fs::write(bob_dir.join("broken.json"), b"{ not json").unwrap();

        let completed = storage.list_completed(&alice).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, mine.id);
        assert!(storage.list_completed(&bob).await.is_err());
    }

    #[test]
    fn test_user_dir_name_is_path_safe() {
        let name = user_dir_name(&UserId::new("../x/y").unwrap());
        assert_eq!(name, "2e2e2f782f79");
        assert!(name.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_missing_user_has_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();
        let user = UserId::new("nobody").unwrap();

        assert!(storage.find_started(&user).await.unwrap().is_none());
        assert!(storage.list_completed(&user).await.unwrap().is_empty());
    }
}
