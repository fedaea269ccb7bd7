//! SQLite storage backend.
//!
//! `started_challenge` is keyed by user id so a start is a single
//! `INSERT ... ON CONFLICT DO UPDATE`; `challenge_completed` is append-only.

use async_trait::async_trait;
use pacer_core::{ChallengeNumber, CompletedChallenge, StartedChallenge, Time, UserId};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use super::trait_::{ProgressStore, Result, StorageError};

/// SQLite storage implementation.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Connect to `db_url` (e.g. `sqlite://pacer.db?mode=rwc`) and create the schema.
    pub async fn new(db_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(db_url).await?;
        let storage = Self { pool };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Create a private in-memory database.
    pub async fn in_memory() -> Result<Self> {
        // A single connection, otherwise every pooled connection sees its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let storage = Self { pool };
        storage.init_schema().await?;
        Ok(storage)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS started_challenge (
                user_id TEXT PRIMARY KEY,
                challenge_number INTEGER NOT NULL,
                started_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS challenge_completed (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                challenge_number INTEGER NOT NULL,
                activity_id TEXT NOT NULL,
                completed_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_completed_user ON challenge_completed(user_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Check that the database answers.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

fn other<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Other(e.to_string())
}

fn parse_time(raw: &str) -> Result<Time> {
    Ok(chrono::DateTime::parse_from_rfc3339(raw)
        .map_err(other)?
        .with_timezone(&chrono::Utc))
}

fn started_from_row(row: &SqliteRow) -> Result<StartedChallenge> {
    let user_id: String = row.try_get("user_id")?;
    let number: i64 = row.try_get("challenge_number")?;
    let started_at: String = row.try_get("started_at")?;
    Ok(StartedChallenge {
        user_id: UserId::new(user_id).map_err(other)?,
        number: ChallengeNumber::new(number).map_err(other)?,
        started_at: parse_time(&started_at)?,
    })
}

fn completed_from_row(row: &SqliteRow) -> Result<CompletedChallenge> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let number: i64 = row.try_get("challenge_number")?;
    let activity_id: String = row.try_get("activity_id")?;
    let completed_at: String = row.try_get("completed_at")?;
    Ok(CompletedChallenge {
        id: id.parse().map_err(other)?,
        user_id: UserId::new(user_id).map_err(other)?,
        number: ChallengeNumber::new(number).map_err(other)?,
        activity_id: activity_id.parse().map_err(other)?,
        completed_at: parse_time(&completed_at)?,
    })
}

#[async_trait]
impl ProgressStore for SqliteStorage {
    async fn find_started(&self, user_id: &UserId) -> Result<Option<StartedChallenge>> {
        let row = sqlx::query(
            "SELECT user_id, challenge_number, started_at FROM started_challenge WHERE user_id = ?",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(started_from_row).transpose()
    }

    async fn upsert_started(&self, started: &StartedChallenge) -> Result<StartedChallenge> {
        sqlx::query(
            "INSERT INTO started_challenge (user_id, challenge_number, started_at)
             VALUES (?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                challenge_number = excluded.challenge_number,
                started_at = excluded.started_at",
        )
        .bind(started.user_id.as_str())
        .bind(i64::from(started.number))
        .bind(started.started_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(started.clone())
    }

    async fn list_completed(&self, user_id: &UserId) -> Result<Vec<CompletedChallenge>> {
        let rows = sqlx::query(
            "SELECT id, user_id, challenge_number, activity_id, completed_at
             FROM challenge_completed WHERE user_id = ?
             ORDER BY completed_at, id",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(completed_from_row).collect()
    }

    async fn append_completed(&self, completed: &CompletedChallenge) -> Result<CompletedChallenge> {
        sqlx::query(
            "INSERT INTO challenge_completed (id, user_id, challenge_number, activity_id, completed_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(completed.id.to_string())
        .bind(completed.user_id.as_str())
        .bind(i64::from(completed.number))
        .bind(completed.activity_id.to_string())
        .bind(completed.completed_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(completed.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacer_core::Activity;

    fn n(value: i64) -> ChallengeNumber {
        ChallengeNumber::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let storage = SqliteStorage::in_memory().await.unwrap();
        assert!(storage.health_check().await);
    }

    #[tokio::test]
    async fn test_upsert_started_replaces_row() {
        let storage = SqliteStorage::in_memory().await.unwrap();
        let user = UserId::new("alice").unwrap();

        storage.upsert_started(&StartedChallenge::new(user.clone(), n(1))).await.unwrap();
        storage.upsert_started(&StartedChallenge::new(user.clone(), n(5))).await.unwrap();

        let started = storage.find_started(&user).await.unwrap().unwrap();
        assert_eq!(started.number, n(5));

        let count: i64 = sqlx::query("SELECT COUNT(*) AS c FROM started_challenge")
            .fetch_one(&storage.pool)
            .await
            .unwrap()
            .get("c");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_completed_roundtrip() {
        let storage = SqliteStorage::in_memory().await.unwrap();
        let user = UserId::new("alice").unwrap();
        let activity = Activity::new(user.clone(), chrono::Utc::now());
        let completed = CompletedChallenge::for_activity(n(2), &activity);

        storage.append_completed(&completed).await.unwrap();

        let listed = storage.list_completed(&user).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, completed.id);
        assert_eq!(listed[0].activity_id, activity.id);
        assert_eq!(listed[0].number, n(2));
    }
}
