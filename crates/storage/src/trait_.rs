//! Progress store trait abstraction.

use async_trait::async_trait;
use pacer_core::{CompletedChallenge, StartedChallenge, UserId};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite error
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    /// Catalog failed validation on load
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Storage for per-user progress.
///
/// Holds at most one started record per user and an append-only list of
/// completion records. Backends must make `upsert_started` atomic with
/// respect to concurrent calls for the same user.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Load the user's current started challenge.
    async fn find_started(&self, user_id: &UserId) -> Result<Option<StartedChallenge>>;

    /// Insert or replace the started record keyed by its user id.
    async fn upsert_started(&self, started: &StartedChallenge) -> Result<StartedChallenge>;

    /// List every completion record for the user, oldest first.
    async fn list_completed(&self, user_id: &UserId) -> Result<Vec<CompletedChallenge>>;

    /// Append a completion record. No deduplication is performed.
    async fn append_completed(&self, completed: &CompletedChallenge) -> Result<CompletedChallenge>;
}
