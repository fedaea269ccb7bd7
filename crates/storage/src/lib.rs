//! Storage abstraction and implementations for pacer.
//!
//! This crate provides the read-only challenge catalog and a trait-based
//! progress store with in-memory, JSON file and SQLite backends.

#![warn(missing_docs)]

pub mod trait_;
pub mod catalog;
pub mod memory;
#[cfg(feature = "json")]
pub mod json_storage;
#[cfg(feature = "sqlite")]
pub mod sqlite_storage;

pub use trait_::{ProgressStore, StorageError, Result};
pub use catalog::ChallengeCatalog;
pub use memory::InMemoryStore;
#[cfg(feature = "json")]
pub use json_storage::JsonStorage;
#[cfg(feature = "sqlite")]
pub use sqlite_storage::SqliteStorage;
