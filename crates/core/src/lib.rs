//! pacer core data models.
//!
//! This crate defines the value types and records shared by the
//! challenge catalog, the progress store and the progression rules.

#![warn(missing_docs)]

// Core identities
mod id;
mod user;
mod error;

// Catalog
mod challenge;

// Activities and progress
mod activity;
mod record;

// Re-exports
pub use id::*;
pub use user::UserId;
pub use error::ValidationError;
pub use challenge::{Challenge, ChallengeNumber};
pub use activity::{Activity, MetricSummary};
pub use record::{StartedChallenge, CompletedChallenge};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
