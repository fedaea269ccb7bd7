//! Progression rules (Layer 3)
//!
//! Availability and completion rules, the start/complete workflow,
//! per-user projections and asynchronous activity delivery.

#![warn(missing_docs)]

pub mod error;
pub mod tracker;
pub mod availability;
pub mod completion;
pub mod view;
pub mod workflow;
pub mod listener;

pub use error::{ChallengeUnavailable, ErrorKind, ProgressionError, UnavailableReason};
pub use tracker::ProgressSnapshot;
pub use availability::{AvailabilityEvaluator, AvailabilitySpec, AVAILABILITY_ORDER};
pub use completion::{criteria_for, CompletionEvaluator, Criterion};
pub use view::MyChallenge;
pub use workflow::ProgressionWorkflow;
pub use listener::{ActivityListener, ActivityPublisher, ListenerClosed, ListenerStats};
