//! Activity model - what a user submits after a run.

use serde::{Deserialize, Serialize};

use crate::id::ActivityId;
use crate::user::UserId;
use crate::Time;

const SECONDS_PER_MINUTE: f64 = 60.0;

/// Summary metrics recorded for an activity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Distance covered, in km
    pub distance_km: f64,

    /// Elapsed time, in seconds
    pub duration_seconds: u32,
}

impl MetricSummary {
    /// Create a metric summary.
    pub fn new(distance_km: f64, duration_seconds: u32) -> Self {
        Self {
            distance_km,
            duration_seconds,
        }
    }

    /// Pace in minutes per km. `None` unless the distance is positive.
    pub fn pace(&self) -> Option<f64> {
        if self.distance_km <= 0.0 {
            return None;
        }
        Some((f64::from(self.duration_seconds) / SECONDS_PER_MINUTE) / self.distance_km)
    }
}

/// A submitted activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Activity identifier, generated when the producer supplies none
    #[serde(default)]
    pub id: ActivityId,

    /// Who performed it
    pub user_id: UserId,

    /// When it happened
    pub occurred_at: Time,

    /// Free-form type, e.g. "run"
    #[serde(default)]
    pub activity_type: Option<String>,

    /// Recorded metrics, if any
    #[serde(default)]
    pub metrics: Option<MetricSummary>,
}

impl Activity {
    /// Create an activity without metrics.
    pub fn new(user_id: UserId, occurred_at: Time) -> Self {
        Self {
            id: ActivityId::new(),
            user_id,
            occurred_at,
            activity_type: None,
            metrics: None,
        }
    }

    /// Attach distance and duration.
    pub fn with_metrics(mut self, distance_km: f64, duration_seconds: u32) -> Self {
        self.metrics = Some(MetricSummary::new(distance_km, duration_seconds));
        self
    }

    /// Set the activity type.
    pub fn with_type(mut self, activity_type: impl Into<String>) -> Self {
        self.activity_type = Some(activity_type.into());
        self
    }

    /// Use a caller-supplied id.
    pub fn with_id(mut self, id: ActivityId) -> Self {
        self.id = id;
        self
    }

    /// Distance in km, if metrics were recorded.
    pub fn distance_km(&self) -> Option<f64> {
        self.metrics.map(|m| m.distance_km)
    }

    /// Pace in minutes per km, if it can be computed.
    pub fn pace(&self) -> Option<f64> {
        self.metrics.and_then(|m| m.pace())
    }
}
