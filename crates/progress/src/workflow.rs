//! Progression workflow - starting challenges and completing them.
//!
//! Per user there is at most one started challenge and any number of
//! completion records. Completing a challenge leaves the started record in
//! place, and a later qualifying activity appends another completion for
//! the same challenge.

use pacer_core::{Activity, ChallengeNumber, CompletedChallenge, StartedChallenge, UserId};
use pacer_storage::{ChallengeCatalog, ProgressStore};
use std::sync::Arc;
use tracing::{debug, info};

use crate::availability::AvailabilityEvaluator;
use crate::completion::CompletionEvaluator;
use crate::error::{ProgressionError, Result};
use crate::tracker::ProgressSnapshot;
use crate::view::MyChallenge;

/// Orchestrates the progression rules over a catalog and a store.
#[derive(Clone)]
pub struct ProgressionWorkflow {
    catalog: Arc<ChallengeCatalog>,
    store: Arc<dyn ProgressStore>,
    availability: AvailabilityEvaluator,
    completion: CompletionEvaluator,
}

impl ProgressionWorkflow {
    /// Create a workflow with the default rule sets.
    pub fn new(catalog: Arc<ChallengeCatalog>, store: Arc<dyn ProgressStore>) -> Self {
        Self {
            catalog,
            store,
            availability: AvailabilityEvaluator::default(),
            completion: CompletionEvaluator::new(),
        }
    }

    /// Replace the availability rules.
    pub fn with_availability(mut self, availability: AvailabilityEvaluator) -> Self {
        self.availability = availability;
        self
    }

    /// The catalog this workflow reads from.
    pub fn catalog(&self) -> &ChallengeCatalog {
        &self.catalog
    }

    /// Start `number` for `user_id`, replacing any previously started challenge.
    pub async fn start_challenge(
        &self,
        number: ChallengeNumber,
        user_id: &UserId,
    ) -> Result<StartedChallenge> {
        let challenge = self
            .catalog
            .get(number)
            .ok_or(ProgressionError::NoSuchChallenge(number))?;

        let progress = ProgressSnapshot::load(self.store.as_ref(), user_id).await?;
        self.availability.validate(challenge, &progress)?;

        let started = self
            .store
            .upsert_started(&StartedChallenge::new(user_id.clone(), number))
            .await?;
        info!("User {} started challenge {}", user_id, number);
        Ok(started)
    }

    /// Record `activity` against the user's started challenge.
    ///
    /// Returns `None` when nothing is started or the criteria are not met.
    pub async fn handle_activity(&self, activity: &Activity) -> Result<Option<CompletedChallenge>> {
        let Some(started) = self.store.find_started(&activity.user_id).await? else {
            debug!("No started challenge for {}, ignoring activity {}", activity.user_id, activity.id);
            return Ok(None);
        };

        let challenge = self
            .catalog
            .get(started.number)
            .ok_or(ProgressionError::CatalogInconsistent(started.number))?;

        if !self.completion.can_be_completed_by(challenge, Some(activity)) {
            return Ok(None);
        }

        let completed = self
            .store
            .append_completed(&CompletedChallenge::for_activity(challenge.number, activity))
            .await?;
        info!(
            "User {} completed challenge {} with activity {}",
            completed.user_id, completed.number, completed.activity_id
        );
        Ok(Some(completed))
    }

    /// Every catalog challenge with the user's status, ascending by number.
    pub async fn list_challenges(&self, user_id: &UserId) -> Result<Vec<MyChallenge>> {
        let progress = ProgressSnapshot::load(self.store.as_ref(), user_id).await?;
        Ok(self
            .catalog
            .find_all()
            .map(|challenge| MyChallenge::project(challenge, &progress, &self.availability))
            .collect())
    }
}
