//! Read-only challenge catalog.
//!
//! The catalog is configuration: a JSON document listing every challenge,
//! validated once on load and never mutated afterwards.

use pacer_core::{Challenge, ChallengeNumber};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use super::{Result, StorageError};

#[derive(Deserialize)]
struct CatalogFile {
    challenges: Vec<Challenge>,
}

/// Lookup of challenge definitions by number.
#[derive(Debug, Clone, Default)]
pub struct ChallengeCatalog {
    challenges: BTreeMap<ChallengeNumber, Challenge>,
}

impl ChallengeCatalog {
    /// Build a catalog, rejecting duplicate numbers and unknown prerequisites.
    pub fn new(challenges: impl IntoIterator<Item = Challenge>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for challenge in challenges {
            let number = challenge.number;
            if map.insert(number, challenge).is_some() {
                return Err(StorageError::InvalidCatalog(format!(
                    "challenge {} is defined more than once",
                    number
                )));
            }
        }

        for challenge in map.values() {
            if let Some(missing) = challenge
                .prerequisites
                .iter()
                .find(|p| !map.contains_key(*p))
            {
                return Err(StorageError::InvalidCatalog(format!(
                    "challenge {} requires unknown challenge {}",
                    challenge.number, missing
                )));
            }
        }

        Ok(Self { challenges: map })
    }

    /// Parse a catalog from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.challenges)
    }

    /// Load a catalog from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).await?;
        let catalog = Self::from_json(&json)?;
        debug!("Loaded {} challenges from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Look up a challenge by number.
    pub fn get(&self, number: ChallengeNumber) -> Option<&Challenge> {
        self.challenges.get(&number)
    }

    /// All challenges, ascending by number.
    pub fn find_all(&self) -> impl Iterator<Item = &Challenge> {
        self.challenges.values()
    }

    /// Number of challenges.
    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }
}
