//! Runtime configuration and logging bootstrap.

use anyhow::{Context, Result};
use clap::Args;
use pacer_storage::{ChallengeCatalog, ProgressStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Options shared by every command.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Directory holding progress data
    #[arg(long, env = "PACER_DATA_DIR", default_value = ".pacer", global = true)]
    pub data_dir: PathBuf,

    /// Challenge catalog (JSON)
    #[arg(long, env = "PACER_CATALOG", default_value = "challenges.json", global = true)]
    pub catalog: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "PACER_LOG", default_value = "info", global = true)]
    pub log_level: String,

    /// SQLite database URL; overrides the JSON data directory
    #[cfg(feature = "sqlite")]
    #[arg(long, env = "PACER_DATABASE_URL", global = true)]
    pub database_url: Option<String>,
}

impl Settings {
    /// Install the global tracing subscriber. Logs go to stderr.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.log_level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    /// Load and validate the challenge catalog.
    pub async fn load_catalog(&self) -> Result<ChallengeCatalog> {
        ChallengeCatalog::load(&self.catalog)
            .await
            .with_context(|| format!("loading catalog {}", self.catalog.display()))
    }

    /// Open the configured progress store.
    pub async fn open_store(&self) -> Result<Arc<dyn ProgressStore>> {
        #[cfg(feature = "sqlite")]
        {
            if let Some(url) = &self.database_url {
                let storage = pacer_storage::SqliteStorage::new(url)
                    .await
                    .with_context(|| format!("opening database {}", url))?;
                return Ok(Arc::new(storage));
            }
        }

        let storage = pacer_storage::JsonStorage::new(&self.data_dir)
            .await
            .with_context(|| format!("opening data directory {}", self.data_dir.display()))?;
        Ok(Arc::new(storage))
    }
}
