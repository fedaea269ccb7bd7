//! pacer CLI - running challenge progression.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pacer_core::{Activity, ChallengeNumber, Time, UserId};
use pacer_progress::{ActivityListener, MyChallenge, ProgressionWorkflow};
use std::sync::Arc;
use tracing::info;

use config::Settings;

#[derive(Parser)]
#[command(name = "pacer")]
#[command(about = "Track progression through running challenges", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List challenges with the user's status
    List {
        /// User id
        #[arg(long)]
        user: UserId,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Start a challenge
    Start {
        /// Challenge number
        number: ChallengeNumber,
        /// User id
        #[arg(long)]
        user: UserId,
    },
    /// Record a completed activity
    Activity {
        /// User id
        #[arg(long)]
        user: UserId,
        /// Distance in km
        #[arg(long, requires = "duration")]
        distance: Option<f64>,
        /// Duration in seconds
        #[arg(long, requires = "distance")]
        duration: Option<u32>,
        /// When it happened (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<Time>,
        /// Activity type, e.g. "run"
        #[arg(long = "type")]
        activity_type: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.settings.init_logging();

    let catalog = Arc::new(cli.settings.load_catalog().await?);
    let store = cli.settings.open_store().await?;
    let workflow = Arc::new(ProgressionWorkflow::new(catalog, store));

    match cli.command {
        Commands::List { user, json } => {
            let rows = workflow.list_challenges(&user).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_table(&user, &rows);
            }
        }
        Commands::Start { number, user } => {
            let started = workflow
                .start_challenge(number, &user)
                .await
                .with_context(|| format!("starting challenge {}", number))?;
            let challenge = workflow
                .catalog()
                .get(started.number)
                .context("started challenge vanished from catalog")?;
            let row = MyChallenge::from_started(&started, challenge);
            println!("Started challenge {} at {}", row.number, started.started_at);
            println!("{}", format_requirements(&row));
        }
        Commands::Activity {
            user,
            distance,
            duration,
            at,
            activity_type,
        } => {
            let activity = build_activity(user, distance, duration, at, activity_type);
            let activity_id = activity.id;

            let (publisher, listener) = ActivityListener::spawn(workflow);
            publisher.publish(activity)?;
            drop(publisher);
            let stats = listener.shutdown().await;
            info!("Listener processed {} activities", stats.received);

            if stats.completed > 0 {
                println!("Activity {} completed the started challenge", activity_id);
            } else if stats.failed > 0 {
                anyhow::bail!("activity {} could not be processed", activity_id);
            } else {
                println!("Activity {} recorded no completion", activity_id);
            }
        }
    }

    Ok(())
}

/// Metrics are attached only when both distance and duration are given.
fn build_activity(
    user: UserId,
    distance: Option<f64>,
    duration: Option<u32>,
    at: Option<Time>,
    activity_type: Option<String>,
) -> Activity {
    let mut activity = Activity::new(user, at.unwrap_or_else(chrono::Utc::now));
    if let (Some(distance), Some(duration)) = (distance, duration) {
        activity = activity.with_metrics(distance, duration);
    }
    if let Some(activity_type) = activity_type {
        activity = activity.with_type(activity_type);
    }
    activity
}

fn print_table(user: &UserId, rows: &[MyChallenge]) {
    println!("Challenges for {} ({})", user, rows.len());
    for row in rows {
        println!(
            "  {:>3} | {} | {} | {}",
            row.number,
            format_status(row),
            if row.is_available { "available  " } else { "unavailable" },
            format_requirements(row),
        );
    }
}

fn format_status(row: &MyChallenge) -> &'static str {
    match (row.is_started, row.is_completed) {
        (true, true) => "STARTED+DONE",
        (true, false) => "STARTED     ",
        (false, true) => "DONE        ",
        (false, false) => "-           ",
    }
}

fn format_requirements(row: &MyChallenge) -> String {
    let mut parts = Vec::new();
    if let Some(distance) = row.minimum_distance {
        parts.push(format!(">= {:.1} km", distance));
    }
    if let Some(pace) = row.minimum_pace {
        parts.push(format!("<= {:.2} min/km", pace));
    }
    if parts.is_empty() {
        "any activity".to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn row(minimum_distance: Option<f64>, minimum_pace: Option<f64>) -> MyChallenge {
        MyChallenge {
            number: 1,
            is_completed: false,
            is_available: true,
            is_started: false,
            minimum_distance,
            minimum_pace,
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_start_rejects_zero() {
        let result = Cli::try_parse_from(["pacer", "start", "0", "--user", "alice"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_user_rejected() {
        let result = Cli::try_parse_from(["pacer", "list", "--user", "   "]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_activity() {
        let cli = Cli::try_parse_from([
            "pacer", "activity", "--user", "alice", "--distance", "5.5", "--duration", "1800",
            "--at", "2024-05-01T07:30:00Z",
        ])
        .unwrap();
        match cli.command {
            Commands::Activity { distance, duration, at, .. } => {
                assert_eq!(distance, Some(5.5));
                assert_eq!(duration, Some(1800));
                assert!(at.is_some());
            }
            _ => panic!("expected activity command"),
        }
    }

    fn parse_activity(args: &[&str]) -> Activity {
        let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
        match cli.command {
            Commands::Activity { user, distance, duration, at, activity_type } => {
                build_activity(user, distance, duration, at, activity_type)
            }
            _ => panic!("expected activity command"),
        }
    }

    #[test]
    fn test_distance_without_duration_rejected() {
        let result = Cli::try_parse_from(["pacer", "activity", "--user", "alice", "--distance", "5"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_duration_without_distance_rejected() {
        let result = Cli::try_parse_from(["pacer", "activity", "--user", "alice", "--duration", "1800"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_activity_without_metrics() {
        let activity = parse_activity(&["pacer", "activity", "--user", "alice", "--type", "walk"]);
        assert!(activity.metrics.is_none());
        assert_eq!(activity.activity_type.as_deref(), Some("walk"));
    }

    #[tokio::test]
    async fn test_slow_run_does_not_complete_pace_challenge() {
        use pacer_core::Challenge;
        use pacer_storage::{ChallengeCatalog, InMemoryStore};

        let number = ChallengeNumber::new(1).unwrap();
        let catalog = ChallengeCatalog::new(vec![Challenge::new(number).with_minimum_pace(3.0)]).unwrap();
        let workflow = ProgressionWorkflow::new(Arc::new(catalog), Arc::new(InMemoryStore::new()));
        let user = UserId::new("alice").unwrap();
        workflow.start_challenge(number, &user).await.unwrap();

        // 5 km in 30 minutes is 6 min/km
        let activity = parse_activity(&[
            "pacer", "activity", "--user", "alice", "--distance", "5", "--duration", "1800",
        ]);
        assert!((activity.pace().unwrap() - 6.0).abs() < 1e-9);
        assert!(workflow.handle_activity(&activity).await.unwrap().is_none());
    }

    #[test]
    fn test_format_requirements() {
        assert_eq!(format_requirements(&row(None, None)), "any activity");
        assert_eq!(format_requirements(&row(Some(5.0), None)), ">= 5.0 km");
        assert_eq!(
            format_requirements(&row(Some(5.0), Some(6.0))),
            ">= 5.0 km, <= 6.00 min/km"
        );
    }
}
