//! Asynchronous activity delivery.
//!
//! Publishers hand activities off and return immediately; a background task
//! feeds them through [`ProgressionWorkflow::handle_activity`] one at a time
//! in arrival order. Failures are logged and counted, never reported back
//! to the publisher.

use pacer_core::Activity;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::workflow::ProgressionWorkflow;

/// Counters for what the listener processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerStats {
    /// Activities taken off the channel
    pub received: usize,
    /// Activities that produced a completion record
    pub completed: usize,
    /// Activities that changed nothing
    pub ignored: usize,
    /// Activities whose handling failed
    pub failed: usize,
}

/// The listener task has stopped accepting activities.
#[derive(Debug, thiserror::Error)]
#[error("activity listener is closed")]
pub struct ListenerClosed(pub Box<Activity>);

/// Sending half, cheap to clone.
#[derive(Debug, Clone)]
pub struct ActivityPublisher {
    tx: mpsc::UnboundedSender<Activity>,
}

impl ActivityPublisher {
    /// Hand an activity to the listener without waiting for it to be handled.
    pub fn publish(&self, activity: Activity) -> Result<(), ListenerClosed> {
        self.tx
            .send(activity)
            .map_err(|e| ListenerClosed(Box::new(e.0)))
    }
}

/// Background task draining published activities.
pub struct ActivityListener {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<ListenerStats>,
}

impl ActivityListener {
    /// Spawn the listener on the current tokio runtime.
    pub fn spawn(workflow: Arc<ProgressionWorkflow>) -> (ActivityPublisher, ActivityListener) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run(workflow, rx, shutdown_rx));

        (ActivityPublisher { tx }, ActivityListener { shutdown, handle })
    }

    /// Stop accepting activities, finish the ones already queued and
    /// return the final counters.
    pub async fn shutdown(self) -> ListenerStats {
        // The task may already have stopped because every publisher was dropped.
        let _ = self.shutdown.send(());
        match self.handle.await {
            Ok(stats) => stats,
            Err(e) => {
                warn!("Activity listener task failed: {}", e);
                ListenerStats::default()
            }
        }
    }
}

async fn run(
    workflow: Arc<ProgressionWorkflow>,
    mut rx: mpsc::UnboundedReceiver<Activity>,
    mut shutdown: oneshot::Receiver<()>,
) -> ListenerStats {
    let mut stats = ListenerStats::default();

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                rx.close();
                break;
            }
            next = rx.recv() => match next {
                Some(activity) => deliver(&workflow, &activity, &mut stats).await,
                None => return stats,
            },
        }
    }

    while let Some(activity) = rx.recv().await {
        deliver(&workflow, &activity, &mut stats).await;
    }
    debug!("Activity listener drained after {} activities", stats.received);
    stats
}

async fn deliver(workflow: &ProgressionWorkflow, activity: &Activity, stats: &mut ListenerStats) {
    stats.received += 1;
    match workflow.handle_activity(activity).await {
        Ok(Some(_)) => stats.completed += 1,
        Ok(None) => stats.ignored += 1,
        Err(e) => {
            stats.failed += 1;
            warn!("Failed to handle activity {} for {}: {}", activity.id, activity.user_id, e);
        }
    }
}
