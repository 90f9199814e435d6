//! Periodic, cancellable training loop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::errors::recommender_error::RecommenderError;
use crate::orchestrator::RecommendationOrchestrator;

pub struct TrainingScheduler;

/// Owner of a running training loop. Dropping it also stops the loop once
/// the current sweep and save finish.
pub struct TrainingHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl TrainingScheduler {
    /// Start the loop: one sweep immediately, then one every `interval`.
    /// Each sweep ends with a model save to `save_path`.
    pub fn spawn(
        orchestrator: Arc<RecommendationOrchestrator>,
        interval: Duration,
        save_path: PathBuf,
    ) -> TrainingHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(run_loop(orchestrator, interval, save_path, stop_rx));
        info!(
            target: "recommender::training",
            interval_secs = interval.as_secs(),
            "training scheduler started"
        );
        TrainingHandle { stop_tx, task }
    }
}

impl TrainingHandle {
    /// Signal the loop and wait for it. A sweep in progress stops at the next
    /// user boundary; its save still runs to completion.
    ///
    /// # Errors
    /// `Join` if the training task panicked.
    pub async fn stop(self) -> Result<(), RecommenderError> {
        let _ = self.stop_tx.send(true);
        self.task.await?;
        info!(target: "recommender::training", "training scheduler stopped");
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

async fn run_loop(
    orchestrator: Arc<RecommendationOrchestrator>,
    interval: Duration,
    save_path: PathBuf,
    mut stop_rx: watch::Receiver<bool>,
) {
    loop {
        if *stop_rx.borrow() {
            break;
        }

        match orchestrator.run_training_cycle(&stop_rx).await {
            Ok(_) => {
                if let Err(e) = orchestrator.save_model(&save_path).await {
                    error!(target: "recommender::training", error = %e, "model save failed");
                }
            }
            Err(e) => error!(target: "recommender::training", error = %e, "training cycle failed"),
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
        }
    }
}
