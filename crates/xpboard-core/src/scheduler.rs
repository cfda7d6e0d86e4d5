//! Periodic dashboard refresh
//!
//! A background task that calls `RenderCoordinator::refresh` on a fixed
//! interval until stopped or dropped.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::coordinator::{CycleResult, RenderCoordinator};

/// Handle to the refresh task; dropping it cancels the task
pub struct RefreshScheduler {
    shutdown_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl RefreshScheduler {
    /// First refresh fires one `period` from now
    pub fn start(coordinator: Arc<RenderCoordinator>, period: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(period_secs = period.as_secs(), "Refresh scheduler started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match coordinator.refresh().await {
                            Ok(CycleResult::Rendered(report)) => {
                                debug!(rendered = report.rendered_count(), "Scheduled refresh done");
                            }
                            Ok(CycleResult::Superseded { generation }) => {
                                debug!(generation, "Scheduled refresh superseded");
                            }
                            Err(e) if e.is_auth_failure() => {
                                warn!(error = %e, "Session ended, stopping refresh");
                                break;
                            }
                            // Already surfaced to the target; retry next tick
                            Err(e) => debug!(error = %e, "Scheduled refresh failed"),
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!("Refresh scheduler shutting down");
                        break;
                    }
                }
            }
        });

        Self {
            shutdown_tx,
            handle,
        }
    }

    /// Ask the task to stop after the current refresh
    pub async fn stop(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
