//! Periodic reconciliation of every room.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{info, warn};

use super::service::ReconcileService;

/// Runs [`ReconcileService::reconcile_all`] on a fixed period until told
/// to stop.
#[derive(Debug)]
pub struct ReconcileScheduler {
    service: ReconcileService,
    interval: Duration,
}

impl ReconcileScheduler {
    /// Create a scheduler. A zero interval disables it.
    pub fn new(service: ReconcileService, interval: Duration) -> Self {
        Self { service, interval }
    }

    /// Whether the scheduler has a period to run on.
    pub fn is_enabled(&self) -> bool {
        !self.interval.is_zero()
    }

    /// Sweep every room each period until the shutdown signal flips to `true`.
    ///
    /// The first sweep runs one full period after start. A sweep in
    /// progress finishes before shutdown is observed.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        if !self.is_enabled() {
            info!("Background reconciliation disabled");
            return;
        }
        info!(interval_secs = self.interval.as_secs(), "Background reconciliation started");

        let mut ticker = time::interval_at(time::Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    match self.service.reconcile_all().await {
                        Ok(results) => {
                            let failed = results.iter().filter(|r| r.error.is_some()).count();
                            info!(rooms = results.len(), failed, "Reconciliation sweep finished");
                        }
                        Err(e) => warn!(error = %e, "Reconciliation sweep could not list rooms"),
                    }
                }
            }
        }

        info!("Background reconciliation stopped");
    }
}
