use std::time::Duration;

use scoreline_core::reporting::ScoreReporter;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Starts the periodic reconciliation sweep. Returns `None` when the interval
/// is zero. The task stops once `shutdown` flips to `true`.
pub fn spawn(
    reporter: ScoreReporter,
    interval_secs: u64,
    mut shutdown: watch::Receiver<bool>,
) -> Option<JoinHandle<()>> {
    if interval_secs == 0 {
        info!(event_name = "system.sweep.disabled", correlation_id = "bootstrap", "sweep disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(error) = reporter.reconcile_outstanding().await {
                        warn!(
                            event_name = "system.sweep.error",
                            correlation_id = "sweep",
                            error = %error,
                            "reconciliation sweep failed"
                        );
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(event_name = "system.sweep.stopped", correlation_id = "shutdown", "sweep stopped");
    }))
}
