//! Background purge task.
//!
//! Requests already purge on arrival; this task keeps memory bounded while
//! the service is idle.

use crate::manager::SessionManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Spawn a task that purges both stores every `period` until `shutdown`
/// becomes `true` or its sender is dropped.
///
/// Returns `None` without spawning when `period` is zero.
pub fn spawn_purge_task(
    manager: Arc<SessionManager>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Option<JoinHandle<()>> {
    if period.is_zero() {
        info!("Periodic purge disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period_ms = period.as_millis(), "Purge task started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = manager.begin_request();
                    if report.is_empty() {
                        debug!("Periodic purge found nothing");
                    } else {
                        info!(
                            sessions = report.sessions,
                            csrf_tokens = report.csrf_tokens,
                            "Periodic purge removed expired tokens"
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

        info!("Purge task stopped");
    }))
}
