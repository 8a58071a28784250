// rustwatch-core/src/tasks/status_publish.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::services::publisher::StatusPublisher;

pub const DEFAULT_PUBLISH_INTERVAL: Duration = Duration::from_secs(60);

/// Spawns a background task that republishes the status report every
/// `period`, starting immediately. Stops as soon as `shutdown_rx` flips to
/// `true`; a publish already running is allowed to finish.
pub fn spawn_status_publish_task(
    publisher: Arc<StatusPublisher>,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                    continue;
                }
            }

            if *shutdown_rx.borrow() {
                break;
            }
            if let Err(e) = publisher.publish().await {
                error!("Status publish failed: {e}");
            }
        }

        info!("Status publish task stopped.");
    })
}
