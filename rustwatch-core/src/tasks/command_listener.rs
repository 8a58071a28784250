use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, trace};

use crate::eventbus::BotEvent;
use crate::services::command_service::CommandService;

/// Feeds chat events from the bus into the command service, one message at a
/// time, until shutdown or until the bus goes away.
pub fn spawn_command_listener(
    commands: Arc<CommandService>,
    mut events: mpsc::Receiver<BotEvent>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                maybe_event = events.recv() => {
                    match maybe_event {
                        Some(BotEvent::ChatMessage(msg)) => commands.dispatch(&msg).await,
                        Some(other) => trace!("Command listener ignoring {}", other.event_type()),
                        None => break,
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Command listener stopped.");
    })
}
