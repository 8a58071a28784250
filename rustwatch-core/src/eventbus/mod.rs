//! src/eventbus/mod.rs
//!
//! In-process event bus: the Discord runtime publishes inbound chat here and
//! the command listener subscribes. It also owns the process-wide shutdown
//! flag that every long-running task watches.

use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};

use rustwatch_common::models::InboundMessage;

#[derive(Debug, Clone)]
pub enum BotEvent {
    /// A chat message from the platform, before any filtering.
    ChatMessage(InboundMessage),

    /// Free-form notices (connection state changes and the like).
    SystemMessage(String),
}

impl BotEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            BotEvent::ChatMessage(_) => "chat_message",
            BotEvent::SystemMessage(_) => "system_message",
        }
    }
}

/// Each subscriber gets its own `mpsc::Sender<BotEvent>` for guaranteed delivery.
///
/// - If the subscriber’s channel buffer fills, `publish` will await
///   until there's space (backpressure).
/// - If the subscriber has dropped the `Receiver`, the channel is closed
///   and sending returns an error.
#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<mpsc::Sender<BotEvent>>>>,
    shutdown_tx: watch::Sender<bool>,
    pub shutdown_rx: watch::Receiver<bool>,
}

const DEFAULT_BUFFER_SIZE: usize = 256;

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            subscribers: Arc::new(Mutex::new(vec![])),
            shutdown_tx: tx,
            shutdown_rx: rx,
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Returns a receiver on which events will be delivered.
    pub async fn subscribe(&self, buffer_size: Option<usize>) -> mpsc::Receiver<BotEvent> {
        let size = buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE);
        let (tx, rx) = mpsc::channel(size);
        let mut subs = self.subscribers.lock().await;
        subs.push(tx);
        rx
    }

    /// Publish an event to all live subscribers; closed ones are dropped.
    pub async fn publish(&self, event: BotEvent) {
        let senders = {
            let mut subs = self.subscribers.lock().await;
            subs.retain(|s| !s.is_closed());
            subs.clone()
        };
        for s in senders {
            let _ = s.send(event.clone()).await;
        }
    }
}
