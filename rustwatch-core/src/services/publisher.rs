use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::Error;
use crate::report::build_report;
use crate::roster::RosterStore;
use crate::services::profile_service::ProfileService;
use rustwatch_common::traits::ChatTransport;

/// Renders the status report and keeps one live message in the status
/// channel up to date.
pub struct StatusPublisher {
    store: Arc<RosterStore>,
    profiles: ProfileService,
    transport: Arc<dyn ChatTransport>,
    /// Timer and `force` runs both go through here, one at a time.
    publish_lock: Mutex<()>,
}

impl StatusPublisher {
    pub fn new(
        store: Arc<RosterStore>,
        profiles: ProfileService,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        debug!("Initializing StatusPublisher");
        Self {
            store,
            profiles,
            transport,
            publish_lock: Mutex::new(()),
        }
    }

    /// Builds the report and sends or edits the status message.
    pub async fn publish(&self) -> Result<(), Error> {
        let _guard = self.publish_lock.lock().await;

        let players = self.store.players().await;
        let report = build_report(&players, &self.profiles).await;
        let channel_id = self.store.settings().await.channel_id;

        if let Some(message_id) = self.store.message_id().await {
            match self
                .transport
                .edit_message(&channel_id, &message_id, &report)
                .await
            {
                Ok(()) => {
                    debug!("Edited status message {message_id} ({} player(s))", players.len());
                    return Ok(());
                }
                Err(Error::NotFound(reason)) => {
                    warn!("Status message {message_id} is gone ({reason}); sending a new one");
                }
                Err(e) => return Err(e),
            }
        }

        let message_id = self.transport.send_message(&channel_id, &report).await?;
        info!("Sent new status message {message_id} to channel {channel_id}");
        self.store.set_message_id(message_id).await;
        Ok(())
    }
}
