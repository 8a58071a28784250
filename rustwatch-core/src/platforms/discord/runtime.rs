use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use twilight_gateway::{
    self as gateway,
    CloseFrame,
    Config,
    Event,
    EventTypeFlags,
    Intents,
    MessageSender,
    Shard,
    StreamExt,
};
use twilight_http::Client as HttpClient;
use twilight_http::client::ClientBuilder;
use twilight_http::error::ErrorType;
use twilight_model::id::marker::{ChannelMarker, MessageMarker};
use twilight_model::id::Id;
use twilight_util::builder::embed::EmbedBuilder;

use crate::Error;
use crate::eventbus::{BotEvent, EventBus};
use crate::platforms::{ConnectionStatus, PlatformAuth, PlatformIntegration};
use rustwatch_common::models::InboundMessage;
use rustwatch_common::traits::ChatTransport;

const SHARD_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Reads gateway events for one shard and forwards chat messages to the bus.
/// Exits on a gateway close once shutdown has been signalled.
async fn shard_runner(mut shard: Shard, event_bus: Arc<EventBus>) {
    let shard_id = shard.id().number();
    info!("(ShardRunner) Shard {shard_id} started. Listening for events.");

    let wanted = EventTypeFlags::READY | EventTypeFlags::MESSAGE_CREATE;
    while let Some(item) = shard.next_event(wanted).await {
        match item {
            Ok(Event::Ready(ready)) => {
                info!(
                    "Shard {shard_id} => READY as {} (ID={})",
                    ready.user.name, ready.user.id
                );
                event_bus
                    .publish(BotEvent::SystemMessage(format!("shard {shard_id} ready")))
                    .await;
            }
            Ok(Event::MessageCreate(msg)) => {
                trace!("Shard {shard_id} => message from {} in {}", msg.author.name, msg.channel_id);
                event_bus
                    .publish(BotEvent::ChatMessage(InboundMessage {
                        author_id: msg.author.id.to_string(),
                        author_is_bot: msg.author.bot,
                        guild_id: msg.guild_id.map(|g| g.to_string()),
                        channel_id: msg.channel_id.to_string(),
                        content: msg.content.clone(),
                    }))
                    .await;
            }
            Ok(Event::GatewayClose(frame)) => {
                if event_bus.is_shutdown() {
                    break;
                }
                warn!("Shard {shard_id} => gateway closed ({frame:?}); reconnecting");
                event_bus
                    .publish(BotEvent::SystemMessage(format!("shard {shard_id} reconnecting")))
                    .await;
            }
            Ok(other) => {
                trace!("Shard {shard_id} => unhandled event: {:?}", other.kind());
            }
            Err(err) => {
                error!("Shard {shard_id} => error receiving event: {err:?}");
            }
        }
    }

    info!("(ShardRunner) Shard {shard_id} event loop ended.");
}

fn parse_id<T>(raw: &str) -> Result<Id<T>, Error> {
    raw.parse::<u64>()
        .ok()
        .and_then(Id::new_checked)
        .ok_or_else(|| Error::Platform(format!("Invalid Discord ID: {raw}")))
}

fn is_unknown_message(err: &twilight_http::Error) -> bool {
    matches!(err.kind(), ErrorType::Response { status, .. } if status.get() == 404)
}

/// Outbound half of the Discord integration. Cheap to clone; shares the
/// REST client with the [`DiscordPlatform`] it came from.
#[derive(Clone)]
pub struct DiscordTransport {
    http: Arc<HttpClient>,
}

#[async_trait]
impl ChatTransport for DiscordTransport {
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<String, Error> {
        let channel = parse_id::<ChannelMarker>(channel_id)?;
        let message = self
            .http
            .create_message(channel)
            .content(text)
            .await
            .map_err(|e| Error::Platform(format!("Error sending Discord message: {e:?}")))?
            .model()
            .await
            .map_err(|e| Error::Platform(format!("Error decoding Discord message: {e:?}")))?;
        Ok(message.id.to_string())
    }

    async fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        text: &str,
    ) -> Result<(), Error> {
        let channel = parse_id::<ChannelMarker>(channel_id)?;
        let message = parse_id::<MessageMarker>(message_id)?;
        self.http
            .update_message(channel, message)
            .content(Some(text))
            .await
            .map_err(|e| {
                if is_unknown_message(&e) {
                    Error::NotFound(format!("Discord message {message_id} in {channel_id}"))
                } else {
                    Error::Platform(format!("Error editing Discord message: {e:?}"))
                }
            })?;
        Ok(())
    }

    async fn send_embed(&self, channel_id: &str, description: &str) -> Result<(), Error> {
        let channel = parse_id::<ChannelMarker>(channel_id)?;
        let embed = EmbedBuilder::new()
            .description(description)
            .validate()
            .map_err(|e| Error::Platform(format!("Invalid embed: {e}")))?
            .build();
        self.http
            .create_message(channel)
            .embeds(&[embed])
            .await
            .map_err(|e| Error::Platform(format!("Error sending Discord embed: {e:?}")))?;
        Ok(())
    }
}

pub struct DiscordPlatform {
    token: String,
    pub connection_status: ConnectionStatus,

    pub shard_tasks: Vec<JoinHandle<()>>,
    pub shard_senders: Vec<MessageSender>,

    http: Arc<HttpClient>,
    event_bus: Arc<EventBus>,
}

impl DiscordPlatform {
    pub fn new(token: String, event_bus: Arc<EventBus>) -> Self {
        let http = Arc::new(
            ClientBuilder::new()
                .token(token.clone())
                .timeout(Duration::from_secs(30))
                .build(),
        );
        Self {
            token,
            connection_status: ConnectionStatus::Disconnected,
            shard_tasks: Vec::new(),
            shard_senders: Vec::new(),
            http,
            event_bus,
        }
    }

    pub fn transport(&self) -> DiscordTransport {
        DiscordTransport {
            http: self.http.clone(),
        }
    }
}

#[async_trait]
impl PlatformAuth for DiscordPlatform {
    async fn authenticate(&mut self) -> Result<(), Error> {
        if self.token.is_empty() {
            return Err(Error::Auth("Discord token is empty".into()));
        }
        let user = self
            .http
            .current_user()
            .await
            .map_err(|e| Error::Auth(format!("Discord rejected the token: {e}")))?
            .model()
            .await
            .map_err(|e| Error::Auth(format!("Could not read current Discord user: {e}")))?;
        info!("Authenticated with Discord as {} (ID={})", user.name, user.id);
        Ok(())
    }
}

#[async_trait]
impl PlatformIntegration for DiscordPlatform {
    async fn connect(&mut self) -> Result<(), Error> {
        if matches!(self.connection_status, ConnectionStatus::Connected) {
            info!("(DiscordPlatform) Already connected => skipping");
            return Ok(());
        }

        let config = Config::new(
            self.token.clone(),
            Intents::GUILDS | Intents::GUILD_MESSAGES | Intents::MESSAGE_CONTENT,
        );

        let http = self.http.clone();
        let shards = match gateway::create_recommended(&http, config, |_, b| b.build()).await {
            Ok(shards) => shards,
            Err(e) => {
                self.connection_status = ConnectionStatus::Error(e.to_string());
                return Err(Error::Platform(format!("create_recommended error: {e}")));
            }
        };

        for shard in shards {
            self.shard_senders.push(shard.sender());
            let bus_for_shard = self.event_bus.clone();
            self.shard_tasks
                .push(tokio::spawn(shard_runner(shard, bus_for_shard)));
        }
        debug!("(DiscordPlatform) Spawned {} shard(s)", self.shard_tasks.len());

        self.connection_status = ConnectionStatus::Connected;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), Error> {
        self.connection_status = ConnectionStatus::Disconnected;

        for sender in &self.shard_senders {
            let _ = sender.close(CloseFrame::NORMAL);
        }
        for task in self.shard_tasks.drain(..) {
            let abort = task.abort_handle();
            if tokio::time::timeout(SHARD_SHUTDOWN_GRACE, task).await.is_err() {
                warn!("(DiscordPlatform) Shard did not close in time; aborting it");
                abort.abort();
            }
        }
        self.shard_senders.clear();

        Ok(())
    }

    async fn get_connection_status(&self) -> Result<ConnectionStatus, Error> {
        Ok(self.connection_status.clone())
    }
}
