use std::sync::Arc;

use tracing::{debug, error, info};

use crate::report::{render_check, render_help, render_list};
use crate::roster::{AddOutcome, RosterStore};
use crate::services::profile_service::ProfileService;
use crate::services::publisher::StatusPublisher;
use rustwatch_common::models::{InboundMessage, PlayerId};
use rustwatch_common::traits::ChatTransport;

const ID_HINT: &str = "You get this from the battlemetrics link for a profile.\n\
                       Example: `https://www.battlemetrics.com/players/989425839` -> `989425839`";

/// Every command the bot answers to. Anything else is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddPlayer(Option<String>),
    RemovePlayer(Option<String>),
    Check(Option<String>),
    Force,
    List,
    Help,
}

impl Command {
    /// `content` must already start with `prefix`.
    pub fn parse(prefix: &str, content: &str) -> Option<Self> {
        let mut parts = content.split_whitespace();
        let name = parts.next()?.strip_prefix(prefix)?.to_lowercase();
        let arg = parts.next().map(str::to_string);

        match name.as_str() {
            "addplayer" => Some(Command::AddPlayer(arg)),
            "removeplayer" => Some(Command::RemovePlayer(arg)),
            "check" => Some(Command::Check(arg)),
            "force" => Some(Command::Force),
            "list" => Some(Command::List),
            "help" => Some(Command::Help),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResponse {
    Text(String),
    Embed(String),
}

pub struct CommandService {
    store: Arc<RosterStore>,
    profiles: ProfileService,
    publisher: Arc<StatusPublisher>,
    transport: Arc<dyn ChatTransport>,
}

impl CommandService {
    pub fn new(
        store: Arc<RosterStore>,
        profiles: ProfileService,
        publisher: Arc<StatusPublisher>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        debug!("Initializing CommandService");
        Self {
            store,
            profiles,
            publisher,
            transport,
        }
    }

    /// Handles one message and sends the reply, if any, to the channel it
    /// came from. Send failures are logged.
    pub async fn dispatch(&self, msg: &InboundMessage) {
        let Some(response) = self.handle_message(msg).await else {
            return;
        };

        let sent = match &response {
            CommandResponse::Text(text) => self
                .transport
                .send_message(&msg.channel_id, text)
                .await
                .map(|_| ()),
            CommandResponse::Embed(description) => {
                self.transport.send_embed(&msg.channel_id, description).await
            }
        };
        if let Err(e) = sent {
            error!("Failed to reply in channel {}: {e}", msg.channel_id);
        }
    }

    /// Decides the reply to `msg`. `None` means stay silent. Failures along
    /// the way become user-facing replies.
    pub async fn handle_message(&self, msg: &InboundMessage) -> Option<CommandResponse> {
        let settings = self.store.settings().await;

        if msg.author_is_bot
            || !msg.content.starts_with(&settings.prefix)
            || msg.guild_id.as_deref() != Some(settings.guild_id.as_str())
        {
            return None;
        }

        let Some(command) = Command::parse(&settings.prefix, &msg.content) else {
            debug!("Ignoring unknown command {:?}", msg.content);
            return None;
        };
        debug!("Parsed command {command:?} from {}", msg.author_id);

        let reply = match command {
            Command::AddPlayer(arg) => self.add_player(arg.as_deref()).await,
            Command::RemovePlayer(arg) => self.remove_player(arg.as_deref(), &settings.prefix).await,
            Command::Check(arg) => self.check(arg.as_deref()).await,
            Command::Force => self.force(&settings.channel_id).await,
            Command::List => CommandResponse::Text(render_list(&self.store.players().await)),
            Command::Help => CommandResponse::Embed(render_help(&settings.prefix, &settings.channel_id)),
        };
        Some(reply)
    }

    async fn add_player(&self, arg: Option<&str>) -> CommandResponse {
        let id = match validate_id(arg, "add") {
            Ok(id) => id,
            Err(reply) => return reply,
        };
        if !self.profiles.exists(&id).await {
            return not_found_upstream();
        }
        match self.store.add(id.clone()).await {
            AddOutcome::Added => info!("addplayer {id}"),
            AddOutcome::AlreadyTracked => debug!("addplayer {id}: already tracked"),
        }
        CommandResponse::Text(format!("Now tracking `{id}`."))
    }

    async fn remove_player(&self, arg: Option<&str>, prefix: &str) -> CommandResponse {
        let id = match validate_id(arg, "remove") {
            Ok(id) => id,
            Err(reply) => return reply,
        };
        match self.store.remove(&id).await {
            Ok(()) => CommandResponse::Text(format!("Stopped tracking `{id}`.")),
            Err(_) => CommandResponse::Text(format!(
                "That userID isn't in the list! Use `{prefix}list` to show all userIDs being tracked!"
            )),
        }
    }

    async fn check(&self, arg: Option<&str>) -> CommandResponse {
        let id = match validate_id(arg, "check") {
            Ok(id) => id,
            Err(reply) => return reply,
        };
        let facts = self.profiles.facts(&id).await;
        if !facts.is_valid_profile {
            return not_found_upstream();
        }
        CommandResponse::Text(render_check(&facts))
    }

    async fn force(&self, channel_id: &str) -> CommandResponse {
        match self.publisher.publish().await {
            Ok(()) => CommandResponse::Text(format!("Force updated players... <#{channel_id}>")),
            Err(e) => {
                error!("Forced publish failed: {e}");
                CommandResponse::Text("Couldn't update the status message right now.".to_string())
            }
        }
    }
}

/// Missing or malformed ids are answered before anything is fetched.
fn validate_id(arg: Option<&str>, verb: &str) -> Result<PlayerId, CommandResponse> {
    let Some(raw) = arg else {
        return Err(CommandResponse::Text(format!(
            "Please provide a userID to {verb}. {ID_HINT}"
        )));
    };
    PlayerId::parse(raw).map_err(|_| {
        CommandResponse::Text(format!(
            "Please provide a **VALID** userID to {verb}. {ID_HINT}"
        ))
    })
}

fn not_found_upstream() -> CommandResponse {
    CommandResponse::Text("It appears that ID isn't valid according to battlemetrics...".to_string())
}
