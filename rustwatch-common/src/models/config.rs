use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::player::PlayerId;

/// Everything the bot persists between runs. Field names on disk match the
/// `config.json` layout (`channelID`, `guildID`, `messageID`).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(alias = "credential")]
    pub token: String,

    #[serde(default)]
    pub players: Vec<PlayerId>,

    pub prefix: String,

    #[serde(rename = "channelID")]
    pub channel_id: String,

    #[serde(rename = "guildID")]
    pub guild_id: String,

    /// Empty until the first status message has been sent.
    #[serde(rename = "messageID", default)]
    pub message_id: String,
}

impl BotConfig {
    pub fn message_id(&self) -> Option<&str> {
        if self.message_id.is_empty() {
            None
        } else {
            Some(&self.message_id)
        }
    }
}

// Keep the token out of logs.
impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("players", &self.players)
            .field("prefix", &self.prefix)
            .field("channel_id", &self.channel_id)
            .field("guild_id", &self.guild_id)
            .field("message_id", &self.message_id)
            .finish()
    }
}
