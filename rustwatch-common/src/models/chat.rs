/// Transport-neutral view of an inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub author_id: String,
    pub author_is_bot: bool,
    /// `None` for direct messages.
    pub guild_id: Option<String>,
    pub channel_id: String,
    pub content: String,
}
