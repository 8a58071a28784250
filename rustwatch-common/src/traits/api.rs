use async_trait::async_trait;

use crate::error::Error;
use crate::models::PlayerId;

/// Retrieves the raw profile document for one player.
///
/// Any transport problem (timeout, connection error, non-2xx status) comes
/// back as an `Err`; callers treat it as "unknown", never as fatal.
#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    async fn fetch_profile(&self, id: &PlayerId) -> Result<String, Error>;
}

/// The parts of a chat platform the bot needs for outbound traffic.
///
/// `edit_message` should return [`Error::NotFound`] when the target message
/// no longer exists, so the caller can fall back to sending a fresh one.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Returns the new message's ID.
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<String, Error>;

    async fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        text: &str,
    ) -> Result<(), Error>;

    async fn send_embed(&self, channel_id: &str, description: &str) -> Result<(), Error>;
}
