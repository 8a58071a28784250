// File: rustwatch-common/src/models/mod.rs
pub mod player;
pub mod config;
pub mod profile;
pub mod chat;

pub use player::{PlayerId, is_valid_identifier_syntax};
pub use config::BotConfig;
pub use profile::ProfileFacts;
pub use chat::InboundMessage;
