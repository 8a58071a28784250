pub mod command_service;
pub mod profile_service;
pub mod publisher;

pub use command_service::{Command, CommandResponse, CommandService};
pub use profile_service::ProfileService;
pub use publisher::StatusPublisher;
