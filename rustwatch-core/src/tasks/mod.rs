pub mod command_listener;
pub mod status_publish;

pub use command_listener::spawn_command_listener;
pub use status_publish::{spawn_status_publish_task, DEFAULT_PUBLISH_INTERVAL};
