// File: src/platforms/mod.rs

use async_trait::async_trait;
use crate::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Error(String),
}

#[async_trait]
pub trait PlatformAuth {
    /// Checks the credential against the platform. A rejected credential is
    /// fatal at startup.
    async fn authenticate(&mut self) -> Result<(), Error>;
}

#[async_trait]
pub trait PlatformIntegration: PlatformAuth {
    async fn connect(&mut self) -> Result<(), Error>;
    async fn disconnect(&mut self) -> Result<(), Error>;
    async fn get_connection_status(&self) -> Result<ConnectionStatus, Error>;
}

pub mod discord;
