//! The roster store: tracked players plus the rest of `config.json`.
//!
//! All reads and writes go through one mutex, so a report build always sees
//! a whole roster, never half of an add. Every mutation is written back to
//! disk; a failed write is logged and the in-memory change is kept.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::Error;
use rustwatch_common::models::{BotConfig, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyTracked,
}

/// Channel/guild/prefix settings, copied out of the config in one go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSettings {
    pub prefix: String,
    pub channel_id: String,
    pub guild_id: String,
}

pub struct RosterStore {
    path: PathBuf,
    config: Mutex<BotConfig>,
}

impl RosterStore {
    /// Reads the config file. A missing or malformed file is fatal for the
    /// caller; there is no sensible default token or channel.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: BotConfig = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("cannot parse {}: {e}", path.display())))?;

        if config.prefix.is_empty() {
            return Err(Error::Config(format!("{}: prefix must not be empty", path.display())));
        }

        let mut seen = Vec::with_capacity(config.players.len());
        for id in &config.players {
            if seen.contains(id) {
                warn!("Duplicate player {id} in {}; keeping the first entry", path.display());
            } else {
                seen.push(id.clone());
            }
        }
        let config = BotConfig { players: seen, ..config };

        info!(
            "Loaded config from {} ({} tracked player(s))",
            path.display(),
            config.players.len()
        );
        Ok(Self::from_config(path, config))
    }

    pub fn from_config(path: impl Into<PathBuf>, config: BotConfig) -> Self {
        Self {
            path: path.into(),
            config: Mutex::new(config),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn players(&self) -> Vec<PlayerId> {
        self.config.lock().await.players.clone()
    }

    pub async fn settings(&self) -> ChannelSettings {
        let cfg = self.config.lock().await;
        ChannelSettings {
            prefix: cfg.prefix.clone(),
            channel_id: cfg.channel_id.clone(),
            guild_id: cfg.guild_id.clone(),
        }
    }

    pub async fn channel_id(&self) -> String {
        self.config.lock().await.channel_id.clone()
    }

    pub async fn token(&self) -> String {
        self.config.lock().await.token.clone()
    }

    /// Appends `id` unless it is already tracked. Upstream existence must be
    /// checked by the caller first.
    pub async fn add(&self, id: PlayerId) -> AddOutcome {
        let mut cfg = self.config.lock().await;
        if cfg.players.contains(&id) {
            debug!("Player {id} already tracked");
            return AddOutcome::AlreadyTracked;
        }
        info!("Tracking player {id}");
        cfg.players.push(id);
        self.persist_best_effort(&cfg).await;
        AddOutcome::Added
    }

    pub async fn remove(&self, id: &PlayerId) -> Result<(), Error> {
        let mut cfg = self.config.lock().await;
        let Some(position) = cfg.players.iter().position(|p| p == id) else {
            return Err(Error::NotTracked(id.to_string()));
        };
        info!("No longer tracking player {id}");
        cfg.players.remove(position);
        self.persist_best_effort(&cfg).await;
        Ok(())
    }

    pub async fn message_id(&self) -> Option<String> {
        self.config.lock().await.message_id().map(str::to_string)
    }

    pub async fn set_message_id(&self, message_id: String) {
        let mut cfg = self.config.lock().await;
        info!("Status message is now {message_id}");
        cfg.message_id = message_id;
        self.persist_best_effort(&cfg).await;
    }

    /// Writes the current config to disk.
    pub async fn persist(&self) -> Result<(), Error> {
        let cfg = self.config.lock().await;
        self.write(&cfg).await
    }

    async fn persist_best_effort(&self, cfg: &BotConfig) {
        if let Err(e) = self.write(cfg).await {
            warn!("Failed to persist config to {}: {e}", self.path.display());
        }
    }

    /// Runs the file write on the blocking pool. Callers hold the config
    /// lock across this, so writes land in mutation order.
    async fn write(&self, cfg: &BotConfig) -> Result<(), Error> {
        let path = self.path.clone();
        let snapshot = cfg.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, &snapshot))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))?
    }
}

/// Temp file in the target directory, then rename over the target, so a
/// reader never sees a half-written file.
fn write_atomically(path: &Path, config: &BotConfig) -> Result<(), Error> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, config)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
