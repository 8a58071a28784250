// File: rustwatch-core/src/test_utils/helpers.rs
//
// Canned upstream pages and in-memory collaborators shared by the unit and
// integration tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use crate::Error;
use crate::roster::RosterStore;
use rustwatch_common::models::{BotConfig, InboundMessage, PlayerId};
use rustwatch_common::traits::{ChatTransport, ProfileFetcher};

pub const TEST_CHANNEL: &str = "42";
pub const TEST_GUILD: &str = "7";
pub const TEST_PREFIX: &str = "!";

/// A profile page for a player currently on a Rust server.
pub fn online_profile(name: &str, server_id: u64, server_name: &str) -> String {
    format!(
        r#"<html><body><div><h3 class="css-8uhtka">{name}</h3></div><dl><dt>Last Seen</dt><dd><time dateTime="2024-03-02T18:04:05.000Z" title="x">now</time></dd><dt>Current Server(s)</dt><dd><a href="/servers/rust/{server_id}">{server_name}</a></dd></dl></body></html>"#
    )
}

/// A profile page for a known player who is not connected anywhere.
pub fn offline_profile(name: &str) -> String {
    format!(
        r#"<html><body><div><h3 class="css-8uhtka">{name}</h3></div><dl><dt>Current Server(s)</dt><dd>Not online</dd></dl></body></html>"#
    )
}

/// What the upstream site serves for an id with no profile behind it.
pub fn missing_profile() -> String {
    "<html><body><h1>Not Found</h1></body></html>".to_string()
}

pub fn player(raw: &str) -> PlayerId {
    PlayerId::parse(raw).expect("valid test player id")
}

pub fn test_config(players: &[&str]) -> BotConfig {
    BotConfig {
        token: "test-token".into(),
        players: players.iter().map(|p| player(p)).collect(),
        prefix: TEST_PREFIX.into(),
        channel_id: TEST_CHANNEL.into(),
        guild_id: TEST_GUILD.into(),
        message_id: String::new(),
    }
}

/// A store backed by a file in a fresh temp dir. Keep the `TempDir` alive
/// for as long as the store is used.
pub fn temp_store(config: BotConfig) -> (TempDir, Arc<RosterStore>) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = RosterStore::from_config(dir.path().join("config.json"), config);
    (dir, Arc::new(store))
}

/// A guild message from a regular user in the test guild.
pub fn chat(content: &str) -> InboundMessage {
    InboundMessage {
        author_id: "1001".into(),
        author_is_bot: false,
        guild_id: Some(TEST_GUILD.into()),
        channel_id: "99".into(),
        content: content.into(),
    }
}

/// Serves canned pages by id. Unknown ids fail like a transport error.
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, id: &str, document: String) -> Self {
        self.pages.insert(id.to_string(), document);
        self
    }

    pub fn with_delay(mut self, id: &str, delay: Duration) -> Self {
        self.delays.insert(id.to_string(), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileFetcher for StaticFetcher {
    async fn fetch_profile(&self, id: &PlayerId) -> Result<String, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(id.as_str()) {
            tokio::time::sleep(*delay).await;
        }
        self.pages.get(id.as_str()).cloned().ok_or_else(|| Error::Fetch {
            player_id: id.to_string(),
            reason: "connection refused".into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message { channel_id: String, message_id: String, text: String },
    Edit { channel_id: String, message_id: String, text: String },
    Embed { channel_id: String, description: String },
}

/// Which calls a [`RecordingTransport`] rejects with `Error::Platform`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailureMode {
    #[default]
    None,
    Edits,
    Everything,
}

/// Records everything sent through it. Edits can be slowed down to widen
/// race windows, messages can be marked deleted, and calls can be made to
/// fail.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
    deleted: Mutex<HashSet<String>>,
    next_id: AtomicU64,
    edit_delay: Option<Duration>,
    failures: FailureMode,
    attempts: AtomicUsize,
    in_flight: AtomicBool,
    overlapped: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1000),
            ..Default::default()
        }
    }

    pub fn with_edit_delay(mut self, delay: Duration) -> Self {
        self.edit_delay = Some(delay);
        self
    }

    pub fn with_failures(mut self, mode: FailureMode) -> Self {
        self.failures = mode;
        self
    }

    /// Calls made so far, failed ones included.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .map(|s| match s {
                Sent::Message { text, .. } | Sent::Edit { text, .. } => text,
                Sent::Embed { description, .. } => description,
            })
            .collect()
    }

    pub fn delete_message(&self, message_id: &str) {
        self.deleted.lock().unwrap().insert(message_id.to_string());
    }

    /// True if two edits were ever in progress at the same time.
    pub fn saw_overlap(&self) -> bool {
        self.overlapped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<String, Error> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failures == FailureMode::Everything {
            return Err(Error::Platform("send rejected".into()));
        }
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        self.sent.lock().unwrap().push(Sent::Message {
            channel_id: channel_id.into(),
            message_id: message_id.clone(),
            text: text.into(),
        });
        Ok(message_id)
    }

    async fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        text: &str,
    ) -> Result<(), Error> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failures != FailureMode::None {
            return Err(Error::Platform("edit rejected".into()));
        }
        if self.deleted.lock().unwrap().contains(message_id) {
            return Err(Error::NotFound(format!("message {message_id}")));
        }
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        if let Some(delay) = self.edit_delay {
            tokio::time::sleep(delay).await;
        }
        self.sent.lock().unwrap().push(Sent::Edit {
            channel_id: channel_id.into(),
            message_id: message_id.into(),
            text: text.into(),
        });
        self.in_flight.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn send_embed(&self, channel_id: &str, description: &str) -> Result<(), Error> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failures == FailureMode::Everything {
            return Err(Error::Platform("embed rejected".into()));
        }
        self.sent.lock().unwrap().push(Sent::Embed {
            channel_id: channel_id.into(),
            description: description.into(),
        });
        Ok(())
    }
}
