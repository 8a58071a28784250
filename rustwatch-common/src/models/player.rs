use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A BattleMetrics player identifier, e.g. `989425839` from
/// `https://www.battlemetrics.com/players/989425839`.
///
/// Only syntax is checked here. Whether the profile actually exists upstream
/// is decided later by fetching it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerId(String);

/// Non-empty, ASCII digits only, fits in a `u64`, no leading zero. The
/// last rule keeps `0111` and `111` from being tracked as two players.
pub fn is_valid_identifier_syntax(raw: &str) -> bool {
    !raw.is_empty()
        && raw.bytes().all(|b| b.is_ascii_digit())
        && !(raw.len() > 1 && raw.starts_with('0'))
        && raw.parse::<u64>().is_ok()
}

impl PlayerId {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        if is_valid_identifier_syntax(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(Error::InvalidPlayerId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlayerId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_valid_identifier_syntax(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidPlayerId(value))
        }
    }
}

impl From<PlayerId> for String {
    fn from(id: PlayerId) -> Self {
        id.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
