use chrono::{DateTime, Utc};

use crate::models::player::PlayerId;

/// What could be read off a single profile page. A default value means
/// "nothing known", which is also what a failed fetch degrades to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFacts {
    pub is_valid_profile: bool,
    pub is_online: bool,
    /// Empty unless `is_online`.
    pub current_server: String,
    /// Empty when the name could not be resolved.
    pub display_name: String,
    pub last_seen: Option<DateTime<Utc>>,
}

impl ProfileFacts {
    /// Display name if known, otherwise the raw identifier.
    pub fn label<'a>(&'a self, id: &'a PlayerId) -> &'a str {
        if self.display_name.is_empty() {
            id.as_str()
        } else {
            &self.display_name
        }
    }
}
