//! Best-effort scraping of BattleMetrics player pages.
//!
//! The page markup is not a contract, so everything here degrades to empty
//! fields instead of failing. The tests pin the fragments the extractor relies
//! on so template drift upstream shows up as a test failure.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use rustwatch_common::models::ProfileFacts;

/// Heading that carries the player's name. Only present on real profiles.
pub const NAME_MARKER: &str = r#"<h3 class="css-8uhtka">"#;

/// Value of the current-server field for players that are not connected.
pub const NOT_ONLINE: &str = "Not online";

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<h3 class="css-8uhtka">(.*?)</h3>"#).expect("valid name regex")
});
static CURRENT_SERVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<dt>Current Server\(s\)</dt><dd>(.*?)</dd>")
        .expect("valid current server regex")
});
static RUST_SERVER_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<a href="/servers/rust/[0-9]+"[^>]*>(.*?)</a>"#)
        .expect("valid server link regex")
});
static LAST_SEEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<dt>Last Seen</dt><dd><time dateTime="([^"]+)""#)
        .expect("valid last seen regex")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

/// Cheap validity probe: does the page look like a real profile?
pub fn is_valid_profile(document: &str) -> bool {
    document.contains(NAME_MARKER)
}

/// Pulls every fact we know how to read out of a profile page.
pub fn extract(document: &str) -> ProfileFacts {
    if !is_valid_profile(document) {
        return ProfileFacts::default();
    }

    let display_name = NAME_RE
        .captures(document)
        .and_then(|c| c.get(1))
        .map(|m| clean_text(m.as_str()))
        .unwrap_or_default();

    let (is_online, current_server) = extract_presence(document);

    ProfileFacts {
        is_valid_profile: true,
        is_online,
        current_server,
        display_name,
        last_seen: extract_last_seen(document),
    }
}

fn extract_presence(document: &str) -> (bool, String) {
    let Some(value) = CURRENT_SERVER_RE
        .captures(document)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
    else {
        return (false, String::new());
    };

    if value.trim() == NOT_ONLINE {
        return (false, String::new());
    }

    match RUST_SERVER_LINK_RE
        .captures(value)
        .and_then(|c| c.get(1))
        .map(|m| clean_text(m.as_str()))
    {
        Some(server) if !server.is_empty() => (true, server),
        _ => (false, String::new()),
    }
}

fn extract_last_seen(document: &str) -> Option<DateTime<Utc>> {
    let raw = LAST_SEEN_RE.captures(document)?.get(1)?.as_str();
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn clean_text(value: &str) -> String {
    decode_html(TAG_RE.replace_all(value, "").trim())
}

fn decode_html(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}
