//! Text rendering for everything the bot posts.

use crate::services::profile_service::ProfileService;
use rustwatch_common::models::{PlayerId, ProfileFacts};

/// Fetches every player in roster order, one after another, and renders the
/// status block.
pub async fn build_report(players: &[PlayerId], profiles: &ProfileService) -> String {
    let mut entries = Vec::with_capacity(players.len());
    for id in players {
        let facts = profiles.facts(id).await;
        entries.push((id.clone(), facts));
    }
    render_report(&entries)
}

pub fn render_report(entries: &[(PlayerId, ProfileFacts)]) -> String {
    let mut out = String::from("```\n");
    for (id, facts) in entries {
        out.push_str(facts.label(id));
        out.push('\n');
        if facts.is_online {
            out.push_str("\tOnline: true\n");
            out.push_str(&format!("\tServer: {}\n", facts.current_server));
        } else {
            out.push_str("\tOnline: false\n");
        }
    }
    out.push_str("```");
    out
}

/// Reply for `check <id>`.
pub fn render_check(facts: &ProfileFacts) -> String {
    let mut out = format!(
        "```\nOnline: {}\nServer: {}\nUsername: {}",
        facts.is_online, facts.current_server, facts.display_name
    );
    if let Some(seen) = facts.last_seen {
        out.push_str(&format!("\nLast Seen: {}", seen.format("%Y-%m-%d %H:%M UTC")));
    }
    out.push_str("```");
    out
}

pub fn render_list(players: &[PlayerId]) -> String {
    let ids: Vec<&str> = players.iter().map(PlayerId::as_str).collect();
    format!("```\n{}\n```", ids.join("\n"))
}

pub fn render_help(prefix: &str, channel_id: &str) -> String {
    format!(
        "{p}addplayer <id> - adds a player to the list to be checked\n\
         {p}removeplayer <id> - removes a player from the list to be checked\n\
         {p}list - shows the players currently being checked\n\
         {p}force - forces an update of the status message in <#{channel_id}>\n\
         {p}check <id> - checks if a player is online\n\
         {p}help - shows this message",
        p = prefix,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn id(raw: &str) -> PlayerId {
        PlayerId::parse(raw).unwrap()
    }

    #[test]
    fn report_online_offline_and_unresolved() {
        let entries = vec![
            (
                id("111"),
                ProfileFacts {
                    is_valid_profile: true,
                    is_online: true,
                    current_server: "Rust Server A".into(),
                    display_name: "Alice".into(),
                    last_seen: None,
                },
            ),
            (id("222"), ProfileFacts::default()),
        ];

        assert_eq!(
            render_report(&entries),
            "```\nAlice\n\tOnline: true\n\tServer: Rust Server A\n222\n\tOnline: false\n```"
        );
    }

    #[test]
    fn empty_report_is_an_empty_block() {
        assert_eq!(render_report(&[]), "```\n```");
    }

    #[test]
    fn check_includes_last_seen_when_known() {
        let facts = ProfileFacts {
            is_valid_profile: true,
            display_name: "Bob".into(),
            last_seen: Some(Utc.with_ymd_and_hms(2024, 3, 2, 18, 4, 0).unwrap()),
            ..Default::default()
        };
        assert_eq!(
            render_check(&facts),
            "```\nOnline: false\nServer: \nUsername: Bob\nLast Seen: 2024-03-02 18:04 UTC```"
        );
    }

    #[test]
    fn list_one_per_line() {
        assert_eq!(render_list(&[id("111"), id("222")]), "```\n111\n222\n```");
        assert_eq!(render_list(&[]), "```\n\n```");
    }

    #[test]
    fn help_uses_prefix_and_channel() {
        let help = render_help("?", "42");
        assert!(help.starts_with("?addplayer <id>"));
        assert!(help.contains("<#42>"));
        assert_eq!(help.lines().count(), 6);
    }
}
