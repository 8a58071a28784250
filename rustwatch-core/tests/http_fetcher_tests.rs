//! Integration tests for `HttpProfileFetcher` against a local `wiremock`
//! server, plus one pass through the extractor to make sure a fetched page
//! parses the same way a canned one does.

use std::time::Duration;

use wiremock::matchers::{header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rustwatch_common::models::PlayerId;
use rustwatch_common::traits::ProfileFetcher;
use rustwatch_core::extract::extract;
use rustwatch_core::test_utils::helpers::online_profile;
use rustwatch_core::{Error, HttpProfileFetcher};

fn id(raw: &str) -> PlayerId {
    PlayerId::parse(raw).expect("valid id")
}

fn fetcher(server: &MockServer, timeout: Duration) -> HttpProfileFetcher {
    HttpProfileFetcher::new(&format!("{}/players", server.uri()), timeout)
        .expect("failed to build test fetcher")
}

#[tokio::test]
async fn fetch_returns_page_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/players/111"))
        .and(header_regex("user-agent", "^rustwatch/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(online_profile("Alice", 9, "Rust Server A")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = fetcher(&server, Duration::from_secs(5))
        .fetch_profile(&id("111"))
        .await
        .expect("fetch should succeed");

    let facts = extract(&page);
    assert!(facts.is_valid_profile);
    assert!(facts.is_online);
    assert_eq!(facts.display_name, "Alice");
    assert_eq!(facts.current_server, "Rust Server A");
}

#[tokio::test]
async fn non_success_status_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/players/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = fetcher(&server, Duration::from_secs(5))
        .fetch_profile(&id("404"))
        .await
        .unwrap_err();

    match err {
        Error::Fetch { player_id, reason } => {
            assert_eq!(player_id, "404");
            assert!(reason.contains("404"), "reason was {reason}");
        }
        other => panic!("expected Error::Fetch, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/players/5"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = fetcher(&server, Duration::from_millis(200))
        .fetch_profile(&id("5"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Fetch { .. }), "got {err:?}");
}

#[tokio::test]
async fn base_url_with_or_without_trailing_slash() {
    let server = MockServer::start().await;
    let with_slash = HttpProfileFetcher::new(&format!("{}/players/", server.uri()), Duration::from_secs(5))
        .expect("fetcher");
    let without = fetcher(&server, Duration::from_secs(5));

    assert_eq!(with_slash.profile_url(&id("42")), without.profile_url(&id("42")));
    assert!(without.profile_url(&id("42")).ends_with("/players/42"));
}
