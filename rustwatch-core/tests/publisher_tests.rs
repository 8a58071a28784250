// File: rustwatch-core/tests/publisher_tests.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use rustwatch_core::eventbus::EventBus;
use rustwatch_core::report::build_report;
use rustwatch_core::services::{ProfileService, StatusPublisher};
use rustwatch_core::tasks::spawn_status_publish_task;
use rustwatch_core::test_utils::helpers::{
    offline_profile, online_profile, player, temp_store, test_config, FailureMode,
    RecordingTransport, Sent, StaticFetcher, TEST_CHANNEL,
};
use rustwatch_core::{Error, RosterStore};
use rustwatch_common::traits::ProfileFetcher;

fn profiles(fetcher: StaticFetcher) -> ProfileService {
    let fetcher: Arc<dyn ProfileFetcher> = Arc::new(fetcher);
    ProfileService::new(fetcher)
}

#[tokio::test]
async fn report_scenario_online_then_fetch_failure() {
    let svc = profiles(
        StaticFetcher::new().with_page("111", online_profile("111", 1, "Rust Server A")),
    );

    let report = build_report(&[player("111"), player("222")], &svc).await;

    assert_eq!(
        report,
        "```\n111\n\tOnline: true\n\tServer: Rust Server A\n222\n\tOnline: false\n```"
    );
}

#[tokio::test]
async fn report_follows_roster_order_not_fetch_latency() {
    let svc = profiles(
        StaticFetcher::new()
            .with_page("111", offline_profile("Slow"))
            .with_delay("111", Duration::from_millis(80))
            .with_page("222", offline_profile("Fast"))
            .with_page("333", online_profile("Medium", 7, "EU Main"))
            .with_delay("333", Duration::from_millis(20)),
    );

    let report = build_report(&[player("111"), player("222"), player("333")], &svc).await;

    let labels: Vec<&str> = report
        .lines()
        .filter(|l| !l.starts_with('\t') && !l.starts_with("```"))
        .collect();
    assert_eq!(labels, vec!["Slow", "Fast", "Medium"]);
}

#[tokio::test]
async fn first_publish_sends_then_later_publishes_edit() -> Result<(), Error> {
    let (_dir, store) = temp_store(test_config(&["111"]));
    let transport = Arc::new(RecordingTransport::new());
    let publisher = StatusPublisher::new(
        store.clone(),
        profiles(StaticFetcher::new().with_page("111", offline_profile("Alice"))),
        transport.clone(),
    );

    publisher.publish().await?;
    publisher.publish().await?;

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    let Sent::Message { channel_id, message_id, .. } = &sent[0] else {
        panic!("expected a new message first, got {:?}", sent[0]);
    };
    assert_eq!(channel_id, TEST_CHANNEL);
    assert!(matches!(&sent[1], Sent::Edit { message_id: edited, .. } if edited == message_id));

    // The handle survives a restart.
    let reloaded = RosterStore::load(store.path())?;
    assert_eq!(reloaded.message_id().await.as_deref(), Some(message_id.as_str()));
    Ok(())
}

#[tokio::test]
async fn deleted_status_message_is_replaced() -> Result<(), Error> {
    let mut config = test_config(&[]);
    config.message_id = "500".into();
    let (_dir, store) = temp_store(config);
    let transport = Arc::new(RecordingTransport::new());
    transport.delete_message("500");
    let publisher = StatusPublisher::new(store.clone(), profiles(StaticFetcher::new()), transport.clone());

    publisher.publish().await?;

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    let Sent::Message { message_id, text, .. } = &sent[0] else {
        panic!("expected a fresh message, got {:?}", sent[0]);
    };
    assert_eq!(text, "```\n```");
    assert_eq!(store.message_id().await.as_deref(), Some(message_id.as_str()));
    Ok(())
}

#[tokio::test]
async fn rejected_edit_is_an_error_and_does_not_resend() {
    let mut config = test_config(&["111"]);
    config.message_id = "500".into();
    let (_dir, store) = temp_store(config);
    let transport = Arc::new(RecordingTransport::new().with_failures(FailureMode::Edits));
    let publisher = StatusPublisher::new(
        store.clone(),
        profiles(StaticFetcher::new().with_page("111", offline_profile("Alice"))),
        transport.clone(),
    );

    let err = publisher.publish().await.unwrap_err();

    assert!(matches!(err, Error::Platform(_)), "got {err:?}");
    assert_eq!(transport.attempts(), 1);
    assert!(transport.sent().is_empty());
    assert_eq!(store.message_id().await.as_deref(), Some("500"));
}

#[tokio::test]
async fn concurrent_publishes_are_serialized() -> Result<(), Error> {
    let mut config = test_config(&["111", "222"]);
    config.message_id = "500".into();
    let (_dir, store) = temp_store(config);
    let transport = Arc::new(RecordingTransport::new().with_edit_delay(Duration::from_millis(40)));
    let publisher = Arc::new(StatusPublisher::new(
        store,
        profiles(
            StaticFetcher::new()
                .with_page("111", online_profile("Alice", 1, "Rust Server A"))
                .with_page("222", offline_profile("Bob"))
                .with_delay("222", Duration::from_millis(10)),
        ),
        transport.clone(),
    ));

    let a = tokio::spawn({
        let p = publisher.clone();
        async move { p.publish().await }
    });
    let b = tokio::spawn({
        let p = publisher.clone();
        async move { p.publish().await }
    });
    a.await.expect("join a")?;
    b.await.expect("join b")?;

    assert!(!transport.saw_overlap());
    let expected = "```\nAlice\n\tOnline: true\n\tServer: Rust Server A\nBob\n\tOnline: false\n```";
    let texts = transport.texts();
    assert_eq!(texts.len(), 2);
    assert!(texts.iter().all(|t| t == expected));
    Ok(())
}

#[tokio::test]
async fn build_sees_roster_before_or_after_add_never_partial() {
    let (_dir, store) = temp_store(test_config(&["111"]));
    let svc = profiles(
        StaticFetcher::new()
            .with_page("111", offline_profile("Alice"))
            .with_page("222", offline_profile("Bob")),
    );

    let adder = {
        let store = store.clone();
        tokio::spawn(async move { store.add(player("222")).await })
    };
    let players = store.players().await;
    adder.await.unwrap();

    let report = build_report(&players, &svc).await;
    assert!(
        report == "```\nAlice\n\tOnline: false\n```"
            || report == "```\nAlice\n\tOnline: false\nBob\n\tOnline: false\n```",
        "unexpected report {report}"
    );
}

#[tokio::test]
async fn periodic_task_publishes_and_stops_on_shutdown() {
    let (_dir, store) = temp_store(test_config(&["111"]));
    let transport = Arc::new(RecordingTransport::new());
    let publisher = Arc::new(StatusPublisher::new(
        store,
        profiles(StaticFetcher::new().with_page("111", offline_profile("Alice"))),
        transport.clone(),
    ));
    let bus = EventBus::new();

    let handle = spawn_status_publish_task(publisher, Duration::from_millis(30), bus.shutdown_rx.clone());
    tokio::time::sleep(Duration::from_millis(100)).await;
    bus.shutdown();

    timeout(Duration::from_millis(500), handle)
        .await
        .expect("task should stop promptly")
        .expect("task should not panic");

    let sent = transport.sent();
    assert!(sent.len() >= 2, "expected several publishes, got {sent:?}");
    assert!(matches!(sent[0], Sent::Message { .. }));
    assert!(sent[1..].iter().all(|s| matches!(s, Sent::Edit { .. })));
}

#[tokio::test]
async fn shutdown_interrupts_long_interval() {
    let (_dir, store) = temp_store(test_config(&[]));
    let transport = Arc::new(RecordingTransport::new());
    let publisher = Arc::new(StatusPublisher::new(store, profiles(StaticFetcher::new()), transport.clone()));
    let bus = EventBus::new();

    let handle = spawn_status_publish_task(publisher, Duration::from_secs(3600), bus.shutdown_rx.clone());
    tokio::time::sleep(Duration::from_millis(50)).await;
    bus.shutdown();

    timeout(Duration::from_millis(500), handle)
        .await
        .expect("shutdown must not wait for the next tick")
        .expect("task should not panic");
    assert_eq!(transport.sent().len(), 1);
}

#[tokio::test]
async fn periodic_task_keeps_going_after_failed_publishes() {
    let (_dir, store) = temp_store(test_config(&["111"]));
    let transport = Arc::new(RecordingTransport::new().with_failures(FailureMode::Everything));
    let publisher = Arc::new(StatusPublisher::new(
        store.clone(),
        profiles(StaticFetcher::new().with_page("111", offline_profile("Alice"))),
        transport.clone(),
    ));
    let bus = EventBus::new();

    let handle = spawn_status_publish_task(publisher, Duration::from_millis(20), bus.shutdown_rx.clone());
    tokio::time::sleep(Duration::from_millis(150)).await;
    bus.shutdown();

    timeout(Duration::from_millis(500), handle)
        .await
        .expect("task should stop promptly")
        .expect("task should not panic");

    assert!(transport.attempts() >= 3, "only {} attempt(s)", transport.attempts());
    assert!(transport.sent().is_empty());
    assert_eq!(store.message_id().await, None);
}
