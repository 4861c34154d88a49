mod common;

use common::{shared, RecordingTransport};
use futures::future::join_all;
use restie::{ClientConfig, PreparedRequest, Restie, RestieError};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn client(config: ClientConfig, transport: RecordingTransport) -> (Restie, Arc<RecordingTransport>) {
    let (recording, transport) = shared(transport);
    let api = Restie::with_transport("http://api", config, transport).unwrap();
    (api, recording)
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_calls_share_one_transport_call() {
    common::init_tracing();
    let (api, transport) = client(
        ClientConfig {
            cache: true,
            ..Default::default()
        },
        RecordingTransport::numbered().with_delay(Duration::from_millis(50)),
    );

    let users = api.collection("users");
    let results = join_all((0..8).map(|_| users.get_all().param("page", 1).send())).await;

    assert_eq!(transport.call_count(), 1);
    for result in results {
        assert_eq!(result.unwrap().data(), &json!({"call": 1}));
    }
}

#[tokio::test(start_paused = true)]
async fn test_distinct_keys_are_not_shared() {
    let (api, transport) = client(
        ClientConfig {
            cache: true,
            ..Default::default()
        },
        RecordingTransport::numbered().with_delay(Duration::from_millis(10)),
    );

    let users = api.collection("users");
    let (a, b, c) = tokio::join!(
        users.get().path(1).send(),
        users.get().path(2).send(),
        users.post().send(),
    );
    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_no_stale_reuse_without_ttl() {
    let (api, transport) = client(
        ClientConfig {
            cache: true,
            ..Default::default()
        },
        RecordingTransport::numbered(),
    );

    let users = api.collection("users");
    let first = users.get_all().await.unwrap();
    let second = users.get_all().await.unwrap();

    assert_eq!(transport.call_count(), 2);
    assert_eq!(first.data(), &json!({"call": 1}));
    assert_eq!(second.data(), &json!({"call": 2}));
}

#[tokio::test(start_paused = true)]
async fn test_ttl_reuse_within_window_and_refresh_after() {
    let (api, transport) = client(
        ClientConfig {
            cache_ttl: Some(Duration::from_secs(5)),
            ..Default::default()
        },
        RecordingTransport::numbered(),
    );

    let users = api.collection("users");
    let first = users.get_all().await.unwrap();
    assert!(first.cache_meta().is_none());

    tokio::time::advance(Duration::from_secs(4)).await;
    let cached = users.get_all().await.unwrap();
    assert_eq!(transport.call_count(), 1);
    assert_eq!(cached.data(), &json!({"call": 1}));
    assert_eq!(
        cached.cache_meta().map(|m| m.key.as_str()),
        Some("GET:http://api/users")
    );

    tokio::time::advance(Duration::from_secs(2)).await;
    let refreshed = users.get_all().await.unwrap();
    assert_eq!(transport.call_count(), 2);
    assert_eq!(refreshed.data(), &json!({"call": 2}));
}

#[tokio::test(start_paused = true)]
async fn test_failures_are_shared_and_not_cached() {
    let (api, transport) = client(
        ClientConfig {
            cache_ttl: Some(Duration::from_secs(60)),
            ..Default::default()
        },
        RecordingTransport::json(503, json!({"retry": true})).with_delay(Duration::from_millis(20)),
    );

    let users = api.collection("users");
    let (a, b) = tokio::join!(users.get_all().send(), users.get_all().send());
    for result in [a, b] {
        match result {
            Err(RestieError::Status { status, .. }) => assert_eq!(status, 503),
            other => panic!("expected a status error, got {other:?}"),
        }
    }
    assert_eq!(transport.call_count(), 1);

    users.get_all().await.unwrap_err();
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_custom_cache_key() {
    let (api, transport) = client(
        ClientConfig {
            cache: true,
            // Ignore the query string.
            cache_by: Some(Arc::new(|prepared: &PreparedRequest| prepared.options.url.clone())),
            ..Default::default()
        },
        RecordingTransport::numbered().with_delay(Duration::from_millis(10)),
    );

    let users = api.collection("users");
    let (a, b) = tokio::join!(
        users.get_all().param("page", 1).send(),
        users.get_all().param("page", 2).send(),
    );
    assert_eq!(a.unwrap().data(), b.unwrap().data());
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_immutable_cached_results_stay_frozen() {
    let (api, transport) = client(
        ClientConfig {
            immutable: true,
            cache_ttl: Some(Duration::from_secs(1)),
            ..Default::default()
        },
        RecordingTransport::numbered(),
    );

    let users = api.collection("users");
    users.get_all().await.unwrap();
    let cached = users.get_all().await.unwrap();

    assert_eq!(transport.call_count(), 1);
    assert!(cached.is_frozen());
    assert!(cached.cache_meta().is_some());
}
