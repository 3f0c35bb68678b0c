// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;
use vr_credentials::{CredentialStore, CredentialsConfig, MemoryStateStore};
use vr_http::test_utils::ScriptedTransport;

async fn open_store(transport: Arc<ScriptedTransport>) -> CredentialStore {
    CredentialStore::open(
        CredentialsConfig::default(),
        Arc::new(MemoryStateStore::new()),
        transport,
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_subscribers_fire_once_per_change() {
    let store = open_store(Arc::new(ScriptedTransport::new())).await;
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&seen);
    let _subscription = store.subscribe(move |token| sink.lock().unwrap().push(token.to_string()));

    store.set_token("a").await.unwrap();
    store.set_token("a").await.unwrap();
    store.set_token("b").await.unwrap();
    store.set_token("").await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["a", "b", ""]);
}

#[tokio::test]
async fn test_dropped_subscription_stops_notifications() {
    let store = open_store(Arc::new(ScriptedTransport::new())).await;
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&calls);
    let subscription = store.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(store.subscriber_count(), 1);

    store.set_token("first").await.unwrap();
    subscription.unsubscribe();
    assert_eq!(store.subscriber_count(), 0);

    store.set_token("second").await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_validate_without_token_skips_network() {
    let transport = Arc::new(ScriptedTransport::new());
    let store = open_store(transport.clone()).await;

    assert_eq!(store.validate_token(None).await, None);
    assert_eq!(store.validate_token(Some("")).await, None);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_validate_rejected_token() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond_json("/user", 401, json!({"message": "401 Unauthorized"}));
    let store = open_store(transport.clone()).await;

    assert_eq!(store.validate_token(Some("bad")).await, None);
    assert_eq!(transport.request_count("/user"), 1);
}

#[tokio::test]
async fn test_validate_network_failure() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.fail("/user", "connection refused");
    let store = open_store(transport).await;

    assert_eq!(store.validate_token(Some("tok")).await, None);
}

#[tokio::test]
async fn test_validate_reports_identity_and_rate_limit() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond_with_headers(
        "/user",
        200,
        json!({
            "login": "octo",
            "avatar_url": "https://cdn.example/octo.png",
            "html_url": "https://gitcode.com/octo"
        })
        .to_string(),
        &[("x-ratelimit-limit", "5000"), ("x-ratelimit-remaining", "4999")],
    );
    let store = open_store(transport.clone()).await;
    store.set_token("stored").await.unwrap();

    let result = store.validate_token(None).await.unwrap();
    assert_eq!(result.username, "octo");
    assert_eq!(result.profile_url.as_deref(), Some("https://gitcode.com/octo"));
    let rate_limit = result.rate_limit.unwrap();
    assert_eq!(rate_limit.limit, Some(5000));
    assert_eq!(rate_limit.remaining, Some(4999));
    assert_eq!(rate_limit.reset, None);

    let request = &transport.requests()[0];
    assert_eq!(request.header("authorization"), Some("token stored"));
}
