// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use vr_credentials::{AuthenticationView, CredentialStore, CredentialsConfig, MemoryStateStore, ReauthSurface};
use vr_http::test_utils::ScriptedTransport;
use vr_rest_client::{FetchClient, FetchError, Params, ResponseData, ResponseFormat, REAUTH_NOTICE};

/// Surface that records prompts and optionally "types in" a replacement token
struct TestSurface {
    store: Arc<CredentialStore>,
    replacement: Option<String>,
    shows: AtomicUsize,
}

#[async_trait]
impl ReauthSurface for TestSurface {
    async fn show(&self, notice: &str) {
        assert_eq!(notice, REAUTH_NOTICE);
        self.shows.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = self.replacement.clone() {
            let store = Arc::clone(&self.store);
            tokio::spawn(async move { store.set_token(&token).await.unwrap() });
        }
    }
}

struct Fixture {
    transport: Arc<ScriptedTransport>,
    store: Arc<CredentialStore>,
    surface: Arc<TestSurface>,
    client: FetchClient,
}

async fn fixture(transport: ScriptedTransport, replacement: Option<&str>) -> Fixture {
    let transport = Arc::new(transport);
    let store = Arc::new(
        CredentialStore::open(
            CredentialsConfig::default(),
            Arc::new(MemoryStateStore::new()),
            transport.clone(),
        )
        .await
        .unwrap(),
    );
    let surface = Arc::new(TestSurface {
        store: Arc::clone(&store),
        replacement: replacement.map(str::to_string),
        shows: AtomicUsize::new(0),
    });
    let view = Arc::new(AuthenticationView::new(Arc::clone(&store), surface.clone()));
    let client = FetchClient::new(
        "https://api.example.test/api/v5",
        transport.clone(),
        Arc::clone(&store),
        view,
    );
    Fixture {
        transport,
        store,
        surface,
        client,
    }
}

fn repo_params() -> Params {
    Params::new().with("owner", "o").with("repo", "r")
}

#[tokio::test]
async fn test_identical_concurrent_requests_share_one_call() {
    let transport = ScriptedTransport::new().with_latency(Duration::from_millis(50));
    transport.respond_json("/repos/o/r", 200, json!({"default_branch": "main"}));
    let f = fixture(transport, None).await;

    let (first, second) = futures::join!(
        f.client.get("/repos/:owner/:repo", repo_params()),
        f.client.get("/repos/:owner/:repo", repo_params()),
    );

    assert_eq!(f.transport.request_count("/repos/o/r"), 1);
    assert_eq!(first.unwrap().data, second.unwrap().data);
}

#[tokio::test]
async fn test_different_formats_are_not_coalesced() {
    let transport = ScriptedTransport::new().with_latency(Duration::from_millis(20));
    transport.respond("/raw/README.md", 200, "# readme");
    let f = fixture(transport, None).await;

    let route = "/repos/:owner/:repo/raw/README.md";
    let (json, text) = futures::join!(
        f.client.get(route, repo_params()),
        f.client.get(route, repo_params().format(ResponseFormat::Text)),
    );

    assert!(matches!(json, Err(FetchError::Decode(_))));
    assert_eq!(text.unwrap().data, ResponseData::Text("# readme".into()));
    assert_eq!(f.transport.request_count("/raw/README.md"), 2);
}

#[tokio::test]
async fn test_unauthorized_retries_once_with_new_token() {
    let transport = ScriptedTransport::new();
    transport
        .respond_json("/repos/o/r", 401, json!({"message": "401 Unauthorized"}))
        .respond_json("/repos/o/r", 200, json!({"default_branch": "main"}));
    let f = fixture(transport, Some("fresh")).await;

    let response = f.client.get("/repos/:owner/:repo", repo_params()).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(f.surface.shows.load(Ordering::SeqCst), 1);
    assert_eq!(f.store.get_token(), "fresh");

    let requests = f.transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].header("authorization"), None);
    assert_eq!(requests[1].header("authorization"), Some("Bearer fresh"));
}

#[tokio::test]
async fn test_forbidden_also_triggers_reauthentication() {
    let transport = ScriptedTransport::new();
    transport
        .respond_json("/repos/o/r", 403, json!({"message": "rate limit exceeded"}))
        .respond_json("/repos/o/r", 200, json!({}));
    let f = fixture(transport, Some("other")).await;

    assert!(f.client.get("/repos/:owner/:repo", repo_params()).await.is_ok());
    assert_eq!(f.surface.shows.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_second_auth_failure_is_terminal() {
    let transport = ScriptedTransport::new();
    transport.respond_json("/repos/o/r", 401, json!({"message": "401 Unauthorized"}));
    let f = fixture(transport, None).await;

    let error = f.client.get("/repos/:owner/:repo", repo_params()).await.unwrap_err();

    assert_eq!(error.status(), Some(401));
    assert_eq!(f.surface.shows.load(Ordering::SeqCst), 1);
    assert_eq!(f.transport.request_count("/repos/o/r"), 2);
}

#[tokio::test]
async fn test_not_found_propagates_without_prompt() {
    let transport = ScriptedTransport::new();
    transport.respond_json("/repos/o/missing", 404, json!({"message": "Not Found"}));
    let f = fixture(transport, Some("unused")).await;

    let error = f
        .client
        .get("/repos/:owner/:repo", Params::new().with("owner", "o").with("repo", "missing"))
        .await
        .unwrap_err();

    assert_eq!(error.status(), Some(404));
    assert_eq!(f.surface.shows.load(Ordering::SeqCst), 0);
    assert_eq!(f.transport.request_count("/repos/o/missing"), 1);
}

#[tokio::test]
async fn test_network_failure_propagates_without_prompt() {
    let transport = ScriptedTransport::new();
    transport.fail("/repos/o/r", "connection reset");
    let f = fixture(transport, Some("unused")).await;

    let error = f.client.get("/repos/:owner/:repo", repo_params()).await.unwrap_err();

    assert!(matches!(error, FetchError::Transport(_)));
    assert_eq!(f.surface.shows.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_headers_follow_token_and_format() {
    let transport = ScriptedTransport::new();
    transport.respond("/raw/a.txt", 200, "hello");
    let f = fixture(transport, None).await;
    f.store.set_token("stored").await.unwrap();

    let response = f
        .client
        .get(
            "/repos/:owner/:repo/raw/:path",
            repo_params().with("path", "a.txt").with("ref", "main").format(ResponseFormat::Text),
        )
        .await
        .unwrap();
    assert_eq!(response.data, ResponseData::Text("hello".into()));

    let request = &f.transport.requests()[0];
    assert_eq!(request.url.as_str(), "https://api.example.test/api/v5/repos/o/r/raw/a.txt?ref=main");
    assert_eq!(request.header("accept"), Some("text/plain"));
    assert_eq!(request.header("authorization"), Some("Bearer stored"));
}
