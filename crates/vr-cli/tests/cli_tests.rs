// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::sync::Arc;

use serde_json::json;
use vr_cli::commands::{execute, Output};
use vr_cli::services::{PromptMode, Services, StaticLocation};
use vr_cli::{Cli, Commands, Parser, ReviewStateArg, TokenCommands};
use vr_config::Settings;
use vr_credentials::{MemoryStateStore, StateStore};
use vr_http::test_utils::ScriptedTransport;
use vr_logging::CliLogLevel;

async fn services(transport: Arc<ScriptedTransport>) -> Services {
    services_with_state(transport, Arc::new(MemoryStateStore::new())).await
}

async fn services_with_state(transport: Arc<ScriptedTransport>, state: Arc<dyn StateStore>) -> Services {
    Services::assemble(Settings::default(), transport, state, PromptMode::Never)
        .await
        .unwrap()
}

fn text(output: Output) -> String {
    match output {
        Output::Text(text) => text,
        Output::Bytes(bytes) => String::from_utf8(bytes).unwrap(),
    }
}

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("vr").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = parse(&[
        "ls",
        "-r",
        "o/r",
        "release/2.0/src",
        "--json",
        "--set",
        "provider.listing=tree",
        "--set",
        "api.timeout_secs=5",
        "--log-level",
        "debug",
    ]);

    assert!(cli.json);
    assert_eq!(cli.overrides, vec!["provider.listing=tree", "api.timeout_secs=5"]);
    assert_eq!(cli.logging.log_level, Some(CliLogLevel::Debug));
    match cli.command {
        Commands::Ls { repo, ref_path } => {
            assert_eq!(repo.repo.as_deref(), Some("o/r"));
            assert_eq!(ref_path, "release/2.0/src");
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_ls_defaults_to_empty_ref_path() {
    let cli = parse(&["ls"]);
    match cli.command {
        Commands::Ls { repo, ref_path } => {
            assert!(repo.repo.is_none());
            assert!(ref_path.is_empty());
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_review_and_token_subcommands() {
    let cli = parse(&["reviews", "--state", "merged", "--creator", "alice", "--per-page", "5"]);
    match cli.command {
        Commands::Reviews { state, creator, page, .. } => {
            assert_eq!(state, Some(ReviewStateArg::Merged));
            assert_eq!(creator.as_deref(), Some("alice"));
            assert_eq!(page.per_page, Some(5));
        }
        other => panic!("unexpected command: {:?}", other),
    }

    let cli = parse(&["token", "show", "--reveal"]);
    assert!(matches!(
        cli.command,
        Commands::Token {
            command: TokenCommands::Show { reveal: true }
        }
    ));
}

#[test]
fn test_browser_url_flag() {
    let cli = parse(&["branches", "--url", "https://gitcode.com/o/r/tree/main"]);
    assert_eq!(cli.url.as_deref(), Some("https://gitcode.com/o/r/tree/main"));
}

#[test]
fn test_cat_requires_ref_path() {
    assert!(Cli::try_parse_from(["vr", "cat"]).is_err());
}

#[tokio::test]
async fn test_parse_resolves_ref_through_provider() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond_json("/repos/o/r/branches", 200, json!([{"name": "feature/x"}]));
    transport.respond_json("/repos/o/r/tags", 200, json!([]));
    let services = services(transport).await;

    let command = Commands::Parse {
        path: "/gitcode/o/r/blob/feature/x/src/lib.rs#L4-L9".to_string(),
    };
    let output = text(execute(command, &services, false).await.unwrap());

    assert!(output.contains("page:   blob"));
    assert!(output.contains("ref:    feature/x"));
    assert!(output.contains("path:   src/lib.rs"));
    assert!(output.contains("lines:  4-9"));
    assert!(output.contains("link:   https://gitcode.com/o/r/blob/feature/x/src/lib.rs"));
}

#[tokio::test]
async fn test_parse_json_output() {
    let transport = Arc::new(ScriptedTransport::new());
    let services = services(transport).await;

    let command = Commands::Parse {
        path: "/gitcode/o/r/commit/abc123".to_string(),
    };
    let output = text(execute(command, &services, true).await.unwrap());
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(value["state"]["pageType"], "Commit");
    assert_eq!(value["state"]["commitSha"], "abc123");
    assert_eq!(value["link"], "https://gitcode.com/o/r/commit/abc123");
}

#[tokio::test]
async fn test_ls_uses_default_branch_for_empty_path() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond_json("/repos/o/r", 200, json!({"default_branch": "dev"}));
    transport.respond_json(
        "/repos/o/r/contents",
        200,
        json!([
            {"type": "dir", "path": "src"},
            {"type": "file", "path": "README.md", "size": 12}
        ]),
    );
    let services = services(Arc::clone(&transport)).await;

    let command = Commands::Ls {
        repo: vr_cli::RepoArgs {
            repo: Some("o/r".to_string()),
        },
        ref_path: String::new(),
    };
    let output = text(execute(command, &services, false).await.unwrap());

    assert!(output.contains("src/"));
    assert!(output.contains("README.md"));
    let listing = transport
        .requests()
        .into_iter()
        .find(|r| r.url.path().ends_with("/contents"))
        .unwrap();
    assert!(listing.url.query().unwrap_or_default().contains("ref=dev"));
}

#[tokio::test]
async fn test_cat_decodes_file_bytes() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond_json("/repos/o/r/branches", 200, json!([{"name": "main"}]));
    transport.respond_json("/repos/o/r/tags", 200, json!([]));
    transport.respond_json(
        "/repos/o/r/contents/README.md",
        200,
        json!({"type": "file", "encoding": "base64", "content": "aGVsbG8K"}),
    );
    let services = services(transport).await;

    let command = Commands::Cat {
        repo: vr_cli::RepoArgs {
            repo: Some("o/r".to_string()),
        },
        ref_path: "main/README.md".to_string(),
    };
    let output = execute(command, &services, false).await.unwrap();

    assert_eq!(output, Output::Bytes(b"hello\n".to_vec()));
}

#[tokio::test]
async fn test_missing_commit_is_an_error() {
    let transport = Arc::new(ScriptedTransport::new());
    let services = services(transport).await;

    let command = Commands::Commit {
        repo: vr_cli::RepoArgs {
            repo: Some("o/r".to_string()),
        },
        sha: "deadbeef".to_string(),
        files: false,
    };
    let err = execute(command, &services, false).await.unwrap_err();
    assert!(err.to_string().contains("deadbeef"));
}

#[tokio::test]
async fn test_invalid_repo_flag_is_rejected() {
    let transport = Arc::new(ScriptedTransport::new());
    let services = services(transport).await;

    let command = Commands::Branches {
        repo: vr_cli::RepoArgs {
            repo: Some("not-a-repo".to_string()),
        },
        page: Default::default(),
    };
    assert!(execute(command, &services, false).await.is_err());
}

#[tokio::test]
async fn test_unauthorized_without_prompt_retries_once_and_degrades() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond_json("/repos/o/r/branches", 401, json!({"message": "Unauthorized"}));
    let services = services(Arc::clone(&transport)).await;

    let command = Commands::Branches {
        repo: vr_cli::RepoArgs {
            repo: Some("o/r".to_string()),
        },
        page: Default::default(),
    };
    let output = text(execute(command, &services, true).await.unwrap());

    assert_eq!(output.trim(), "[]");
    assert_eq!(transport.request_count("/repos/o/r/branches"), 2);
}

#[tokio::test]
async fn test_token_set_show_and_clear() {
    let transport = Arc::new(ScriptedTransport::new());
    let state = Arc::new(MemoryStateStore::new());
    let services = services_with_state(transport, state.clone()).await;

    let set = TokenCommands::Set {
        token: Some("secret".to_string()),
    };
    let output = text(execute(Commands::Token { command: set }, &services, false).await.unwrap());
    assert_eq!(output, "token stored\n");
    assert_eq!(
        state.get("gitcode-oauth-token").await.unwrap().as_deref(),
        Some("secret")
    );

    let show = TokenCommands::Show { reveal: false };
    let output = text(execute(Commands::Token { command: show }, &services, false).await.unwrap());
    assert_eq!(output, "[REDACTED]\n");

    let show = TokenCommands::Show { reveal: true };
    let output = text(execute(Commands::Token { command: show }, &services, false).await.unwrap());
    assert_eq!(output, "secret\n");

    let clear = TokenCommands::Set {
        token: Some(String::new()),
    };
    let output = text(execute(Commands::Token { command: clear }, &services, false).await.unwrap());
    assert_eq!(output, "token cleared\n");

    let show = TokenCommands::Show { reveal: true };
    let output = text(execute(Commands::Token { command: show }, &services, true).await.unwrap());
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["stored"], false);
}

#[tokio::test]
async fn test_token_validate_reports_identity() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond_with_headers(
        "/user",
        200,
        json!({"login": "alice"}).to_string(),
        &[("x-ratelimit-limit", "60"), ("x-ratelimit-remaining", "59")],
    );
    let services = services(transport).await;

    let validate = TokenCommands::Validate {
        token: Some("candidate".to_string()),
    };
    let output = text(execute(Commands::Token { command: validate }, &services, false).await.unwrap());

    assert!(output.contains("valid token for alice"));
    assert!(output.contains("rate limit: 59/60 remaining"));
}

#[tokio::test]
async fn test_repository_taken_from_browser_url() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond_json("/repos/web/site/tags", 200, json!([{"name": "v1", "commit": {"sha": "abc"}}]));
    transport.respond_json("/repos/o/r/tags", 200, json!([{"name": "v9", "commit": {"sha": "def"}}]));
    let services = services(Arc::clone(&transport))
        .await
        .with_location(Arc::new(StaticLocation("https://gitcode.com/web/site/tree/main".to_string())));

    let tags = Commands::Tags {
        repo: vr_cli::RepoArgs::default(),
        page: Default::default(),
    };
    let output = text(execute(tags, &services, false).await.unwrap());
    assert!(output.contains("v1"));

    let explicit = Commands::Tags {
        repo: vr_cli::RepoArgs {
            repo: Some("o/r".to_string()),
        },
        page: Default::default(),
    };
    let output = text(execute(explicit, &services, false).await.unwrap());
    assert!(output.contains("v9"));
    assert_eq!(transport.request_count("/repos/web/site/tags"), 1);
}

#[tokio::test]
async fn test_repository_defaults_without_browser_url() {
    let transport = Arc::new(ScriptedTransport::new());
    let services = services(transport).await;

    let repo = services.repository(None).await.unwrap();
    assert_eq!(repo.full_name(), "gitcode/gitcode");
}
