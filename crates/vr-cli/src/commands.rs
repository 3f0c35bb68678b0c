// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Subcommand execution

use anyhow::{anyhow, Result};
use serde::Serialize;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use vr_credentials::{SurfaceMessage, SurfaceReply};
use vr_domain_types::{CodeReviewsQueryOptions, CommitsQueryOptions, CommonQueryOptions};
use vr_logging::redact;

use crate::services::Services;
use crate::{render, Commands, PageArgs, TokenCommands};

/// What a command produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Text(String),
    Bytes(Vec<u8>),
}

impl Output {
    fn render<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> Result<Self> {
        if json {
            Ok(Output::Text(format!("{}\n", serde_json::to_string_pretty(value)?)))
        } else {
            Ok(Output::Text(text(value)))
        }
    }
}

impl From<&PageArgs> for CommonQueryOptions {
    fn from(args: &PageArgs) -> Self {
        CommonQueryOptions {
            page: args.page,
            page_size: args.per_page,
        }
    }
}

/// Run one command against the wired services
pub async fn execute(command: Commands, services: &Services, json: bool) -> Result<Output> {
    let source = &services.data_source;

    match command {
        Commands::Parse { path } => {
            let state = services.router.parse_path(&path).await;
            let link = services.router.external_link_for(&path);
            if json {
                let payload = json!({ "state": state, "link": link });
                return Ok(Output::Text(format!("{}\n", serde_json::to_string_pretty(&payload)?)));
            }
            Ok(Output::Text(render::router_state(&state, &link)))
        }
        Commands::Ls { repo, ref_path } => {
            let repo = services.repository(repo.repo.as_deref()).await?;
            let (git_ref, path) = resolve_ref_path(services, &repo, &ref_path).await;
            let directory = source
                .provide_directory(&repo, &git_ref, &path)
                .await
                .ok_or_else(|| anyhow!("'{}' is not a directory at {}", path, git_ref))?;
            Output::render(json, &directory, render::directory)
        }
        Commands::Cat { repo, ref_path } => {
            let repo = services.repository(repo.repo.as_deref()).await?;
            let (git_ref, path) = resolve_ref_path(services, &repo, &ref_path).await;
            let content = source.provide_file(&repo, &git_ref, &path).await?;
            if json {
                let payload = json!({
                    "ref": git_ref,
                    "path": path,
                    "size": content.len(),
                    "text": String::from_utf8_lossy(&content.bytes),
                });
                return Ok(Output::Text(format!("{}\n", serde_json::to_string_pretty(&payload)?)));
            }
            Ok(Output::Bytes(content.bytes))
        }
        Commands::Branches { repo, page } => {
            let repo = services.repository(repo.repo.as_deref()).await?;
            let branches = source.provide_branches(&repo, &(&page).into()).await;
            Output::render(json, &branches, |b| render::refs(b))
        }
        Commands::Tags { repo, page } => {
            let repo = services.repository(repo.repo.as_deref()).await?;
            let tags = source.provide_tags(&repo, &(&page).into()).await;
            Output::render(json, &tags, |t| render::refs(t))
        }
        Commands::Commits {
            repo,
            page,
            git_ref,
            path,
            author,
        } => {
            let repo = services.repository(repo.repo.as_deref()).await?;
            let options = CommitsQueryOptions {
                page: page.page,
                page_size: page.per_page,
                from: git_ref,
                path,
                author,
            };
            let commits = source.provide_commits(&repo, &options).await;
            Output::render(json, &commits, |c| render::commits(c))
        }
        Commands::Commit { repo, sha, files } => {
            let repo = services.repository(repo.repo.as_deref()).await?;
            let commit = source
                .provide_commit(&repo, &sha)
                .await
                .ok_or_else(|| anyhow!("commit '{}' not found in {}", sha, repo))?;
            let changed = if files {
                source
                    .provide_commit_changed_files(&repo, &sha, &CommonQueryOptions::default())
                    .await
            } else {
                Vec::new()
            };
            if json {
                let payload = json!({ "commit": commit, "files": changed });
                return Ok(Output::Text(format!("{}\n", serde_json::to_string_pretty(&payload)?)));
            }
            Ok(Output::Text(render::commit(&commit, &changed)))
        }
        Commands::Reviews {
            repo,
            page,
            state,
            creator,
        } => {
            let repo = services.repository(repo.repo.as_deref()).await?;
            let options = CodeReviewsQueryOptions {
                page: page.page,
                page_size: page.per_page,
                state: state.map(Into::into),
                creator,
            };
            let reviews = source.provide_code_reviews(&repo, &options).await;
            Output::render(json, &reviews, |r| render::reviews(r))
        }
        Commands::Review { repo, id, files } => {
            let repo = services.repository(repo.repo.as_deref()).await?;
            let review = source
                .provide_code_review(&repo, &id)
                .await
                .ok_or_else(|| anyhow!("code review '{}' not found in {}", id, repo))?;
            let changed = if files {
                source
                    .provide_code_review_changed_files(&repo, &id, &CommonQueryOptions::default())
                    .await
            } else {
                Vec::new()
            };
            if json {
                let payload = json!({ "review": review, "files": changed });
                return Ok(Output::Text(format!("{}\n", serde_json::to_string_pretty(&payload)?)));
            }
            Ok(Output::Text(render::review(&review, &changed)))
        }
        Commands::Token { command } => token(command, services, json).await,
    }
}

async fn token(command: TokenCommands, services: &Services, json: bool) -> Result<Output> {
    match command {
        TokenCommands::Set { token } => {
            let token = match token {
                Some(token) => token,
                None => read_stdin_line().await?,
            };
            let cleared = token.is_empty();
            services
                .auth_view
                .handle_message(SurfaceMessage::SetToken(Some(token)))
                .await?;
            tracing::info!(cleared, "token updated from the command line");
            Ok(Output::Text(if cleared {
                "token cleared\n".to_string()
            } else {
                "token stored\n".to_string()
            }))
        }
        TokenCommands::Show { reveal } => {
            let SurfaceReply::Token(token) =
                services.auth_view.handle_message(SurfaceMessage::GetToken).await?
            else {
                return Err(anyhow!("unexpected reply to a token request"));
            };
            let shown = match (token.is_empty(), reveal) {
                (true, _) => None,
                (false, true) => Some(token),
                (false, false) => Some(redact(&token).to_string()),
            };
            if json {
                let payload = json!({ "stored": shown.is_some(), "token": shown });
                return Ok(Output::Text(format!("{}\n", serde_json::to_string_pretty(&payload)?)));
            }
            Ok(Output::Text(match shown {
                Some(token) => format!("{}\n", token),
                None => "no token stored\n".to_string(),
            }))
        }
        TokenCommands::Validate { token } => {
            let SurfaceReply::Validation(result) = services
                .auth_view
                .handle_message(SurfaceMessage::ValidateToken(token))
                .await?
            else {
                return Err(anyhow!("unexpected reply to a validation request"));
            };
            Output::render(json, &result, |r| render::validation(r.as_ref()))
        }
    }
}

/// Split `ref_path` into ref and path; empty means the default branch root
async fn resolve_ref_path(
    services: &Services,
    repo: &vr_domain_types::RepositoryIdentity,
    ref_path: &str,
) -> (String, String) {
    let ref_path = ref_path.trim_matches('/');
    if ref_path.is_empty() {
        let branch = services.data_source.get_default_branch(repo).await;
        return (branch, String::new());
    }
    let resolved = services.data_source.extract_ref_path(repo, ref_path).await;
    (resolved.git_ref, resolved.path)
}

async fn read_stdin_line() -> Result<String> {
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(line.trim().to_string())
}
