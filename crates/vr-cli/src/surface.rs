// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Terminal re-authentication surfaces

#![allow(clippy::disallowed_methods)] // prompts go to stderr

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use crossterm::style::Stylize;
use tokio::sync::Mutex;
use vr_credentials::{CredentialStore, ReauthSurface};

/// Prompts on stderr and stores the token read from stdin
///
/// Prompts are taken one at a time; a prompt queued behind one that already
/// produced a new token is skipped.
pub struct TerminalSurface {
    store: Arc<CredentialStore>,
    create_token_url: String,
    prompt: Mutex<()>,
}

impl TerminalSurface {
    pub fn new(store: Arc<CredentialStore>, create_token_url: impl Into<String>) -> Self {
        Self {
            store,
            create_token_url: create_token_url.into(),
            prompt: Mutex::new(()),
        }
    }
}

#[async_trait]
impl ReauthSurface for TerminalSurface {
    async fn show(&self, notice: &str) {
        let rejected = self.store.get_token();
        let _prompt = self.prompt.lock().await;
        if self.store.get_token() != rejected {
            return;
        }

        if !notice.is_empty() {
            eprintln!("{}", notice.yellow().bold());
        }
        eprintln!("Create an access token at {}", self.create_token_url);
        eprint!("Token: ");
        let _ = std::io::stderr().flush();

        let line = tokio::task::spawn_blocking(|| {
            let mut buf = String::new();
            std::io::stdin().read_line(&mut buf).map(|_| buf)
        })
        .await;

        let token = match line {
            Ok(Ok(buf)) => buf.trim().to_string(),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "failed to read token from stdin");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "token prompt task failed");
                return;
            }
        };

        if token.is_empty() {
            eprintln!("No token entered; the request resumes when the re-authentication wait expires");
            return;
        }

        if let Err(e) = self.store.set_token(&token).await {
            tracing::warn!(error = %e, "failed to persist token");
        }
    }

    async fn token_changed(&self, _token: &str) {
        eprintln!("{}", "Token updated".green());
    }
}

/// Prints the notice only; used with `--no-prompt` or without a terminal
pub struct NoticeSurface;

#[async_trait]
impl ReauthSurface for NoticeSurface {
    async fn show(&self, notice: &str) {
        if !notice.is_empty() {
            eprintln!("{}", notice.yellow().bold());
        }
        eprintln!("Run `vr token set` to store an access token");
    }
}
