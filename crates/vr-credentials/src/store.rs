// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! The process-wide credential store

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, RwLock, Weak};

use serde::Deserialize;
use vr_http::{HeaderValue, HttpRequest, HttpResponse, HttpTransport, StatusCode, Url};

use crate::config::CredentialsConfig;
use crate::error::Result;
use crate::storage::{FileStateStore, StateStore};
use crate::types::{RateLimit, ValidateResult};

type Listener = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    by_id: BTreeMap<u64, Listener>,
}

/// Handle returned by [`CredentialStore::subscribe`]
///
/// The callback stays registered until this handle is dropped or
/// [`Subscription::unsubscribe`] is called.
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.lock().unwrap().by_id.remove(&self.id);
        }
    }
}

/// Owns the single stored bearer token
///
/// Reads are served from memory and always reflect the last completed write;
/// writes go through [`CredentialStore::set_token`] only.
pub struct CredentialStore {
    state: Arc<dyn StateStore>,
    transport: Arc<dyn HttpTransport>,
    config: CredentialsConfig,
    token: RwLock<String>,
    listeners: Arc<Mutex<Listeners>>,
    write_lock: tokio::sync::Mutex<()>,
}

impl CredentialStore {
    /// Open the store, loading any previously persisted token
    pub async fn open(
        config: CredentialsConfig,
        state: Arc<dyn StateStore>,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let token = state.get(&config.token_state_key).await?.unwrap_or_default();
        tracing::debug!(has_token = !token.is_empty(), "credential store opened");
        Ok(Self {
            state,
            transport,
            config,
            token: RwLock::new(token),
            listeners: Arc::new(Mutex::new(Listeners::default())),
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Open the store backed by `state.toml` in the configured state directory
    pub async fn open_default(
        config: CredentialsConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let state = Arc::new(FileStateStore::new(config.state_file()));
        Self::open(config, state, transport).await
    }

    pub fn config(&self) -> &CredentialsConfig {
        &self.config
    }

    /// Current token; empty when unset
    pub fn get_token(&self) -> String {
        self.token.read().unwrap().clone()
    }

    /// Replace the token
    ///
    /// Subscribers are notified once, after the write is persisted, and only
    /// when the value actually changed.
    pub async fn set_token(&self, token: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let changed = *self.token.read().unwrap() != token;
        self.state.update(&self.config.token_state_key, token).await?;
        *self.token.write().unwrap() = token.to_string();

        if changed {
            tracing::info!(has_token = !token.is_empty(), "credential token changed");
            self.notify(token);
        }
        Ok(())
    }

    /// Register a callback fired with the new token on every change
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let mut listeners = self.listeners.lock().unwrap();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.by_id.insert(id, Arc::new(callback));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.lock().unwrap().by_id.len()
    }

    fn notify(&self, token: &str) {
        // Snapshot so callbacks may subscribe or unsubscribe without deadlocking
        let snapshot: Vec<Listener> = self.listeners.lock().unwrap().by_id.values().cloned().collect();
        for listener in snapshot {
            listener(token);
        }
    }

    /// Check a token (or the stored one) against the identity endpoint
    ///
    /// Returns `None` for a missing token, a rejected token, or any failure
    /// to reach or understand the provider.
    pub async fn validate_token(&self, token: Option<&str>) -> Option<ValidateResult> {
        let token = match token {
            Some(token) => token.to_string(),
            None => self.get_token(),
        };
        if token.is_empty() {
            return None;
        }

        let url = match Url::parse(&self.config.identity_url()) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, "invalid identity endpoint");
                return None;
            }
        };
        let mut request = HttpRequest::get(url);
        let header = match format!("token {}", token).parse::<HeaderValue>() {
            Ok(header) => header,
            Err(_) => return None,
        };
        request.headers.insert("authorization", header);
        request.headers.insert("accept", HeaderValue::from_static("application/json"));

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(error = %e, "token validation failed to reach provider");
                return None;
            }
        };

        if response.status == StatusCode::UNAUTHORIZED {
            tracing::debug!("token rejected");
            return None;
        }
        if !response.status.is_success() {
            tracing::debug!(status = %response.status, "identity endpoint error");
            return None;
        }

        parse_identity(&response)
    }
}

#[derive(Deserialize)]
struct IdentityPayload {
    login: Option<String>,
    username: Option<String>,
    avatar_url: Option<String>,
    html_url: Option<String>,
}

fn parse_identity(response: &HttpResponse) -> Option<ValidateResult> {
    let payload: IdentityPayload = match serde_json::from_slice(&response.body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!(error = %e, "unreadable identity payload");
            return None;
        }
    };

    let rate_limit = rate_limit_from_headers(response);
    Some(ValidateResult {
        username: payload.login.or(payload.username).unwrap_or_default(),
        avatar_url: payload.avatar_url,
        profile_url: payload.html_url,
        rate_limit: (!rate_limit.is_empty()).then_some(rate_limit),
    })
}

fn rate_limit_from_headers(response: &HttpResponse) -> RateLimit {
    let number = |name: &str| response.header(name).and_then(|v| v.trim().parse::<u64>().ok());
    RateLimit {
        limit: number("x-ratelimit-limit"),
        remaining: number("x-ratelimit-remaining"),
        reset: number("x-ratelimit-reset"),
        used: number("x-ratelimit-used"),
        resource: response.header("x-ratelimit-resource").map(str::to_string),
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("config", &self.config)
            .field("has_token", &!self.get_token().is_empty())
            .finish()
    }
}
