// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Interactive re-authentication
//!
//! [`AuthenticationView`] shows a credential-entry surface with a notice and,
//! when asked, parks the caller on a [`TokenGate`] until the token changes or
//! the configured ceiling passes. The surface itself (a webview, a terminal
//! prompt) lives outside this crate behind [`ReauthSurface`].

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::gate::{GateOutcome, TokenGate};
use crate::store::{CredentialStore, Subscription};
use crate::types::ValidateResult;

/// Host surface able to display the credential-entry page
///
/// A new token entered there must be delivered through
/// [`CredentialStore::set_token`] (directly or via
/// [`AuthenticationView::handle_message`]).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReauthSurface: Send + Sync {
    /// Bring the surface up, showing `notice` (may be empty)
    async fn show(&self, notice: &str);

    /// Tell an open surface the token changed
    async fn token_changed(&self, _token: &str) {}
}

/// Requests a surface sends back to the core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum SurfaceMessage {
    GetNotice,
    GetToken,
    SetToken(Option<String>),
    ValidateToken(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum SurfaceReply {
    Notice(String),
    Token(String),
    Ack,
    Validation(Option<ValidateResult>),
}

type GateSlot = Arc<Mutex<Option<Arc<TokenGate>>>>;

pub struct AuthenticationView {
    store: Arc<CredentialStore>,
    surface: Arc<dyn ReauthSurface>,
    gate: GateSlot,
    notice: Mutex<String>,
    timeout: Duration,
    _subscription: Subscription,
}

impl AuthenticationView {
    /// Wire a view to the store; any token change opens the pending gate
    pub fn new(store: Arc<CredentialStore>, surface: Arc<dyn ReauthSurface>) -> Self {
        let timeout = store.config().reauth_timeout;
        let gate: GateSlot = Arc::new(Mutex::new(None));

        let slot = Arc::clone(&gate);
        let subscription = store.subscribe(move |_token| {
            if let Some(gate) = slot.lock().unwrap().take() {
                gate.open();
            }
        });

        Self {
            store,
            surface,
            gate,
            notice: Mutex::new(String::new()),
            timeout,
            _subscription: subscription,
        }
    }

    pub fn notice(&self) -> String {
        self.notice.lock().unwrap().clone()
    }

    /// Show the surface with `notice`
    ///
    /// With `with_gate`, waits until a new token is supplied or the ceiling
    /// passes; concurrent callers share one pending gate.
    pub async fn open(&self, notice: &str, with_gate: bool) -> Option<GateOutcome> {
        *self.notice.lock().unwrap() = notice.to_string();

        let gate = with_gate.then(|| self.pending_gate());

        tracing::info!(notice, with_gate, "opening re-authentication surface");
        self.surface.show(notice).await;

        match gate {
            Some(gate) => {
                let outcome = gate.wait().await;
                if outcome == GateOutcome::TimedOut {
                    tracing::warn!(
                        timeout_secs = self.timeout.as_secs(),
                        "no new token supplied before the re-authentication ceiling"
                    );
                    self.clear_gate(&gate);
                }
                Some(outcome)
            }
            None => None,
        }
    }

    /// Service a request coming from the surface
    pub async fn handle_message(&self, message: SurfaceMessage) -> crate::Result<SurfaceReply> {
        match message {
            SurfaceMessage::GetNotice => Ok(SurfaceReply::Notice(self.notice())),
            SurfaceMessage::GetToken => Ok(SurfaceReply::Token(self.store.get_token())),
            SurfaceMessage::SetToken(token) => {
                let token = token.unwrap_or_default();
                if !token.is_empty() {
                    self.notice.lock().unwrap().clear();
                }
                self.store.set_token(&token).await?;
                self.surface.token_changed(&token).await;
                Ok(SurfaceReply::Ack)
            }
            SurfaceMessage::ValidateToken(token) => Ok(SurfaceReply::Validation(
                self.store.validate_token(token.as_deref()).await,
            )),
        }
    }

    fn pending_gate(&self) -> Arc<TokenGate> {
        let mut slot = self.gate.lock().unwrap();
        match slot.as_ref() {
            Some(gate) if !gate.is_resolved() => Arc::clone(gate),
            _ => {
                let gate = Arc::new(TokenGate::new(self.timeout));
                *slot = Some(Arc::clone(&gate));
                gate
            }
        }
    }

    fn clear_gate(&self, gate: &Arc<TokenGate>) {
        let mut slot = self.gate.lock().unwrap();
        if slot.as_ref().is_some_and(|current| Arc::ptr_eq(current, gate)) {
            *slot = None;
        }
    }
}
