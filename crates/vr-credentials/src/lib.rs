// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Credential management for the virtual repository browser.
//!
//! This crate provides:
//! - A single persisted bearer token with change subscriptions
//! - Token validation against the provider's identity endpoint
//! - A one-shot timed gate used to park requests during re-authentication
//! - The re-authentication view that ties the gate to token changes

pub mod auth_view;
pub mod config;
pub mod error;
pub mod gate;
pub mod storage;
pub mod store;
pub mod types;

pub use auth_view::{AuthenticationView, ReauthSurface, SurfaceMessage, SurfaceReply};
pub use config::CredentialsConfig;
pub use error::{Error, Result};
pub use gate::{GateOutcome, TokenGate};
pub use storage::{FileStateStore, MemoryStateStore, StateStore};
pub use store::{CredentialStore, Subscription};
pub use types::{RateLimit, ValidateResult};
