// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Configuration integration for credential management

use std::path::PathBuf;
use std::time::Duration;

use vr_config::Settings;

/// Credential-related settings, resolved from the layered configuration
#[derive(Debug, Clone)]
pub struct CredentialsConfig {
    /// Explicit directory for the state file
    pub state_dir: Option<PathBuf>,
    /// Key the token is stored under
    pub token_state_key: String,
    /// Ceiling for waiting on a replacement token
    pub reauth_timeout: Duration,
    /// Provider API base; the identity endpoint is `{api_base_url}/user`
    pub api_base_url: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl CredentialsConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            state_dir: settings.auth.state_dir.clone(),
            token_state_key: settings.auth.token_state_key.clone(),
            reauth_timeout: Duration::from_secs(settings.auth.reauth_timeout_secs),
            api_base_url: settings.api.base_url.clone(),
        }
    }

    /// Directory holding `state.toml`
    /// Precedence: explicit state_dir > VR_HOME > platform data dir
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(vr_config::paths::default_state_dir)
    }

    pub fn state_file(&self) -> PathBuf {
        self.state_dir().join("state.toml")
    }

    pub fn identity_url(&self) -> String {
        format!("{}/user", self.api_base_url.trim_end_matches('/'))
    }
}
