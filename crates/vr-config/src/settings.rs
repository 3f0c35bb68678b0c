// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Typed configuration sections

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub auth: AuthSettings,
    pub router: RouterSettings,
    pub provider: ProviderSettings,
    pub logging: LoggingSettings,
}

/// [api] section - provider REST endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.gitcode.com/api/v5".to_string(),
            user_agent: "virtual-repo/0.1".to_string(),
            timeout_secs: 30,
        }
    }
}

/// [auth] section - credential persistence and re-authentication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub token_state_key: String,
    pub reauth_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
    pub create_token_url: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            token_state_key: "gitcode-oauth-token".to_string(),
            reauth_timeout_secs: 600,
            state_dir: None,
            create_token_url: "https://gitcode.com/settings/tokens/new".to_string(),
        }
    }
}

/// [router] section - virtual path shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
    /// Stripped from parsed paths and prepended to built ones; empty disables it
    pub path_prefix: String,
    pub default_repo: String,
    pub origin: String,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            path_prefix: "/gitcode".to_string(),
            default_repo: "gitcode/gitcode".to_string(),
            origin: "https://gitcode.com".to_string(),
        }
    }
}

/// Which provider endpoint backs directory listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStrategy {
    /// Shallow contents endpoint, one call per directory
    #[default]
    Contents,
    /// Recursive tree endpoint filtered by `file_path`
    Tree,
}

/// [provider] section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub listing: ListingStrategy,
    pub ref_page_size: u32,
    pub max_ref_pages: u32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            listing: ListingStrategy::Contents,
            ref_page_size: 100,
            max_ref_pages: 10,
        }
    }
}

/// [logging] section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}
