// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Token validation results

use serde::{Deserialize, Serialize};

/// Rate-limit snapshot read from `x-ratelimit-*` response headers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
    /// Epoch seconds at which the window resets
    pub reset: Option<u64>,
    pub used: Option<u64>,
    pub resource: Option<String>,
}

impl RateLimit {
    pub fn is_empty(&self) -> bool {
        self.limit.is_none()
            && self.remaining.is_none()
            && self.reset.is_none()
            && self.used.is_none()
            && self.resource.is_none()
    }
}

/// Identity behind a valid token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResult {
    pub username: String,
    pub avatar_url: Option<String>,
    pub profile_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimit>,
}
