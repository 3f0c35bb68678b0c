// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use thiserror::Error;
use vr_http::TransportError;

/// Errors returned by [`crate::FetchClient`]
///
/// Cloneable so every caller coalesced onto one request receives the same
/// failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl FetchError {
    /// 401 and 403 are recoverable by supplying a new token
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, FetchError::Api { status: 401 | 403, .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<TransportError> for FetchError {
    fn from(error: TransportError) -> Self {
        FetchError::Transport(error.to_string())
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_classification() {
        let unauthorized = FetchError::Api { status: 401, body: String::new() };
        let forbidden = FetchError::Api { status: 403, body: String::new() };
        let missing = FetchError::Api { status: 404, body: String::new() };

        assert!(unauthorized.is_auth_failure());
        assert!(forbidden.is_auth_failure());
        assert!(!missing.is_auth_failure());
        assert!(!FetchError::Transport("reset".into()).is_auth_failure());
        assert_eq!(missing.status(), Some(404));
    }
}
