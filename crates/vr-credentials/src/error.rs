// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for credential persistence

use thiserror::Error;

/// Result type alias for credential operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading or writing persisted state
///
/// Token validation never produces these; it degrades to `None` instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
