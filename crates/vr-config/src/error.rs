// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for configuration loading

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("invalid override '{0}': expected section.key=value")]
    InvalidOverride(String),

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
