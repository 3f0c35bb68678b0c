// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Configuration and state path discovery

use std::path::PathBuf;

const APP_DIR: &str = "virtual-repo";
const CONFIG_FILENAME: &str = "config.toml";
const ENV_HOME: &str = "VR_HOME";

/// User configuration file
///
/// Precedence: `VR_HOME` > `XDG_CONFIG_HOME` (Linux) > platform config dir.
pub fn user_config_path() -> PathBuf {
    if let Ok(home) = std::env::var(ENV_HOME) {
        return PathBuf::from(home).join(CONFIG_FILENAME);
    }

    if cfg!(target_os = "linux") {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join(APP_DIR).join(CONFIG_FILENAME);
        }
    }

    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(APP_DIR)
        .join(CONFIG_FILENAME)
}

/// Directory holding persisted state (the stored token)
///
/// Precedence: `VR_HOME` > platform data dir.
pub fn default_state_dir() -> PathBuf {
    if let Ok(home) = std::env::var(ENV_HOME) {
        return PathBuf::from(home).join("state");
    }
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(APP_DIR)
}
