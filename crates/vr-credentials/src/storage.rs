// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Persisted key/value state
//!
//! The state file is a flat TOML table of string values. The credential
//! store keeps exactly one entry in it, keyed by the configured state key;
//! the value is opaque to everything else.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::fs as async_fs;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use crate::error::Result;

/// Storage behind the credential store
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read one value; `None` when never written
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace one value, leaving the others untouched
    async fn update(&self, key: &str, value: &str) -> Result<()>;
}

/// State kept in `state.toml` under a private directory
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = async_fs::read_to_string(&self.path).await?;
        Ok(toml::from_str(&content)?)
    }

    async fn save(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            create_dir_with_permissions(parent, 0o700).await?;
        }

        let content = toml::to_string_pretty(values)?;

        // Write to temporary file first, then rename for atomicity
        let temp_file = self.path.with_extension("tmp");
        async_fs::write(&temp_file, &content).await?;

        #[cfg(unix)]
        {
            let metadata = async_fs::metadata(&temp_file).await?;
            let mut permissions = metadata.permissions();
            permissions.set_mode(0o600);
            async_fs::set_permissions(&temp_file, permissions).await?;
        }

        async_fs::rename(&temp_file, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load().await?.remove(key))
    }

    async fn update(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.load().await?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values).await
    }
}

async fn create_dir_with_permissions(path: &Path, mode: u32) -> Result<()> {
    if !path.exists() {
        async_fs::create_dir_all(path).await?;

        #[cfg(unix)]
        {
            let metadata = async_fs::metadata(path).await?;
            let mut permissions = metadata.permissions();
            permissions.set_mode(mode);
            async_fs::set_permissions(path, permissions).await?;
        }
    }

    #[cfg(not(unix))]
    let _ = mode;

    Ok(())
}

/// Process-local state, for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn update(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().unwrap().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
