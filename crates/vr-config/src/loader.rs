// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Merging configuration layers

use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat};

use crate::error::{ConfigError, ConfigResult};
use crate::paths;
use crate::settings::Settings;

/// Where to look for configuration and what to override
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file; must exist when given
    pub config_file: Option<PathBuf>,
    /// Skip the user file (tests and `--no-user-config`)
    pub skip_user_file: bool,
    /// Skip `VR_*` environment variables
    pub skip_env: bool,
    /// `section.key=value` pairs applied last
    pub overrides: Vec<String>,
}

/// Load and merge every configuration layer into typed settings
pub fn load(options: &LoadOptions) -> ConfigResult<Settings> {
    let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

    if !options.skip_user_file {
        let user = paths::user_config_path();
        if user.exists() {
            tracing::debug!(path = %user.display(), "loading user config");
            builder = builder.add_source(File::from(user).format(FileFormat::Toml).required(false));
        }
    }

    if let Some(path) = &options.config_file {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.clone()));
        }
        tracing::debug!(path = %path.display(), "loading explicit config");
        builder = builder.add_source(File::from(path.clone()).format(FileFormat::Toml));
    }

    if !options.skip_env {
        builder = builder.add_source(
            Environment::with_prefix("VR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );
    }

    for pair in &options.overrides {
        let (key, value) = parse_override(pair)?;
        builder = builder.set_override(key, value)?;
    }

    Ok(builder.build()?.try_deserialize()?)
}

fn parse_override(pair: &str) -> ConfigResult<(&str, &str)> {
    match pair.split_once('=') {
        Some((key, value)) if key.contains('.') && !key.trim().is_empty() => {
            Ok((key.trim(), value.trim()))
        }
        _ => Err(ConfigError::InvalidOverride(pair.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ListingStrategy;
    use tempfile::TempDir;

    fn isolated() -> LoadOptions {
        LoadOptions {
            skip_user_file: true,
            skip_env: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let settings = load(&isolated()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.auth.reauth_timeout_secs, 600);
        assert_eq!(settings.provider.listing, ListingStrategy::Contents);
        assert_eq!(settings.router.path_prefix, "/gitcode");
    }

    #[test]
    fn test_file_layer_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [api]
            base_url = "https://example.test/api"

            [provider]
            listing = "tree"
            "#,
        )
        .unwrap();

        let settings = load(&LoadOptions {
            config_file: Some(path),
            ..isolated()
        })
        .unwrap();

        assert_eq!(settings.api.base_url, "https://example.test/api");
        assert_eq!(settings.provider.listing, ListingStrategy::Tree);
        // untouched keys keep their defaults
        assert_eq!(settings.provider.ref_page_size, 100);
        assert_eq!(settings.api.timeout_secs, 30);
    }

    #[test]
    fn test_flags_win_over_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[auth]\nreauth_timeout_secs = 30\n").unwrap();

        let settings = load(&LoadOptions {
            config_file: Some(path),
            overrides: vec!["auth.reauth_timeout_secs=5".to_string()],
            ..isolated()
        })
        .unwrap();

        assert_eq!(settings.auth.reauth_timeout_secs, 5);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = load(&LoadOptions {
            config_file: Some(PathBuf::from("/definitely/not/here.toml")),
            ..isolated()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_invalid_override() {
        for bad in ["novalue", "nodot=1", "=1"] {
            let err = load(&LoadOptions {
                overrides: vec![bad.to_string()],
                ..isolated()
            })
            .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidOverride(_)), "{bad}");
        }
    }
}
