// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Logging initialization for the virtual repository browser
//!
//! Library crates only emit `tracing` events; binaries call one of the
//! `init*` functions here once at startup. Console output goes to stderr so
//! command output on stdout stays machine-readable.

use std::io;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use tracing::Level;

/// Output format for log messages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable plaintext format
    #[default]
    Plaintext,
    /// Structured JSON format
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_value_name(self, f)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CliLogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl CliLogLevel {
    /// Parse a level name as found in configuration files, ignoring case
    pub fn from_config(value: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(value.trim(), true).ok()
    }
}

impl From<CliLogLevel> for Level {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

impl std::fmt::Display for CliLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_value_name(self, f)
    }
}

/// Display a flag value the way clap spells it on the command line
fn write_value_name<T: ValueEnum>(value: &T, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match value.to_possible_value() {
        Some(possible) => f.write_str(possible.get_name()),
        None => Ok(()),
    }
}

/// Logging flags shared by every binary; use with `#[command(flatten)]`
#[derive(Clone, Debug, Default, clap::Args, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CliLoggingArgs {
    /// Log verbosity level
    #[arg(long, global = true, value_enum, help = "Log verbosity level (default: warn)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<CliLogLevel>,

    #[arg(long, global = true, value_enum, help = "Log output format (default: plaintext)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_format: Option<LogFormat>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, help = "Append logs to this file instead of stderr")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl CliLoggingArgs {
    /// Initialize logging from the flags
    ///
    /// The level comes from `--log-level`, then `configured_level` (the
    /// `logging.level` setting), then `warn`. `RUST_LOG` overrides all of them.
    pub fn init(&self, component: &str, configured_level: Option<&str>) -> anyhow::Result<()> {
        let level = self.effective_level(configured_level).into();
        let format = self.log_format.unwrap_or_default();

        match &self.log_file {
            Some(path) => init_to_file(component, level, format, path),
            None => init(component, level, format),
        }
    }

    pub fn effective_level(&self, configured_level: Option<&str>) -> CliLogLevel {
        self.log_level
            .or_else(|| configured_level.and_then(CliLogLevel::from_config))
            .unwrap_or_default()
    }
}

/// Initialize logging to stderr
pub fn init(component: &str, default_level: Level, format: LogFormat) -> anyhow::Result<()> {
    init_with_writer(component, default_level, format, io::stderr)
}

/// Initialize logging appended to `log_path`, creating parent directories
pub fn init_to_file(
    component: &str,
    default_level: Level,
    format: LogFormat,
    log_path: &Path,
) -> anyhow::Result<()> {
    use std::fs;

    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = fs::OpenOptions::new().create(true).append(true).open(log_path)?;

    init_with_writer(component, default_level, format, log_file)
}

pub fn init_with_writer<W>(
    component: &str,
    default_level: Level,
    format: LogFormat,
    writer: W,
) -> anyhow::Result<()>
where
    W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(component, default_level)));

    match format {
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer().with_writer(writer).json();
            #[cfg(debug_assertions)]
            let layer = layer.with_file(true).with_line_number(true);

            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
        LogFormat::Plaintext => {
            let layer = tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false);
            #[cfg(debug_assertions)]
            let layer = layer.with_file(true).with_line_number(true);

            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
    }

    Ok(())
}

/// Filter directives used when `RUST_LOG` is unset: the chosen level for the
/// binary and the `vr_*` libraries, `warn` for third-party crates
pub fn default_directives(component: &str, level: Level) -> String {
    let mut directives = vec![
        "warn".to_string(),
        format!("{}={}", component.replace('-', "_"), level),
    ];
    for library in [
        "vr_config",
        "vr_credentials",
        "vr_data_provider",
        "vr_http",
        "vr_rest_client",
        "vr_router",
    ] {
        directives.push(format!("{}={}", library, level));
    }
    directives.join(",")
}

/// Redact a secret in log fields
///
/// ```rust
/// use vr_logging::redact;
///
/// let token = "ghp_1234567890";
/// tracing::info!(token = %redact(token), "token stored");
/// ```
pub fn redact(_value: impl std::fmt::Display) -> &'static str {
    "[REDACTED]"
}
