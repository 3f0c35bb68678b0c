// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

#![allow(clippy::disallowed_methods)] // CLI is allowed to print to stdout/stderr

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use vr_cli::commands::{self, Output};
use vr_cli::services::{PromptMode, Services, StaticLocation};
use vr_cli::{Cli, Parser};
use vr_config::LoadOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = vr_config::load(&LoadOptions {
        config_file: cli.config.clone(),
        overrides: cli.overrides.clone(),
        ..Default::default()
    })?;
    cli.logging.init("vr-cli", settings.logging.level.as_deref())?;

    let mut services = Services::connect(settings, PromptMode::detect(cli.no_prompt)).await?;
    if let Some(url) = cli.url {
        services = services.with_location(Arc::new(StaticLocation(url)));
    }

    match commands::execute(cli.command, &services, cli.json).await? {
        Output::Text(text) => print!("{}", text),
        Output::Bytes(bytes) => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
