// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Command-line host for the virtual repository browser
//!
//! Every service is wired once in [`services::Services`]; the subcommands
//! below are thin views over the data provider, the path router and the
//! credential store.

pub mod commands;
pub mod render;
pub mod services;
pub mod surface;

use std::path::PathBuf;

pub use clap::Parser;
use clap::{Args, Subcommand, ValueEnum};
use vr_domain_types::CodeReviewState;
use vr_logging::CliLoggingArgs;

#[derive(Parser, Debug)]
#[command(name = "vr")]
#[command(about = "Browse hosted repositories through virtual paths")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Path to a configuration file (must exist)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override a setting, e.g. `--set provider.listing=tree` (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", global = true)]
    pub overrides: Vec<String>,

    /// Emit JSON instead of human output
    #[arg(long, global = true)]
    pub json: bool,

    /// Never prompt for a replacement token
    #[arg(long, global = true)]
    pub no_prompt: bool,

    /// Provider page to take the repository from when `--repo` is absent
    #[arg(long, env = "VR_BROWSER_URL", value_name = "URL", global = true)]
    pub url: Option<String>,

    #[command(flatten)]
    pub logging: CliLoggingArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Repository selection shared by the data commands
#[derive(Args, Debug, Clone, Default)]
pub struct RepoArgs {
    /// Repository as `owner/name` (defaults to `--url`, then `router.default_repo`)
    #[arg(long, short = 'r')]
    pub repo: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PageArgs {
    /// 1-based page number
    #[arg(long)]
    pub page: Option<u32>,

    /// Items per page
    #[arg(long)]
    pub per_page: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a virtual path into a page intent
    Parse {
        /// Virtual path, e.g. `/gitcode/owner/repo/blob/main/README.md#L3`
        path: String,
    },
    /// List a directory; the argument starts with the ref, e.g. `release/2.0/src`
    Ls {
        #[command(flatten)]
        repo: RepoArgs,
        /// Ref followed by a path; empty lists the default branch root
        #[arg(default_value = "")]
        ref_path: String,
    },
    /// Print a file; the argument starts with the ref, e.g. `main/README.md`
    Cat {
        #[command(flatten)]
        repo: RepoArgs,
        ref_path: String,
    },
    /// List branches
    Branches {
        #[command(flatten)]
        repo: RepoArgs,
        #[command(flatten)]
        page: PageArgs,
    },
    /// List tags
    Tags {
        #[command(flatten)]
        repo: RepoArgs,
        #[command(flatten)]
        page: PageArgs,
    },
    /// List commits
    Commits {
        #[command(flatten)]
        repo: RepoArgs,
        #[command(flatten)]
        page: PageArgs,
        /// Revision to list history from
        #[arg(long = "ref")]
        git_ref: Option<String>,
        /// Only commits touching this path
        #[arg(long)]
        path: Option<String>,
        #[arg(long)]
        author: Option<String>,
    },
    /// Show one commit
    Commit {
        #[command(flatten)]
        repo: RepoArgs,
        /// Commit SHA or ref
        sha: String,
        /// Also list changed files
        #[arg(long)]
        files: bool,
    },
    /// List code reviews (pull requests)
    Reviews {
        #[command(flatten)]
        repo: RepoArgs,
        #[command(flatten)]
        page: PageArgs,
        #[arg(long, value_enum)]
        state: Option<ReviewStateArg>,
        /// Only reviews opened by this user
        #[arg(long)]
        creator: Option<String>,
    },
    /// Show one code review
    Review {
        #[command(flatten)]
        repo: RepoArgs,
        id: String,
        /// Also list changed files
        #[arg(long)]
        files: bool,
    },
    /// Manage the stored access token
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum TokenCommands {
    /// Store a token; read from stdin when omitted, empty clears it
    Set { token: Option<String> },
    /// Show whether a token is stored
    Show {
        /// Print the token itself
        #[arg(long)]
        reveal: bool,
    },
    /// Check a token (the stored one by default) against the provider
    Validate { token: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReviewStateArg {
    Open,
    Merged,
    Closed,
}

impl From<ReviewStateArg> for CodeReviewState {
    fn from(state: ReviewStateArg) -> Self {
        match state {
            ReviewStateArg::Open => CodeReviewState::Open,
            ReviewStateArg::Merged => CodeReviewState::Merged,
            ReviewStateArg::Closed => CodeReviewState::Closed,
        }
    }
}
