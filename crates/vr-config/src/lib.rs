// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Layered configuration for the virtual repository browser.
//!
//! Precedence (lowest first): built-in defaults, user file, explicit file,
//! `VR_<SECTION>__<KEY>` environment variables, `section.key=value` flags.

pub mod error;
pub mod loader;
pub mod paths;
pub mod settings;

pub use error::{ConfigError, ConfigResult};
pub use loader::{LoadOptions, load};
pub use settings::{
    ApiSettings, AuthSettings, ListingStrategy, LoggingSettings, ProviderSettings,
    RouterSettings, Settings,
};
