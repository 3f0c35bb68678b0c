// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Repository data provider
//!
//! Turns canonical repository requests (directories, files, refs, commits,
//! code reviews) into provider API calls and maps the provider records back
//! onto `vr-domain-types`. Also owns ref/path disambiguation: splitting a
//! slash-separated virtual path into a ref name, which may itself contain
//! slashes, and an in-repository path.

pub mod api_types;
pub mod data_source;
pub mod error;
pub mod location;
pub mod provider;
pub mod ref_path;

pub use data_source::{
    BlameRange, Capabilities, DataSource, SymbolHover, SymbolLocation, SymbolQuery,
    TextSearchMatch, TextSearchQuery, TextSearchResults,
};
pub use error::{ProviderError, ProviderResult};
pub use location::{BrowserLocation, CurrentRepository};
pub use provider::{ProviderConfig, ProviderDataSource};
pub use ref_path::{match_ref_path, RefPath};
