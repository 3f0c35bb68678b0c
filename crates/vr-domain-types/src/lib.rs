// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Domain types for the virtual repository browser
//!
//! These are the canonical shapes every provider adapter normalizes into.
//! They carry no references to each other and no behavior beyond parsing
//! and small derivations, so they can be freely cloned across the call graph.

pub mod files;
pub mod query;
pub mod repository;
pub mod router;

pub use files::*;
pub use query::*;
pub use repository::*;
pub use router::*;
