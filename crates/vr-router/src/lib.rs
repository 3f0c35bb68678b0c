// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Virtual path router
//!
//! Virtual paths have the shape
//! `[prefix]/{owner}/{repo}[/{page}/{rest...}][#L{n}[-L{m}]]`. Parsing turns
//! one into a [`vr_domain_types::RouterState`]; the builders produce the
//! canonical path for a state and are left inverses of the parser.

mod fragment;
mod router;

pub use fragment::parse_line_fragment;
pub use router::{PathRouter, RouterConfig};
