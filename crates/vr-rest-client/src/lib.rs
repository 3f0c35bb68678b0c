// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! REST client for the code-hosting provider
//!
//! Requests are described by a route template plus a parameter map. Identical
//! in-flight requests share one network call, and an authentication failure
//! pauses the request behind the re-authentication view before it is retried
//! once.

pub mod client;
pub mod dedup;
pub mod error;
pub mod route;

pub use client::{ApiResponse, FetchClient, ResponseData, REAUTH_NOTICE};
pub use dedup::Dedup;
pub use error::{FetchError, FetchResult};
pub use route::{resolve_route, Params, ResponseFormat, Scalar};
pub use vr_http::Method;
