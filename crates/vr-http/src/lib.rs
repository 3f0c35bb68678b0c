// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! HTTP transport for the virtual repository browser
//!
//! Both the fetch client and the token validator talk to the provider through
//! [`HttpTransport`], so tests can swap the network for a scripted transport
//! without touching either caller.

pub mod encoding;
pub mod reqwest_transport;
pub mod transport;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use encoding::encode_component;
pub use reqwest_transport::ReqwestTransport;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, TransportError, TransportResult};

pub use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
pub use reqwest::{Method, StatusCode};
pub use url::Url;
