// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! `reqwest`-backed transport

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;

use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError, TransportResult};

const DEFAULT_USER_AGENT: &str = "virtual-repo/0.1";

/// Transport over a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: HttpClient,
}

impl ReqwestTransport {
    /// Build a transport with the given user agent and per-request timeout
    pub fn new(user_agent: Option<&str>, timeout: Duration) -> TransportResult<Self> {
        let http_client = HttpClient::builder()
            .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { http_client })
    }

    /// Wrap an existing client
    pub fn with_client(http_client: HttpClient) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> TransportResult<HttpResponse> {
        let response = self
            .http_client
            .request(request.method, request.url)
            .headers(request.headers)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else {
        TransportError::Network(e.to_string())
    }
}
