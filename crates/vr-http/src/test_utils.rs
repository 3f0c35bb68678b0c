// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! In-memory transport for tests
//!
//! Responses are scripted per URL path suffix. Each path holds a queue: entries
//! are consumed in order and the last one keeps answering. Every request is
//! recorded so tests can assert on call counts and headers.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError, TransportResult};

#[derive(Debug, Clone)]
enum Scripted {
    Respond(HttpResponse),
    Fail(String),
}

#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<HttpRequest>>,
    latency: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response, so concurrent callers overlap
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue a response for requests whose URL path ends with `path`
    pub fn respond(&self, path: &str, status: u16, body: impl Into<Vec<u8>>) -> &Self {
        let status = StatusCode::from_u16(status).unwrap();
        self.push(path, Scripted::Respond(HttpResponse::new(status, body)))
    }

    pub fn respond_json(&self, path: &str, status: u16, body: serde_json::Value) -> &Self {
        self.respond(path, status, body.to_string())
    }

    pub fn respond_with_headers(
        &self,
        path: &str,
        status: u16,
        body: impl Into<Vec<u8>>,
        headers: &[(&'static str, &str)],
    ) -> &Self {
        let mut response = HttpResponse::new(StatusCode::from_u16(status).unwrap(), body);
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(
                HeaderName::from_static(name),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        response.headers = map;
        self.push(path, Scripted::Respond(response))
    }

    /// Queue a network failure
    pub fn fail(&self, path: &str, message: &str) -> &Self {
        self.push(path, Scripted::Fail(message.to_string()))
    }

    /// All requests seen so far, in arrival order
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests whose URL path ends with `path`
    pub fn request_count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.path().ends_with(path))
            .count()
    }

    fn push(&self, path: &str, scripted: Scripted) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(scripted);
        self
    }

    fn next_for(&self, request_path: &str) -> Option<Scripted> {
        let mut routes = self.routes.lock().unwrap();
        // Longest suffix wins so `/repos/o/r` does not shadow `/repos/o/r/branches`
        let key = routes
            .keys()
            .filter(|route| request_path.ends_with(route.as_str()))
            .max_by_key(|route| route.len())
            .cloned()?;
        let queue = routes.get_mut(&key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> TransportResult<HttpResponse> {
        let path = request.url.path().to_string();
        self.requests.lock().unwrap().push(request);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match self.next_for(&path) {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(TransportError::Network(message)),
            None => Ok(HttpResponse::new(
                StatusCode::NOT_FOUND,
                r#"{"message":"Not Found"}"#,
            )),
        }
    }
}
