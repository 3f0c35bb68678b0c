// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Authenticated fetch client

use std::sync::Arc;

use serde::de::DeserializeOwned;
use vr_credentials::{AuthenticationView, CredentialStore};
use vr_http::{HeaderMap, HeaderValue, HttpRequest, HttpResponse, HttpTransport, Method, Url};

use crate::dedup::Dedup;
use crate::error::{FetchError, FetchResult};
use crate::route::{resolve_route, Params, ResponseFormat};

/// Shown on the re-authentication surface when the provider rejects a request
pub const REAUTH_NOTICE: &str = "Authentication required or rate limit exceeded";

/// Decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseData {
    Json(serde_json::Value),
    Text(String),
    Blob(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub data: ResponseData,
}

impl ApiResponse {
    /// Deserialize a JSON body into `T`
    pub fn json<T: DeserializeOwned>(&self) -> FetchResult<T> {
        match &self.data {
            ResponseData::Json(value) => serde_json::from_value(value.clone())
                .map_err(|e| FetchError::Decode(e.to_string())),
            ResponseData::Text(text) => {
                serde_json::from_str(text).map_err(|e| FetchError::Decode(e.to_string()))
            }
            ResponseData::Blob(bytes) => {
                serde_json::from_slice(bytes).map_err(|e| FetchError::Decode(e.to_string()))
            }
        }
    }

    /// Body as raw bytes, whatever format it was fetched in
    pub fn into_bytes(self) -> Vec<u8> {
        match self.data {
            ResponseData::Json(value) => value.to_string().into_bytes(),
            ResponseData::Text(text) => text.into_bytes(),
            ResponseData::Blob(bytes) => bytes,
        }
    }
}

/// Client for the provider REST API
///
/// Sends `Authorization: Bearer <token>` whenever a token is stored. A 401 or
/// 403 opens the re-authentication view and the request is retried exactly
/// once after it resolves.
pub struct FetchClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    store: Arc<CredentialStore>,
    auth_view: Arc<AuthenticationView>,
    in_flight: Dedup<String, ApiResponse, FetchError>,
}

impl FetchClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        store: Arc<CredentialStore>,
        auth_view: Arc<AuthenticationView>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
            store,
            auth_view,
            in_flight: Dedup::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, route: &str, params: Params) -> FetchResult<ApiResponse> {
        self.request(route, params, Method::GET).await
    }

    /// Issue `method` against `route` filled from `params`
    ///
    /// Concurrent calls resolving to the same method, URL and format share
    /// one execution, re-authentication included.
    pub async fn request(
        &self,
        route: &str,
        params: Params,
        method: Method,
    ) -> FetchResult<ApiResponse> {
        let format = params.response_format();
        let url = self.url_for(route, &params)?;
        let key = format!("{} {} {}", method, url, format.as_str());

        self.in_flight
            .call(key, || self.send_with_reauth(url, method, format))
            .await
    }

    fn url_for(&self, route: &str, params: &Params) -> FetchResult<Url> {
        let path = resolve_route(route, params);
        Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| FetchError::Transport(format!("invalid request URL for {}: {}", route, e)))
    }

    async fn send_with_reauth(
        &self,
        url: Url,
        method: Method,
        format: ResponseFormat,
    ) -> FetchResult<ApiResponse> {
        match self.send_once(&url, &method, format).await {
            Err(error) if error.is_auth_failure() => {
                tracing::info!(
                    url = %url,
                    status = ?error.status(),
                    "provider rejected credentials, waiting for re-authentication"
                );
                self.auth_view.open(REAUTH_NOTICE, true).await;

                let retried = self.send_once(&url, &method, format).await;
                if let Err(error) = &retried {
                    tracing::warn!(url = %url, error = %error, "request failed after re-authentication");
                }
                retried
            }
            Err(error) => {
                tracing::warn!(url = %url, error = %error, "provider request failed");
                Err(error)
            }
            ok => ok,
        }
    }

    async fn send_once(
        &self,
        url: &Url,
        method: &Method,
        format: ResponseFormat,
    ) -> FetchResult<ApiResponse> {
        let mut request = HttpRequest::get(url.clone());
        request.method = method.clone();
        request
            .headers
            .insert("accept", HeaderValue::from_static(format.accept()));

        let token = self.store.get_token();
        if !token.is_empty() {
            let value = format!("Bearer {}", token)
                .parse::<HeaderValue>()
                .map_err(|e| FetchError::Transport(format!("unusable token: {}", e)))?;
            request.headers.insert("authorization", value);
        }

        tracing::debug!(method = %method, url = %url, has_token = !token.is_empty(), "provider request");
        let response = self.transport.send(request).await?;
        decode(response, format)
    }
}

fn decode(response: HttpResponse, format: ResponseFormat) -> FetchResult<ApiResponse> {
    let status = response.status.as_u16();
    if !response.status.is_success() {
        return Err(FetchError::Api {
            status,
            body: response.text(),
        });
    }

    let data = match format {
        ResponseFormat::Text => ResponseData::Text(response.text()),
        ResponseFormat::Blob => ResponseData::Blob(response.body),
        ResponseFormat::Json if response.body.is_empty() => ResponseData::Json(serde_json::Value::Null),
        ResponseFormat::Json => ResponseData::Json(
            serde_json::from_slice(&response.body).map_err(|e| FetchError::Decode(e.to_string()))?,
        ),
    };

    Ok(ApiResponse {
        status,
        headers: response.headers,
        data,
    })
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("base_url", &self.base_url)
            .field("in_flight", &self.in_flight.in_flight_count())
            .finish()
    }
}
