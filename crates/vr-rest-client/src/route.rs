// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Route templates and request parameters
//!
//! A route such as `/repos/:owner/:repo/contents/:path` is filled from a
//! [`Params`] map: a parameter whose name appears as a placeholder is
//! substituted in place, every other defined parameter becomes a query
//! parameter. The reserved `format` parameter only selects response decoding.

use std::fmt;

use vr_http::encode_component;

const FORMAT_PARAM: &str = "format";

/// Scalar parameter value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scalar {
    Text(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(value) => f.write_str(value),
            Scalar::Int(value) => write!(f, "{}", value),
            Scalar::Bool(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<&String> for Scalar {
    fn from(value: &String) -> Self {
        Scalar::Text(value.clone())
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

macro_rules! int_scalar {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Scalar {
            fn from(value: $ty) -> Self {
                Scalar::Int(value as i64)
            }
        })*
    };
}

int_scalar!(i32, i64, u8, u16, u32, u64, usize);

/// How a response body is decoded; also drives the `Accept` header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResponseFormat {
    #[default]
    Json,
    Text,
    Blob,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Text => "text",
            ResponseFormat::Blob => "blob",
        }
    }

    pub fn accept(&self) -> &'static str {
        match self {
            ResponseFormat::Text => "text/plain",
            _ => "application/json",
        }
    }
}

/// Ordered parameter map; a `None` value is "undefined"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, Option<Scalar>)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a defined value, replacing an earlier one of the same name
    pub fn with(self, name: &str, value: impl Into<Scalar>) -> Self {
        self.set(name, Some(value.into()))
    }

    /// Set a value that may be undefined
    pub fn maybe<T: Into<Scalar>>(self, name: &str, value: Option<T>) -> Self {
        self.set(name, value.map(Into::into))
    }

    pub fn format(self, format: ResponseFormat) -> Self {
        self.with(FORMAT_PARAM, format.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .and_then(|(_, value)| value.as_ref())
    }

    /// Decoding requested through the reserved `format` parameter
    pub fn response_format(&self) -> ResponseFormat {
        match self.get(FORMAT_PARAM) {
            Some(Scalar::Text(value)) if value == "text" => ResponseFormat::Text,
            Some(Scalar::Text(value)) if value == "blob" => ResponseFormat::Blob,
            _ => ResponseFormat::Json,
        }
    }

    fn set(mut self, name: &str, value: Option<Scalar>) -> Self {
        match self.entries.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
        self
    }

    fn lookup(&self, name: &str) -> Option<&Option<Scalar>> {
        self.entries.iter().find(|(key, _)| key == name).map(|(_, value)| value)
    }
}

/// Fill `route` from `params`, returning the path and query to append to
/// the API base
pub fn resolve_route(route: &str, params: &Params) -> String {
    let mut path = String::with_capacity(route.len());
    let mut used: Vec<&str> = Vec::new();

    let mut rest = route;
    while let Some(start) = rest.find(':') {
        path.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let len = after
            .char_indices()
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
            .map_or(after.len(), |(i, _)| i);
        let name = &after[..len];

        match params.lookup(name) {
            Some(value) if !name.is_empty() => {
                if let Some(value) = value {
                    path.push_str(&encode_component(&value.to_string()));
                }
                used.push(name);
            }
            _ => {
                path.push(':');
                path.push_str(name);
            }
        }
        rest = &after[len..];
    }
    path.push_str(rest);

    let query: Vec<String> = params
        .entries
        .iter()
        .filter(|(key, _)| key != FORMAT_PARAM && !used.contains(&key.as_str()))
        .filter_map(|(key, value)| {
            value
                .as_ref()
                .map(|value| format!("{}={}", encode_component(key), encode_component(&value.to_string())))
        })
        .collect();

    if !query.is_empty() {
        path.push(if path.contains('?') { '&' } else { '?' });
        path.push_str(&query.join("&"));
    }
    path
}
