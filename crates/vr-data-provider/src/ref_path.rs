// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Ref/path disambiguation
//!
//! Ref names may contain `/`, so `release/2.0/src/main.go` could be ref
//! `release` with path `2.0/src/main.go` or ref `release/2.0` with path
//! `src/main.go`. The longest segment prefix naming a known ref wins.

use serde::{Deserialize, Serialize};

/// A virtual path split into revision and in-repository path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefPath {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub path: String,
}

impl RefPath {
    pub fn new(git_ref: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            git_ref: git_ref.into(),
            path: path.into(),
        }
    }
}

/// Split `path` on the longest segment prefix that equals one of `refs`
///
/// Returns `None` when no prefix names a known ref; the caller then falls
/// back to the default branch with the whole path.
pub fn match_ref_path<S: AsRef<str>>(refs: &[S], path: &str) -> Option<RefPath> {
    let segments: Vec<&str> = path.split('/').collect();

    (1..=segments.len()).rev().find_map(|len| {
        let candidate = segments[..len].join("/");
        refs.iter()
            .any(|known| known.as_ref() == candidate)
            .then(|| RefPath::new(candidate, segments[len..].join("/")))
    })
}
