// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Repository-related domain types
//!
//! Identity, refs, commits and code reviews as exposed to the host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when an `owner/repo` string is malformed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid repository name '{0}': expected exactly one '/' between non-empty owner and name")]
pub struct InvalidRepositoryName(pub String);

/// Owner and name of a hosted repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryIdentity {
    pub owner: String,
    pub name: String,
}

impl RepositoryIdentity {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Canonical `owner/name` form
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryIdentity {
    type Err = InvalidRepositoryName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(InvalidRepositoryName(s.to_string())),
        }
    }
}

impl fmt::Display for RepositoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A named pointer into history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ref {
    pub name: String,
    pub commit_sha: String,
}

pub type Branch = Ref;
pub type Tag = Ref;

/// One file touched by a commit or code review
///
/// `status` is passed through from the provider (added, modified, removed, renamed, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedFile {
    pub path: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub sha: String,
    pub author_name: String,
    pub author_email: String,
    pub committer_name: String,
    pub message: String,
    pub created_at: Option<DateTime<Utc>>,
    pub parent_shas: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Only populated when the commit was fetched individually
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<ChangedFile>>,
}

/// Lifecycle state of a pull/merge request
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CodeReviewState {
    Open,
    Merged,
    Closed,
}

impl CodeReviewState {
    /// Derive the state from the provider's state string and merge timestamp.
    ///
    /// `open` wins regardless of timestamps; otherwise a merge timestamp means merged.
    pub fn derive(state: &str, merged_at: Option<&str>) -> Self {
        if state == "open" {
            CodeReviewState::Open
        } else if merged_at.is_some_and(|ts| !ts.is_empty()) {
            CodeReviewState::Merged
        } else {
            CodeReviewState::Closed
        }
    }
}

/// A pull/merge request record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeReview {
    pub id: String,
    pub title: String,
    pub state: CodeReviewState,
    pub creator: String,
    pub created_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub source_branch: String,
    pub target_branch: String,
    pub source_sha: String,
    pub target_sha: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}
