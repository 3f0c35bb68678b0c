// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Provider API records and their mapping onto the domain model
//!
//! Every field the provider may omit is optional here; the conversions fill
//! gaps with empty values rather than rejecting the record.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use vr_domain_types::{
    ChangedFile, CodeReview, CodeReviewState, Commit, DirectoryEntry, Ref,
};

/// Parse an RFC 3339 timestamp; anything else is treated as absent
pub fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|value| value.with_timezone(&Utc))
}

#[derive(Debug, Deserialize)]
pub struct RawRepository {
    pub default_branch: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawCommitPointer {
    #[serde(default)]
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub struct RawRef {
    pub name: String,
    pub commit: Option<RawCommitPointer>,
}

impl From<RawRef> for Ref {
    fn from(raw: RawRef) -> Self {
        Ref {
            name: raw.name,
            commit_sha: raw.commit.map(|c| c.sha).unwrap_or_default(),
        }
    }
}

/// Entry of the contents endpoint
#[derive(Debug, Deserialize)]
pub struct RawContentEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
    pub size: Option<u64>,
    pub sha: Option<String>,
}

impl From<RawContentEntry> for DirectoryEntry {
    fn from(raw: RawContentEntry) -> Self {
        match raw.kind.as_str() {
            "dir" => DirectoryEntry::directory(raw.path),
            "submodule" => DirectoryEntry::submodule(raw.path, raw.sha),
            // Symlinks are listed as files
            _ => DirectoryEntry::file(raw.path, raw.size),
        }
    }
}

/// Single-file payload of the contents endpoint
#[derive(Debug, Deserialize)]
pub struct RawFileContent {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub encoding: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawTree {
    #[serde(default)]
    pub tree: Vec<RawTreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Deserialize)]
pub struct RawTreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: Option<String>,
    pub size: Option<u64>,
}

impl RawTreeEntry {
    pub fn into_entry(self, path: String) -> DirectoryEntry {
        match self.kind.as_str() {
            "tree" => DirectoryEntry::directory(path),
            "commit" => DirectoryEntry::submodule(path, self.sha),
            _ => DirectoryEntry::file(path, self.size),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RawSignature {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawCommitDetail {
    pub author: Option<RawSignature>,
    pub committer: Option<RawSignature>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawUser {
    pub login: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawChangedFile {
    pub filename: String,
    pub status: Option<String>,
    pub previous_filename: Option<String>,
}

impl From<RawChangedFile> for ChangedFile {
    fn from(raw: RawChangedFile) -> Self {
        ChangedFile {
            path: raw.filename,
            status: raw.status.unwrap_or_default(),
            previous_path: raw.previous_filename,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawCommit {
    pub sha: String,
    pub commit: Option<RawCommitDetail>,
    #[serde(default)]
    pub parents: Vec<RawCommitPointer>,
    pub author: Option<RawUser>,
    pub files: Option<Vec<RawChangedFile>>,
}

impl From<RawCommit> for Commit {
    fn from(raw: RawCommit) -> Self {
        let detail = raw.commit.unwrap_or_default();
        let author = detail.author.unwrap_or_default();
        let committer = detail.committer.unwrap_or_default();

        Commit {
            sha: raw.sha,
            author_name: author.name.unwrap_or_default(),
            author_email: author.email.unwrap_or_default(),
            committer_name: committer.name.unwrap_or_default(),
            message: detail.message.unwrap_or_default(),
            created_at: parse_timestamp(author.date.as_deref()),
            parent_shas: raw.parents.into_iter().map(|p| p.sha).collect(),
            avatar_url: raw.author.and_then(|user| user.avatar_url),
            files: raw
                .files
                .map(|files| files.into_iter().map(ChangedFile::from).collect()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RawPullBranch {
    #[serde(rename = "ref", default)]
    pub name: String,
    #[serde(default)]
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub struct RawPull {
    pub number: serde_json::Value,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub state: String,
    pub user: Option<RawUser>,
    pub created_at: Option<String>,
    pub merged_at: Option<String>,
    pub closed_at: Option<String>,
    #[serde(default)]
    pub head: RawPullBranch,
    #[serde(default)]
    pub base: RawPullBranch,
}

impl From<RawPull> for CodeReview {
    fn from(raw: RawPull) -> Self {
        let id = match raw.number {
            serde_json::Value::String(number) => number,
            other => other.to_string(),
        };
        let (creator, avatar_url) = match raw.user {
            Some(user) => (user.login.unwrap_or_default(), user.avatar_url),
            None => (String::new(), None),
        };

        CodeReview {
            id,
            title: raw.title,
            state: CodeReviewState::derive(&raw.state, raw.merged_at.as_deref()),
            creator,
            created_at: parse_timestamp(raw.created_at.as_deref()),
            merged_at: parse_timestamp(raw.merged_at.as_deref()),
            closed_at: parse_timestamp(raw.closed_at.as_deref()),
            source_branch: raw.head.name,
            target_branch: raw.base.name,
            source_sha: raw.head.sha,
            target_sha: raw.base.sha,
            avatar_url,
        }
    }
}
