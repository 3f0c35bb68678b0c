// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Directory listings and file contents

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    Submodule,
}

/// One entry of a directory listing
///
/// `size` is only known for files and `commit_sha` only for submodules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub kind: EntryKind,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
}

impl DirectoryEntry {
    pub fn file(path: impl Into<String>, size: Option<u64>) -> Self {
        Self {
            kind: EntryKind::File,
            path: path.into(),
            size,
            commit_sha: None,
        }
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Directory,
            path: path.into(),
            size: None,
            commit_sha: None,
        }
    }

    pub fn submodule(path: impl Into<String>, commit_sha: Option<String>) -> Self {
        Self {
            kind: EntryKind::Submodule,
            path: path.into(),
            size: None,
            commit_sha,
        }
    }

    /// Last path segment
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// A directory listing; `truncated` is set when the provider capped the result
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Directory {
    pub entries: Vec<DirectoryEntry>,
    pub truncated: bool,
}

/// Raw file bytes, already decoded from the transport encoding
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileContent {
    pub bytes: Vec<u8>,
}

impl FileContent {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_name() {
        assert_eq!(DirectoryEntry::file("src/lib.rs", Some(3)).name(), "lib.rs");
        assert_eq!(DirectoryEntry::directory("docs").name(), "docs");
    }

    #[test]
    fn test_entry_serialization_skips_absent_fields() {
        let json = serde_json::to_value(DirectoryEntry::directory("docs")).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "directory", "path": "docs"}));
    }
}
