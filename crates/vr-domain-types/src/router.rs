// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Typed page intents produced by the path router

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[strum(serialize_all = "kebab-case")]
pub enum PageType {
    Tree,
    Blob,
    CommitList,
    Commit,
    CodeReviewList,
    CodeReview,
    Search,
}

/// The single typed result of parsing a virtual path
///
/// Fields a page type does not use stay `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterState {
    pub page_type: PageType,
    pub repo: String,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_review_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
}

impl RouterState {
    pub fn new(page_type: PageType, repo: impl Into<String>) -> Self {
        Self {
            page_type,
            repo: repo.into(),
            git_ref: None,
            file_path: None,
            commit_sha: None,
            code_review_id: None,
            start_line: None,
            end_line: None,
        }
    }

    pub fn with_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = Some(git_ref.into());
        self
    }

    pub fn with_file_path(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    pub fn with_lines(mut self, start_line: u32, end_line: u32) -> Self {
        self.start_line = Some(start_line);
        self.end_line = Some(end_line);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_state_serializes_ref_key() {
        let state = RouterState::new(PageType::Tree, "o/r").with_ref("main").with_file_path("");
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["ref"], "main");
        assert_eq!(json["pageType"], "Tree");
        assert!(json.get("startLine").is_none());
    }

    #[test]
    fn test_page_type_display() {
        assert_eq!(PageType::CodeReviewList.to_string(), "code-review-list");
    }
}
