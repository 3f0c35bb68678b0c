// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! The data source interface consumed by the virtual filesystem host
//!
//! Browsing operations never fail: list lookups degrade to an empty
//! collection and single lookups to `None`. Only raw file retrieval reports
//! errors. Capabilities a provider does not back (text search, blame,
//! symbols) have default methods returning empty results.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vr_domain_types::{
    Branch, ChangedFile, CodeReview, CodeReviewsQueryOptions, Commit, CommitsQueryOptions,
    CommonQueryOptions, Directory, FileContent, RepositoryIdentity, Tag,
};

use crate::error::ProviderResult;
use crate::ref_path::RefPath;

/// Optional features a data source backs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub text_search: bool,
    pub blame: bool,
    pub symbols: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSearchQuery {
    pub pattern: String,
    pub is_regex: bool,
    pub is_case_sensitive: bool,
    pub is_word_match: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSearchMatch {
    pub path: String,
    pub line: u32,
    pub preview: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSearchResults {
    pub results: Vec<TextSearchMatch>,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlameRange {
    pub start_line: u32,
    pub end_line: u32,
    pub commit: Commit,
}

/// Position of a symbol inside a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolQuery {
    pub path: String,
    pub line: u32,
    pub character: u32,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolLocation {
    pub repo: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub path: String,
    pub start_line: u32,
    pub end_line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolHover {
    pub markdown: String,
}

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Entries directly under `path`; `None` when `path` is not a directory
    /// or the listing could not be fetched
    async fn provide_directory(
        &self,
        repo: &RepositoryIdentity,
        git_ref: &str,
        path: &str,
    ) -> Option<Directory>;

    async fn provide_file(
        &self,
        repo: &RepositoryIdentity,
        git_ref: &str,
        path: &str,
    ) -> ProviderResult<FileContent>;

    async fn provide_branches(
        &self,
        repo: &RepositoryIdentity,
        options: &CommonQueryOptions,
    ) -> Vec<Branch>;

    async fn provide_branch(&self, repo: &RepositoryIdentity, name: &str) -> Option<Branch>;

    async fn provide_tags(&self, repo: &RepositoryIdentity, options: &CommonQueryOptions) -> Vec<Tag>;

    async fn provide_tag(&self, repo: &RepositoryIdentity, name: &str) -> Option<Tag>;

    /// Default branch name; `master` when it cannot be determined
    async fn get_default_branch(&self, repo: &RepositoryIdentity) -> String;

    async fn provide_commits(
        &self,
        repo: &RepositoryIdentity,
        options: &CommitsQueryOptions,
    ) -> Vec<Commit>;

    async fn provide_commit(&self, repo: &RepositoryIdentity, git_ref: &str) -> Option<Commit>;

    async fn provide_commit_changed_files(
        &self,
        repo: &RepositoryIdentity,
        git_ref: &str,
        options: &CommonQueryOptions,
    ) -> Vec<ChangedFile>;

    /// Split a virtual path into ref and in-repository path
    async fn extract_ref_path(&self, repo: &RepositoryIdentity, path: &str) -> RefPath;

    async fn provide_code_reviews(
        &self,
        repo: &RepositoryIdentity,
        options: &CodeReviewsQueryOptions,
    ) -> Vec<CodeReview>;

    async fn provide_code_review(&self, repo: &RepositoryIdentity, id: &str) -> Option<CodeReview>;

    async fn provide_code_review_changed_files(
        &self,
        repo: &RepositoryIdentity,
        id: &str,
        options: &CommonQueryOptions,
    ) -> Vec<ChangedFile>;

    fn provide_user_avatar_link(&self, user: &str) -> String;

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    async fn provide_text_search_results(
        &self,
        _repo: &RepositoryIdentity,
        _git_ref: &str,
        _query: &TextSearchQuery,
    ) -> TextSearchResults {
        TextSearchResults::default()
    }

    async fn provide_file_blame_ranges(
        &self,
        _repo: &RepositoryIdentity,
        _git_ref: &str,
        _path: &str,
    ) -> Vec<BlameRange> {
        Vec::new()
    }

    async fn provide_symbol_definitions(
        &self,
        _repo: &RepositoryIdentity,
        _git_ref: &str,
        _query: &SymbolQuery,
    ) -> Vec<SymbolLocation> {
        Vec::new()
    }

    async fn provide_symbol_references(
        &self,
        _repo: &RepositoryIdentity,
        _git_ref: &str,
        _query: &SymbolQuery,
    ) -> Vec<SymbolLocation> {
        Vec::new()
    }

    async fn provide_symbol_hover(
        &self,
        _repo: &RepositoryIdentity,
        _git_ref: &str,
        _query: &SymbolQuery,
    ) -> Option<SymbolHover> {
        None
    }
}
