// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Data source backed by the provider REST API

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use vr_config::{ListingStrategy, Settings};
use vr_domain_types::{
    Branch, ChangedFile, CodeReview, CodeReviewState, CodeReviewsQueryOptions, Commit,
    CommitsQueryOptions, CommonQueryOptions, Directory, DirectoryEntry, FileContent, Ref,
    RepositoryIdentity, Tag,
};
use vr_rest_client::{FetchClient, Params, ResponseData, ResponseFormat};

use crate::api_types::{
    RawChangedFile, RawCommit, RawContentEntry, RawFileContent, RawPull, RawRef, RawRepository,
    RawTree,
};
use crate::data_source::DataSource;
use crate::error::{ProviderError, ProviderResult};
use crate::ref_path::{match_ref_path, RefPath};

/// Used when the repository metadata cannot be fetched
pub const FALLBACK_BRANCH: &str = "master";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub listing: ListingStrategy,
    /// `per_page` used while enumerating refs for path disambiguation
    pub ref_page_size: u32,
    /// Upper bound on pages fetched per ref kind
    pub max_ref_pages: u32,
    /// Web origin used for avatar links
    pub origin: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl ProviderConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            listing: settings.provider.listing,
            ref_page_size: settings.provider.ref_page_size.max(1),
            max_ref_pages: settings.provider.max_ref_pages.max(1),
            origin: settings.router.origin.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum RefKind {
    Branches,
    Tags,
}

impl RefKind {
    fn route(self) -> &'static str {
        match self {
            RefKind::Branches => "/repos/:owner/:repo/branches",
            RefKind::Tags => "/repos/:owner/:repo/tags",
        }
    }
}

/// [`DataSource`] over the provider REST API
pub struct ProviderDataSource {
    client: Arc<FetchClient>,
    config: ProviderConfig,
}

impl ProviderDataSource {
    pub fn new(client: Arc<FetchClient>, config: ProviderConfig) -> Self {
        tracing::debug!(listing = ?config.listing, "provider data source ready");
        Self { client, config }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    async fn fetch_json<T: DeserializeOwned>(&self, route: &str, params: Params) -> ProviderResult<T> {
        let response = self.client.get(route, params).await?;
        Ok(response.json()?)
    }

    async fn fetch_refs(
        &self,
        kind: RefKind,
        repo: &RepositoryIdentity,
        options: &CommonQueryOptions,
    ) -> ProviderResult<Vec<Ref>> {
        let params = repo_params(repo)
            .maybe("page", options.page)
            .maybe("per_page", options.page_size);
        let refs: Vec<RawRef> = self.fetch_json(kind.route(), params).await?;
        Ok(refs.into_iter().map(Ref::from).collect())
    }

    /// Every ref name of `kind`, paging until a short page or the page cap
    async fn all_ref_names(&self, kind: RefKind, repo: &RepositoryIdentity) -> Vec<String> {
        let page_size = self.config.ref_page_size;
        let mut names = Vec::new();

        for page in 1..=self.config.max_ref_pages {
            let options = CommonQueryOptions::page(page, page_size);
            let refs = match self.fetch_refs(kind, repo, &options).await {
                Ok(refs) => refs,
                Err(e) => {
                    tracing::warn!(repo = %repo, ?kind, page, error = %e, "ref enumeration stopped early");
                    break;
                }
            };
            let short_page = (refs.len() as u32) < page_size;
            names.extend(refs.into_iter().map(|r| r.name));
            if short_page {
                break;
            }
        }
        names
    }

    async fn try_default_branch(&self, repo: &RepositoryIdentity) -> ProviderResult<Option<String>> {
        let metadata: RawRepository = self.fetch_json("/repos/:owner/:repo", repo_params(repo)).await?;
        Ok(metadata.default_branch.filter(|name| !name.is_empty()))
    }

    async fn list_contents(
        &self,
        repo: &RepositoryIdentity,
        git_ref: &str,
        path: &str,
    ) -> ProviderResult<Option<Directory>> {
        let (route, params) = contents_request(repo, git_ref, path);
        let response = self.client.get(route, params).await?;

        // A file path answers with a single object instead of an array
        let value = match response.data {
            ResponseData::Json(value) if value.is_array() => value,
            _ => return Ok(None),
        };
        let entries: Vec<RawContentEntry> =
            serde_json::from_value(value).map_err(|e| ProviderError::Decode(e.to_string()))?;

        Ok(Some(Directory {
            entries: entries.into_iter().map(DirectoryEntry::from).collect(),
            truncated: false,
        }))
    }

    async fn list_tree(
        &self,
        repo: &RepositoryIdentity,
        git_ref: &str,
        path: &str,
    ) -> ProviderResult<Option<Directory>> {
        let params = repo_params(repo)
            .with("ref", git_ref)
            .with("recursive", 1)
            .with("file_path", path);
        let tree: RawTree = self.fetch_json("/repos/:owner/:repo/git/trees/:ref", params).await?;

        let prefix = if path.is_empty() { String::new() } else { format!("{}/", path) };
        // One convention per response: root-relative if any entry is, else relative to `file_path`
        let root_relative = prefix.is_empty()
            || tree
                .tree
                .iter()
                .any(|raw| raw.path == path || raw.path.starts_with(&prefix));

        let mut entries = Vec::new();
        for raw in tree.tree {
            let full = if root_relative {
                if !raw.path.starts_with(&prefix) {
                    continue;
                }
                raw.path.clone()
            } else {
                format!("{}{}", prefix, raw.path)
            };
            let relative = &full[prefix.len()..];
            if relative.is_empty() || relative.contains('/') {
                continue;
            }
            entries.push(raw.into_entry(full));
        }

        if entries.is_empty() && !path.is_empty() {
            return Ok(None);
        }
        Ok(Some(Directory {
            entries,
            truncated: tree.truncated,
        }))
    }

    async fn file_from_contents(
        &self,
        repo: &RepositoryIdentity,
        git_ref: &str,
        path: &str,
    ) -> ProviderResult<FileContent> {
        let (route, params) = contents_request(repo, git_ref, path);
        let response = self.client.get(route, params).await?;
        if matches!(&response.data, ResponseData::Json(value) if value.is_array()) {
            return Err(ProviderError::NotAFile(path.to_string()));
        }

        let raw: RawFileContent = response.json()?;
        if raw.kind.as_deref().is_some_and(|kind| kind != "file") {
            return Err(ProviderError::NotAFile(path.to_string()));
        }
        let content = raw
            .content
            .ok_or_else(|| ProviderError::Decode(format!("no content for {}", path)))?;
        decode_content(&content, raw.encoding.as_deref()).map(FileContent::new)
    }

    async fn file_from_raw(
        &self,
        repo: &RepositoryIdentity,
        git_ref: &str,
        path: &str,
    ) -> ProviderResult<FileContent> {
        let params = repo_params(repo)
            .with("path", path)
            .with("ref", git_ref)
            .format(ResponseFormat::Blob);
        let response = self.client.get("/repos/:owner/:repo/raw/:path", params).await?;
        Ok(FileContent::new(response.into_bytes()))
    }

    async fn try_commits(
        &self,
        repo: &RepositoryIdentity,
        options: &CommitsQueryOptions,
    ) -> ProviderResult<Vec<Commit>> {
        let params = repo_params(repo)
            .maybe("sha", options.from.as_deref())
            .maybe("path", options.path.as_deref())
            .maybe("author", options.author.as_deref())
            .maybe("page", options.page)
            .maybe("per_page", options.page_size);
        let commits: Vec<RawCommit> = self.fetch_json("/repos/:owner/:repo/commits", params).await?;
        Ok(commits.into_iter().map(Commit::from).collect())
    }

    async fn try_code_reviews(
        &self,
        repo: &RepositoryIdentity,
        options: &CodeReviewsQueryOptions,
    ) -> ProviderResult<Vec<CodeReview>> {
        let state = options.state.unwrap_or(CodeReviewState::Open);
        let params = repo_params(repo)
            .with("state", state.to_string())
            .maybe("page", options.page)
            .maybe("per_page", options.page_size);
        let pulls: Vec<RawPull> = self.fetch_json("/repos/:owner/:repo/pulls", params).await?;

        Ok(pulls
            .into_iter()
            .map(CodeReview::from)
            .filter(|review| options.creator.as_ref().map_or(true, |creator| &review.creator == creator))
            .collect())
    }
}

fn repo_params(repo: &RepositoryIdentity) -> Params {
    Params::new().with("owner", &repo.owner).with("repo", &repo.name)
}

fn contents_request(repo: &RepositoryIdentity, git_ref: &str, path: &str) -> (&'static str, Params) {
    let params = repo_params(repo).with("ref", git_ref);
    if path.is_empty() {
        ("/repos/:owner/:repo/contents", params)
    } else {
        ("/repos/:owner/:repo/contents/:path", params.with("path", path))
    }
}

/// Decode file content as delivered by the contents endpoint
fn decode_content(content: &str, encoding: Option<&str>) -> ProviderResult<Vec<u8>> {
    match encoding {
        None | Some("base64") => {
            let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            base64::engine::general_purpose::STANDARD
                .decode(compact)
                .map_err(|e| ProviderError::Decode(format!("invalid base64 content: {}", e)))
        }
        Some(_) => Ok(content.as_bytes().to_vec()),
    }
}

/// Log and swallow a failed list lookup
fn or_empty<T>(result: ProviderResult<Vec<T>>, operation: &str, repo: &RepositoryIdentity) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!(repo = %repo, operation, error = %e, "returning empty result");
        Vec::new()
    })
}

/// Log and swallow a failed single lookup
fn or_none<T>(result: ProviderResult<T>, operation: &str, repo: &RepositoryIdentity) -> Option<T> {
    result
        .map_err(|e| tracing::warn!(repo = %repo, operation, error = %e, "returning no result"))
        .ok()
}

#[async_trait]
impl DataSource for ProviderDataSource {
    async fn provide_directory(
        &self,
        repo: &RepositoryIdentity,
        git_ref: &str,
        path: &str,
    ) -> Option<Directory> {
        let result = match self.config.listing {
            ListingStrategy::Contents => self.list_contents(repo, git_ref, path).await,
            ListingStrategy::Tree => self.list_tree(repo, git_ref, path).await,
        };
        or_none(result, "provide_directory", repo).flatten()
    }

    async fn provide_file(
        &self,
        repo: &RepositoryIdentity,
        git_ref: &str,
        path: &str,
    ) -> ProviderResult<FileContent> {
        match self.config.listing {
            ListingStrategy::Contents => self.file_from_contents(repo, git_ref, path).await,
            ListingStrategy::Tree => self.file_from_raw(repo, git_ref, path).await,
        }
    }

    async fn provide_branches(
        &self,
        repo: &RepositoryIdentity,
        options: &CommonQueryOptions,
    ) -> Vec<Branch> {
        or_empty(self.fetch_refs(RefKind::Branches, repo, options).await, "provide_branches", repo)
    }

    async fn provide_branch(&self, repo: &RepositoryIdentity, name: &str) -> Option<Branch> {
        let params = repo_params(repo).with("branch", name);
        let result = self
            .fetch_json::<RawRef>("/repos/:owner/:repo/branches/:branch", params)
            .await
            .map(Ref::from);
        or_none(result, "provide_branch", repo)
    }

    async fn provide_tags(&self, repo: &RepositoryIdentity, options: &CommonQueryOptions) -> Vec<Tag> {
        or_empty(self.fetch_refs(RefKind::Tags, repo, options).await, "provide_tags", repo)
    }

    async fn provide_tag(&self, repo: &RepositoryIdentity, name: &str) -> Option<Tag> {
        let page_size = self.config.ref_page_size;
        for page in 1..=self.config.max_ref_pages {
            let options = CommonQueryOptions::page(page, page_size);
            let tags = or_none(self.fetch_refs(RefKind::Tags, repo, &options).await, "provide_tag", repo)?;
            let short_page = (tags.len() as u32) < page_size;
            if let Some(tag) = tags.into_iter().find(|tag| tag.name == name) {
                return Some(tag);
            }
            if short_page {
                break;
            }
        }
        None
    }

    async fn get_default_branch(&self, repo: &RepositoryIdentity) -> String {
        or_none(self.try_default_branch(repo).await, "get_default_branch", repo)
            .flatten()
            .unwrap_or_else(|| FALLBACK_BRANCH.to_string())
    }

    async fn provide_commits(
        &self,
        repo: &RepositoryIdentity,
        options: &CommitsQueryOptions,
    ) -> Vec<Commit> {
        or_empty(self.try_commits(repo, options).await, "provide_commits", repo)
    }

    async fn provide_commit(&self, repo: &RepositoryIdentity, git_ref: &str) -> Option<Commit> {
        let params = repo_params(repo).with("sha", git_ref);
        let result = self
            .fetch_json::<RawCommit>("/repos/:owner/:repo/commits/:sha", params)
            .await
            .map(Commit::from);
        or_none(result, "provide_commit", repo)
    }

    async fn provide_commit_changed_files(
        &self,
        repo: &RepositoryIdentity,
        git_ref: &str,
        _options: &CommonQueryOptions,
    ) -> Vec<ChangedFile> {
        self.provide_commit(repo, git_ref)
            .await
            .and_then(|commit| commit.files)
            .unwrap_or_default()
    }

    async fn extract_ref_path(&self, repo: &RepositoryIdentity, path: &str) -> RefPath {
        if path.is_empty() {
            return RefPath::new(self.get_default_branch(repo).await, "");
        }

        let mut refs = self.all_ref_names(RefKind::Branches, repo).await;
        refs.extend(self.all_ref_names(RefKind::Tags, repo).await);

        match match_ref_path(&refs, path) {
            Some(found) => found,
            None => {
                tracing::debug!(repo = %repo, path, "no ref prefix matched, using default branch");
                RefPath::new(self.get_default_branch(repo).await, path)
            }
        }
    }

    async fn provide_code_reviews(
        &self,
        repo: &RepositoryIdentity,
        options: &CodeReviewsQueryOptions,
    ) -> Vec<CodeReview> {
        or_empty(self.try_code_reviews(repo, options).await, "provide_code_reviews", repo)
    }

    async fn provide_code_review(&self, repo: &RepositoryIdentity, id: &str) -> Option<CodeReview> {
        let params = repo_params(repo).with("number", id);
        let result = self
            .fetch_json::<RawPull>("/repos/:owner/:repo/pulls/:number", params)
            .await
            .map(CodeReview::from);
        or_none(result, "provide_code_review", repo)
    }

    async fn provide_code_review_changed_files(
        &self,
        repo: &RepositoryIdentity,
        id: &str,
        options: &CommonQueryOptions,
    ) -> Vec<ChangedFile> {
        let params = repo_params(repo)
            .with("number", id)
            .maybe("page", options.page)
            .maybe("per_page", options.page_size);
        let result = self
            .fetch_json::<Vec<RawChangedFile>>("/repos/:owner/:repo/pulls/:number/files", params)
            .await
            .map(|files| files.into_iter().map(ChangedFile::from).collect());
        or_empty(result, "provide_code_review_changed_files", repo)
    }

    fn provide_user_avatar_link(&self, user: &str) -> String {
        format!("{}/{}.png", self.config.origin, user)
    }
}
