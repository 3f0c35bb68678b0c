// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::sync::Arc;

use vr_config::Settings;
use vr_data_provider::DataSource;
use vr_domain_types::{InvalidRepositoryName, PageType, RepositoryIdentity, RouterState};

use crate::fragment::{build_line_fragment, parse_line_fragment};

/// Revision used for the placeholder repository
const HEAD: &str = "HEAD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Stripped before parsing and prepended by every builder; may be empty
    pub path_prefix: String,
    /// Shown for paths that do not name a repository
    pub default_repo: RepositoryIdentity,
    /// Provider web origin for external links
    pub origin: String,
}

impl RouterConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self, InvalidRepositoryName> {
        Ok(Self {
            path_prefix: settings.router.path_prefix.trim_end_matches('/').to_string(),
            default_repo: settings.router.default_repo.parse()?,
            origin: settings.router.origin.trim_end_matches('/').to_string(),
        })
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            path_prefix: "/gitcode".to_string(),
            default_repo: RepositoryIdentity::new("gitcode", "gitcode"),
            origin: "https://gitcode.com".to_string(),
        }
    }
}

/// Parses virtual paths into router states and builds them back
pub struct PathRouter {
    data_source: Arc<dyn DataSource>,
    config: RouterConfig,
}

impl PathRouter {
    pub fn new(data_source: Arc<dyn DataSource>, config: RouterConfig) -> Self {
        Self { data_source, config }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Resolve a virtual path
    ///
    /// Never fails: a path that does not name a repository, or names an
    /// unknown page, resolves to the placeholder repository at `HEAD`.
    pub async fn parse_path(&self, path: &str) -> RouterState {
        let (pathname, fragment) = split_location(path);
        let pathname = self.strip_prefix(pathname);
        let segments: Vec<&str> = pathname.split('/').filter(|s| !s.is_empty()).collect();

        let (owner, name, page, rest) = match segments.as_slice() {
            [owner, name] => (*owner, *name, None, &[][..]),
            [owner, name, page, rest @ ..] => (*owner, *name, Some(*page), rest),
            _ => return self.placeholder(),
        };
        let repo = RepositoryIdentity::new(owner, name);
        let rest_path = rest.join("/");

        let state = match page {
            None | Some("tree") => self.resolve_tree(&repo, &rest_path, PageType::Tree).await,
            Some("blob") => {
                let state = self.resolve_tree(&repo, &rest_path, PageType::Blob).await;
                match fragment.and_then(parse_line_fragment) {
                    Some((start, end)) => state.with_lines(start, end),
                    None => state,
                }
            }
            Some("commits") => {
                let git_ref = if rest.is_empty() {
                    self.data_source.get_default_branch(&repo).await
                } else {
                    rest_path
                };
                RouterState::new(PageType::CommitList, repo.full_name()).with_ref(git_ref)
            }
            Some("commit") => {
                let mut state = RouterState::new(PageType::Commit, repo.full_name()).with_ref(rest_path.clone());
                state.commit_sha = Some(rest_path);
                state
            }
            Some("pulls") => RouterState::new(PageType::CodeReviewList, repo.full_name()),
            Some("pull") => match rest.first() {
                Some(id) => {
                    let mut state = RouterState::new(PageType::CodeReview, repo.full_name());
                    state.code_review_id = Some(id.to_string());
                    state
                }
                None => RouterState::new(PageType::CodeReviewList, repo.full_name()),
            },
            Some("search") => {
                let git_ref = self.data_source.get_default_branch(&repo).await;
                RouterState::new(PageType::Search, repo.full_name()).with_ref(git_ref)
            }
            Some(other) => {
                tracing::debug!(page = other, path, "unknown page type");
                return self.placeholder();
            }
        };

        tracing::debug!(path, page_type = %state.page_type, repo = %state.repo, "parsed virtual path");
        state
    }

    pub fn build_tree_path(&self, repo: &str, git_ref: Option<&str>, file_path: Option<&str>) -> String {
        let path = match (git_ref, file_path) {
            (Some(git_ref), Some(file_path)) if !file_path.is_empty() => {
                format!("/{}/tree/{}/{}", repo, git_ref, file_path)
            }
            (Some(git_ref), _) => format!("/{}/tree/{}", repo, git_ref),
            (None, _) => format!("/{}", repo),
        };
        self.with_prefix(path)
    }

    pub fn build_blob_path(
        &self,
        repo: &str,
        git_ref: &str,
        file_path: &str,
        start_line: Option<u32>,
        end_line: Option<u32>,
    ) -> String {
        let fragment = build_line_fragment(start_line, end_line);
        self.with_prefix(format!("/{}/blob/{}/{}{}", repo, git_ref, file_path, fragment))
    }

    pub fn build_commit_list_path(&self, repo: &str, git_ref: Option<&str>) -> String {
        match git_ref {
            Some(git_ref) if !git_ref.is_empty() => {
                self.with_prefix(format!("/{}/commits/{}", repo, git_ref))
            }
            _ => self.with_prefix(format!("/{}/commits", repo)),
        }
    }

    pub fn build_commit_path(&self, repo: &str, commit_sha: &str) -> String {
        self.with_prefix(format!("/{}/commit/{}", repo, commit_sha))
    }

    pub fn build_code_review_list_path(&self, repo: &str) -> String {
        self.with_prefix(format!("/{}/pulls", repo))
    }

    pub fn build_code_review_path(&self, repo: &str, code_review_id: &str) -> String {
        self.with_prefix(format!("/{}/pull/{}", repo, code_review_id))
    }

    /// Link to `path` on the provider's own website
    pub fn build_external_link(&self, path: &str) -> String {
        format!("{}/{}", self.config.origin, path.trim_start_matches('/'))
    }

    /// External link for a virtual path, with the router prefix, query and fragment dropped
    pub fn external_link_for(&self, virtual_path: &str) -> String {
        let (pathname, _) = split_location(virtual_path);
        self.build_external_link(self.strip_prefix(pathname))
    }

    async fn resolve_tree(&self, repo: &RepositoryIdentity, rest_path: &str, page_type: PageType) -> RouterState {
        let resolved = self.data_source.extract_ref_path(repo, rest_path).await;
        RouterState::new(page_type, repo.full_name())
            .with_ref(resolved.git_ref)
            .with_file_path(resolved.path)
    }

    fn placeholder(&self) -> RouterState {
        RouterState::new(PageType::Tree, self.config.default_repo.full_name())
            .with_ref(HEAD)
            .with_file_path("")
    }

    fn strip_prefix<'a>(&self, pathname: &'a str) -> &'a str {
        let prefix = self.config.path_prefix.as_str();
        if prefix.is_empty() {
            return pathname;
        }
        match pathname.strip_prefix(prefix) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => pathname,
        }
    }

    fn with_prefix(&self, path: String) -> String {
        format!("{}{}", self.config.path_prefix, path)
    }
}

/// Split `path?query#fragment` into the path and the `#...` fragment
fn split_location(path: &str) -> (&str, Option<&str>) {
    let (before_fragment, fragment) = match path.find('#') {
        Some(i) => (&path[..i], Some(&path[i..])),
        None => (path, None),
    };
    let pathname = before_fragment.split('?').next().unwrap_or_default();
    (pathname, fragment)
}
