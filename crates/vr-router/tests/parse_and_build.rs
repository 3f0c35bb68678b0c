// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::sync::Arc;

use async_trait::async_trait;
use vr_data_provider::{match_ref_path, DataSource, ProviderResult, RefPath};
use vr_domain_types::{
    Branch, ChangedFile, CodeReview, CodeReviewsQueryOptions, Commit, CommitsQueryOptions,
    CommonQueryOptions, Directory, FileContent, PageType, RepositoryIdentity, RouterState, Tag,
};
use vr_router::{PathRouter, RouterConfig};

/// Data source knowing a fixed set of refs and nothing else
struct KnownRefs {
    refs: Vec<&'static str>,
    default_branch: &'static str,
}

#[async_trait]
impl DataSource for KnownRefs {
    async fn provide_directory(&self, _: &RepositoryIdentity, _: &str, _: &str) -> Option<Directory> {
        None
    }

    async fn provide_file(&self, _: &RepositoryIdentity, _: &str, _: &str) -> ProviderResult<FileContent> {
        Ok(FileContent::new(Vec::new()))
    }

    async fn provide_branches(&self, _: &RepositoryIdentity, _: &CommonQueryOptions) -> Vec<Branch> {
        Vec::new()
    }

    async fn provide_branch(&self, _: &RepositoryIdentity, _: &str) -> Option<Branch> {
        None
    }

    async fn provide_tags(&self, _: &RepositoryIdentity, _: &CommonQueryOptions) -> Vec<Tag> {
        Vec::new()
    }

    async fn provide_tag(&self, _: &RepositoryIdentity, _: &str) -> Option<Tag> {
        None
    }

    async fn get_default_branch(&self, _: &RepositoryIdentity) -> String {
        self.default_branch.to_string()
    }

    async fn provide_commits(&self, _: &RepositoryIdentity, _: &CommitsQueryOptions) -> Vec<Commit> {
        Vec::new()
    }

    async fn provide_commit(&self, _: &RepositoryIdentity, _: &str) -> Option<Commit> {
        None
    }

    async fn provide_commit_changed_files(
        &self,
        _: &RepositoryIdentity,
        _: &str,
        _: &CommonQueryOptions,
    ) -> Vec<ChangedFile> {
        Vec::new()
    }

    async fn extract_ref_path(&self, _: &RepositoryIdentity, path: &str) -> RefPath {
        if path.is_empty() {
            return RefPath::new(self.default_branch, "");
        }
        match_ref_path(&self.refs, path).unwrap_or_else(|| RefPath::new(self.default_branch, path))
    }

    async fn provide_code_reviews(&self, _: &RepositoryIdentity, _: &CodeReviewsQueryOptions) -> Vec<CodeReview> {
        Vec::new()
    }

    async fn provide_code_review(&self, _: &RepositoryIdentity, _: &str) -> Option<CodeReview> {
        None
    }

    async fn provide_code_review_changed_files(
        &self,
        _: &RepositoryIdentity,
        _: &str,
        _: &CommonQueryOptions,
    ) -> Vec<ChangedFile> {
        Vec::new()
    }

    fn provide_user_avatar_link(&self, user: &str) -> String {
        format!("https://gitcode.com/{}.png", user)
    }
}

fn router() -> PathRouter {
    let source = Arc::new(KnownRefs {
        refs: vec!["main", "release", "release/2.0", "feature/foo/bar"],
        default_branch: "main",
    });
    PathRouter::new(source, RouterConfig::default())
}

#[tokio::test]
async fn test_tree_round_trip() {
    let router = router();
    let state = RouterState::new(PageType::Tree, "o/r")
        .with_ref("main")
        .with_file_path("a/b.go");

    let path = router.build_tree_path("o/r", Some("main"), Some("a/b.go"));
    assert_eq!(path, "/gitcode/o/r/tree/main/a/b.go");
    assert_eq!(router.parse_path(&path).await, state);
}

#[tokio::test]
async fn test_blob_round_trip_with_range() {
    let router = router();
    let state = RouterState::new(PageType::Blob, "o/r")
        .with_ref("main")
        .with_file_path("a/b.go")
        .with_lines(10, 20);

    let path = router.build_blob_path("o/r", "main", "a/b.go", Some(10), Some(20));
    assert_eq!(path, "/gitcode/o/r/blob/main/a/b.go#L10-L20");
    assert_eq!(router.parse_path(&path).await, state);
}

#[tokio::test]
async fn test_blob_single_line_and_no_fragment() {
    let router = router();

    let single = router.parse_path("/o/r/blob/main/x.rs#L42").await;
    assert_eq!((single.start_line, single.end_line), (Some(42), Some(42)));
    assert_eq!(router.build_blob_path("o/r", "main", "x.rs", Some(42), Some(42)), "/gitcode/o/r/blob/main/x.rs#L42");

    let plain = router.parse_path("/o/r/blob/main/x.rs").await;
    assert_eq!(plain.page_type, PageType::Blob);
    assert_eq!((plain.start_line, plain.end_line), (None, None));

    let malformed = router.parse_path("/o/r/blob/main/x.rs#readme").await;
    assert_eq!((malformed.start_line, malformed.end_line), (None, None));
}

#[tokio::test]
async fn test_slashed_ref_is_resolved_longest_first() {
    let router = router();

    let state = router.parse_path("/gitcode/o/r/tree/release/2.0/src/main.go").await;
    assert_eq!(state.git_ref.as_deref(), Some("release/2.0"));
    assert_eq!(state.file_path.as_deref(), Some("src/main.go"));

    let state = router.parse_path("/o/r/tree/feature/foo/bar").await;
    assert_eq!(state.git_ref.as_deref(), Some("feature/foo/bar"));
    assert_eq!(state.file_path.as_deref(), Some(""));
}

#[tokio::test]
async fn test_repository_root_uses_default_branch() {
    let router = router();

    let state = router.parse_path("/o/r").await;
    assert_eq!(state.page_type, PageType::Tree);
    assert_eq!(state.git_ref.as_deref(), Some("main"));
    assert_eq!(state.file_path.as_deref(), Some(""));
    assert_eq!(router.build_tree_path("o/r", None, None), "/gitcode/o/r");
}

#[tokio::test]
async fn test_commit_pages() {
    let router = router();

    let list = router.parse_path("/o/r/commits").await;
    assert_eq!(list.page_type, PageType::CommitList);
    assert_eq!(list.git_ref.as_deref(), Some("main"));

    let path = router.build_commit_list_path("o/r", Some("release/2.0"));
    let list = router.parse_path(&path).await;
    assert_eq!(list.git_ref.as_deref(), Some("release/2.0"));

    let path = router.build_commit_path("o/r", "abc123");
    let commit = router.parse_path(&path).await;
    assert_eq!(commit.page_type, PageType::Commit);
    assert_eq!(commit.git_ref.as_deref(), Some("abc123"));
    assert_eq!(commit.commit_sha.as_deref(), Some("abc123"));
}

#[tokio::test]
async fn test_code_review_pages() {
    let router = router();

    let list = router.parse_path(&router.build_code_review_list_path("o/r")).await;
    assert_eq!(list.page_type, PageType::CodeReviewList);

    let review = router.parse_path(&router.build_code_review_path("o/r", "17")).await;
    assert_eq!(review.page_type, PageType::CodeReview);
    assert_eq!(review.code_review_id.as_deref(), Some("17"));
}

#[tokio::test]
async fn test_search_page_uses_default_branch() {
    let state = router().parse_path("/o/r/search?q=main").await;
    assert_eq!(state.page_type, PageType::Search);
    assert_eq!(state.git_ref.as_deref(), Some("main"));
}

#[tokio::test]
async fn test_unparseable_paths_fall_back_to_placeholder() {
    let router = router();
    let placeholder = RouterState::new(PageType::Tree, "gitcode/gitcode")
        .with_ref("HEAD")
        .with_file_path("");

    assert_eq!(router.parse_path("").await, placeholder);
    assert_eq!(router.parse_path("/gitcode").await, placeholder);
    assert_eq!(router.parse_path("/only-owner").await, placeholder);
    assert_eq!(router.parse_path("/o/r/wiki/Home").await, placeholder);
}

#[tokio::test]
async fn test_prefix_is_optional_on_parse() {
    let router = router();
    let with_prefix = router.parse_path("/gitcode/o/r/tree/main/a.txt").await;
    let without_prefix = router.parse_path("/o/r/tree/main/a.txt").await;
    assert_eq!(with_prefix, without_prefix);

    // An owner that merely starts with the prefix text is not stripped
    let state = router.parse_path("/gitcodex/r").await;
    assert_eq!(state.repo, "gitcodex/r");
}

#[tokio::test]
async fn test_external_link() {
    let router = router();
    assert_eq!(router.build_external_link("/o/r/tree/main"), "https://gitcode.com/o/r/tree/main");
    assert_eq!(router.build_external_link("o/r"), "https://gitcode.com/o/r");
}

#[tokio::test]
async fn test_external_link_for_virtual_path() {
    let router = router();
    assert_eq!(
        router.external_link_for("/gitcode/o/r/blob/main/a.rs?plain=1#L3-L5"),
        "https://gitcode.com/o/r/blob/main/a.rs"
    );
    assert_eq!(router.external_link_for("/o/r/pulls"), "https://gitcode.com/o/r/pulls");
    assert_eq!(router.external_link_for("/gitcodex/r"), "https://gitcode.com/gitcodex/r");
}
