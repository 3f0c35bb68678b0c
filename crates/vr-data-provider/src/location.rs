// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Active repository context

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use vr_domain_types::RepositoryIdentity;

/// Host accessor for the URL currently shown in the browser
#[async_trait]
pub trait BrowserLocation: Send + Sync {
    async fn browser_url(&self) -> String;
}

/// `owner/repo` of the active browser URL, derived once and then reused
pub struct CurrentRepository {
    location: Arc<dyn BrowserLocation>,
    default_repo: RepositoryIdentity,
    resolved: OnceCell<RepositoryIdentity>,
}

impl CurrentRepository {
    pub fn new(location: Arc<dyn BrowserLocation>, default_repo: RepositoryIdentity) -> Self {
        Self {
            location,
            default_repo,
            resolved: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> &RepositoryIdentity {
        self.resolved
            .get_or_init(|| async {
                let url = self.location.browser_url().await;
                let repo = repository_from_url(&url).unwrap_or_else(|| self.default_repo.clone());
                tracing::debug!(%url, repo = %repo, "resolved current repository");
                repo
            })
            .await
    }
}

/// First two path segments of `url`, ignoring scheme, host, query and fragment
fn repository_from_url(url: &str) -> Option<RepositoryIdentity> {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = if url.contains("://") {
        without_scheme.find('/').map_or("", |i| &without_scheme[i..])
    } else {
        without_scheme
    };
    let path = path.split(['?', '#']).next().unwrap_or_default();

    let mut segments = path.split('/').filter(|s| !s.is_empty());
    match (segments.next(), segments.next()) {
        (Some(owner), Some(name)) => Some(RepositoryIdentity::new(owner, name)),
        _ => None,
    }
}
