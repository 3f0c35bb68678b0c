// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Pagination and filter options accepted by list operations

use crate::repository::CodeReviewState;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonQueryOptions {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl CommonQueryOptions {
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitsQueryOptions {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Revision to list history from
    pub from: Option<String>,
    /// Restrict to commits touching this path
    pub path: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeReviewsQueryOptions {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Defaults to open reviews when unset
    pub state: Option<CodeReviewState>,
    pub creator: Option<String>,
}
