// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use thiserror::Error;
use vr_domain_types::InvalidRepositoryName;
use vr_rest_client::FetchError;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    InvalidRepository(#[from] InvalidRepositoryName),

    #[error("unexpected provider payload: {0}")]
    Decode(String),

    #[error("not a file: {0}")]
    NotAFile(String),
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
