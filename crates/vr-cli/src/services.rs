// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! One-time wiring of the core services

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use vr_config::Settings;
use vr_credentials::{
    AuthenticationView, CredentialStore, CredentialsConfig, FileStateStore, ReauthSurface,
    StateStore,
};
use vr_data_provider::{BrowserLocation, CurrentRepository, DataSource, ProviderConfig, ProviderDataSource};
use vr_domain_types::RepositoryIdentity;
use vr_http::{HttpTransport, ReqwestTransport};
use vr_rest_client::FetchClient;
use vr_router::{PathRouter, RouterConfig};

use crate::surface::{NoticeSurface, TerminalSurface};

/// How the re-authentication surface behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// Ask for a token on the terminal
    Interactive,
    /// Print the notice and give up immediately
    Never,
}

impl PromptMode {
    /// Interactive only when asked for and stdin is a terminal
    pub fn detect(no_prompt: bool) -> Self {
        if no_prompt || !std::io::stdin().is_terminal() {
            PromptMode::Never
        } else {
            PromptMode::Interactive
        }
    }
}

/// A browser location fixed for the lifetime of the process
pub struct StaticLocation(pub String);

#[async_trait]
impl BrowserLocation for StaticLocation {
    async fn browser_url(&self) -> String {
        self.0.clone()
    }
}

pub struct Services {
    pub settings: Settings,
    pub store: Arc<CredentialStore>,
    pub auth_view: Arc<AuthenticationView>,
    pub client: Arc<FetchClient>,
    pub data_source: Arc<dyn DataSource>,
    pub router: PathRouter,
    current: Option<CurrentRepository>,
}

impl Services {
    /// Wire everything against the live provider and the on-disk state file
    pub async fn connect(settings: Settings, prompt: PromptMode) -> Result<Self> {
        let transport: Arc<dyn HttpTransport> = Arc::new(
            ReqwestTransport::new(
                Some(&settings.api.user_agent),
                Duration::from_secs(settings.api.timeout_secs),
            )
            .context("failed to build HTTP transport")?,
        );
        let credentials = CredentialsConfig::from_settings(&settings);
        let state: Arc<dyn StateStore> = Arc::new(FileStateStore::new(credentials.state_file()));
        Self::assemble(settings, transport, state, prompt).await
    }

    /// Wire everything over the given transport and state store
    pub async fn assemble(
        mut settings: Settings,
        transport: Arc<dyn HttpTransport>,
        state: Arc<dyn StateStore>,
        prompt: PromptMode,
    ) -> Result<Self> {
        if prompt == PromptMode::Never {
            settings.auth.reauth_timeout_secs = 0;
        }

        let credentials = CredentialsConfig::from_settings(&settings);
        let store = Arc::new(
            CredentialStore::open(credentials, state, Arc::clone(&transport))
                .await
                .context("failed to open credential store")?,
        );

        let surface: Arc<dyn ReauthSurface> = match prompt {
            PromptMode::Interactive => Arc::new(TerminalSurface::new(
                Arc::clone(&store),
                settings.auth.create_token_url.clone(),
            )),
            PromptMode::Never => Arc::new(NoticeSurface),
        };
        let auth_view = Arc::new(AuthenticationView::new(Arc::clone(&store), surface));

        let client = Arc::new(FetchClient::new(
            settings.api.base_url.clone(),
            transport,
            Arc::clone(&store),
            Arc::clone(&auth_view),
        ));
        let data_source: Arc<dyn DataSource> = Arc::new(ProviderDataSource::new(
            Arc::clone(&client),
            ProviderConfig::from_settings(&settings),
        ));
        let router = PathRouter::new(
            Arc::clone(&data_source),
            RouterConfig::from_settings(&settings).context("invalid router.default_repo")?,
        );

        tracing::debug!(
            base_url = %settings.api.base_url,
            listing = ?settings.provider.listing,
            "services wired"
        );

        Ok(Self {
            settings,
            store,
            auth_view,
            client,
            data_source,
            router,
            current: None,
        })
    }

    /// Take the active repository from `location` when `--repo` is absent
    pub fn with_location(mut self, location: Arc<dyn BrowserLocation>) -> Self {
        let default_repo = self.router.config().default_repo.clone();
        self.current = Some(CurrentRepository::new(location, default_repo));
        self
    }

    /// `--repo` when given, else the repository of `--url`, else the configured default
    pub async fn repository(&self, repo: Option<&str>) -> Result<RepositoryIdentity> {
        match (repo, &self.current) {
            (Some(repo), _) => repo
                .parse()
                .with_context(|| format!("invalid repository '{}'", repo)),
            (None, Some(current)) => Ok(current.get().await.clone()),
            (None, None) => Ok(self.router.config().default_repo.clone()),
        }
    }
}
