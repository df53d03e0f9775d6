use std::sync::Arc;

use crate::config::Config;
use crate::github::{ContentStore, GitHubClient};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Repository the résumé is published to. `None` when no GitHub
    /// credential is configured; uploads then fail as a misconfiguration.
    pub store: Option<Arc<dyn ContentStore>>,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let store = config.github_token.clone().map(|token| {
            Arc::new(GitHubClient::new(
                &config.github_api_url,
                token,
                config.repo.clone(),
                config.branch.clone(),
            )) as Arc<dyn ContentStore>
        });
        AppState {
            config: Arc::new(config),
            store,
        }
    }
}
