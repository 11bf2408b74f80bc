//! Provider facade without async-trait or dynamic trait objects.
//!
//! [`ProviderClient`] wraps the concrete GitLab client and gives callers a
//! single entry point for reading merge request diffs.

pub mod types;
pub use types::*;

pub mod gitlab;

use crate::errors::GitContextEngineResult;
use tracing::debug;

/// Runtime configuration for the provider client.
#[derive(Clone)]
pub struct ProviderConfig {
    /// API base, e.g. "https://gitlab.com/api/v4".
    pub base_api: String,
    /// Access token for the provider (PAT, project or OAuth token).
    pub token: String,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_api", &self.base_api)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Concrete provider client with enum dispatch.
#[derive(Debug, Clone)]
pub enum ProviderClient {
    GitLab(gitlab::GitLabClient),
}

impl ProviderClient {
    /// Constructs a provider client from configuration.
    ///
    /// The underlying HTTP client is configured with a stable user agent so
    /// that the provider can identify the integration.
    pub fn from_config(cfg: ProviderConfig) -> GitContextEngineResult<Self> {
        debug!("Initializing provider client: base_api={}", cfg.base_api);

        let client = reqwest::Client::builder()
            .user_agent(concat!("git-context-engine/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(ProviderClient::GitLab(gitlab::GitLabClient::new(
            client,
            cfg.base_api,
            cfg.token,
        )?))
    }

    /// Fetches the unified diff of a change request.
    pub async fn fetch_raw_diff(
        &self,
        id: &ChangeRequestId,
    ) -> GitContextEngineResult<DiffDocument> {
        debug!("Fetching raw diff: project={}, iid={}", id.project, id.iid);

        match self {
            Self::GitLab(c) => c.fetch_raw_diff(id).await,
        }
    }
}
