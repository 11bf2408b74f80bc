//! GitLab provider (REST v4) for merge request diffs.
//!
//! Endpoints used:
//!   * GET /projects/:id/merge_requests/:iid/raw_diffs?unidiff=true

use crate::errors::{GitContextEngineConfigError, GitContextEngineResult};
use crate::git_providers::types::*;
use reqwest::Client;
use tracing::{debug, warn};

/// GitLab HTTP client wrapper.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: Client,
    base_api: String, // e.g. "https://gitlab.com/api/v4"
    token: String,    // sent as bearer token
}

impl GitLabClient {
    /// Constructs a GitLab client with a shared HTTP instance and auth token.
    ///
    /// # Errors
    /// - `MissingToken` if `token` is blank
    /// - `InvalidBaseUrl` if `base_api` is not http/https
    pub fn new(http: Client, base_api: String, token: String) -> GitContextEngineResult<Self> {
        if token.trim().is_empty() {
            return Err(GitContextEngineConfigError::MissingToken.into());
        }
        let base = base_api.trim().trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(GitContextEngineConfigError::InvalidBaseUrl(base_api).into());
        }

        debug!("Creating GitLabClient with base_api={}", base);
        Ok(Self {
            http,
            base_api: base.to_string(),
            token: token.trim().to_string(),
        })
    }

    /// Fetches the raw unified diff of a merge request.
    ///
    /// One authenticated GET, no retries. Any non-2xx status, transport
    /// failure or unreadable body is returned as a provider error.
    pub async fn fetch_raw_diff(
        &self,
        id: &ChangeRequestId,
    ) -> GitContextEngineResult<DiffDocument> {
        let url = format!(
            "{}/projects/{}/merge_requests/{}/raw_diffs",
            self.base_api,
            urlencoding::encode(&id.project),
            id.iid
        );
        debug!("GitLab fetch_raw_diff: {}", url);

        let text = self
            .http
            .get(url)
            .query(&[("unidiff", "true")])
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let doc = DiffDocument::new(text);
        if doc.is_empty() {
            warn!(
                project = %id.project,
                iid = id.iid,
                "GitLab returned an empty diff for merge request"
            );
        }

        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{GitContextEngineError, GitContextEngineProviderError};
    use mockito::Matcher;

    const DIFF: &str = "diff --git a/a.rs b/a.rs\n--- a/a.rs\n+++ b/a.rs\n@@ -1 +1 @@\n-x\n+y\n";

    fn client(base: String) -> GitLabClient {
        GitLabClient::new(Client::new(), base, "glpat-test".into()).unwrap()
    }

    #[tokio::test]
    async fn fetches_unidiff_with_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/projects/42/merge_requests/7/raw_diffs")
            .match_query(Matcher::UrlEncoded("unidiff".into(), "true".into()))
            .match_header("authorization", "Bearer glpat-test")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body(DIFF)
            .create_async()
            .await;

        let doc = client(server.url())
            .fetch_raw_diff(&ChangeRequestId::new("42", 7))
            .await
            .unwrap();

        assert_eq!(doc.as_str(), DIFF);
        assert_eq!(doc.file_count(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn encodes_namespaced_project_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/projects/group%2Fproject/merge_requests/3/raw_diffs")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(DIFF)
            .create_async()
            .await;

        client(server.url())
            .fetch_raw_diff(&ChangeRequestId::new("group/project", 3))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn not_found_maps_to_provider_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/projects/42/merge_requests/7/raw_diffs")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"message":"404 Not found"}"#)
            .create_async()
            .await;

        let err = client(server.url())
            .fetch_raw_diff(&ChangeRequestId::new("42", 7))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GitContextEngineError::Provider(GitContextEngineProviderError::NotFound)
        ));
    }

    #[test]
    fn rejects_blank_token_and_bad_base() {
        assert!(matches!(
            GitLabClient::new(Client::new(), "https://gitlab.com/api/v4".into(), " ".into()),
            Err(GitContextEngineError::Config(GitContextEngineConfigError::MissingToken))
        ));
        assert!(matches!(
            GitLabClient::new(Client::new(), "gitlab.com".into(), "t".into()),
            Err(GitContextEngineError::Config(GitContextEngineConfigError::InvalidBaseUrl(_)))
        ));
    }
}
