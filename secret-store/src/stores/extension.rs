//! AWS Parameters and Secrets Lambda Extension backend.
//!
//! The extension runs next to the function and exposes a local HTTP API:
//!   * GET {endpoint}/secretsmanager/get?secretId={locator}
//!
//! Requests are authenticated with the session token in
//! `X-Aws-Parameters-Secrets-Token`. The response body is the Secrets Manager
//! `GetSecretValue` document, which carries either `SecretString` or
//! `SecretBinary` (base64).

use std::time::Instant;

use serde::Deserialize;
use tracing::{debug, error};

use crate::{
    credentials::SecretPayload,
    errors::{SecretError, SecretResult, StoreError},
};

const TOKEN_HEADER: &str = "X-Aws-Parameters-Secrets-Token";
const SNIPPET_MAX_CHARS: usize = 200;

/// Client for the secrets extension.
#[derive(Debug, Clone)]
pub struct ExtensionStore {
    http: reqwest::Client,
    url_get: String,
    session_token: String,
}

impl ExtensionStore {
    /// # Errors
    /// `StoreError::Config` if `endpoint` is not http/https.
    pub fn new(endpoint: &str, session_token: impl Into<String>) -> SecretResult<Self> {
        let endpoint = endpoint.trim().trim_end_matches('/');
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(StoreError::Config(format!(
                "extension endpoint must start with http:// or https://, got `{endpoint}`"
            ))
            .into());
        }

        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            url_get: format!("{endpoint}/secretsmanager/get"),
            session_token: session_token.into(),
        })
    }

    /// Reads one secret payload.
    pub async fn get_secret(&self, locator: &str) -> SecretResult<SecretPayload> {
        let started = Instant::now();
        debug!(url = %self.url_get, "GET secret from extension");

        let resp = self
            .http
            .get(&self.url_get)
            .query(&[("secretId", locator)])
            .header(TOKEN_HEADER, &self.session_token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(SNIPPET_MAX_CHARS).collect();
            error!(
                status = status.as_u16(),
                %snippet,
                latency_ms = started.elapsed().as_millis(),
                "secrets extension returned non-success status"
            );
            return Err(StoreError::HttpStatus {
                status: status.as_u16(),
                snippet,
            }
            .into());
        }

        let body = resp.text().await?;
        let value: GetSecretValue = serde_json::from_str(&body).map_err(|e| {
            SecretError::Unexpected(format!(
                "extension response is not a GetSecretValue document: {e}"
            ))
        })?;

        debug!(
            latency_ms = started.elapsed().as_millis(),
            name = value.name.as_deref().unwrap_or("-"),
            "secret retrieved"
        );

        value.into_payload()
    }
}

/// Subset of the Secrets Manager `GetSecretValue` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetSecretValue {
    name: Option<String>,
    secret_string: Option<String>,
    secret_binary: Option<String>,
}

impl GetSecretValue {
    fn into_payload(self) -> SecretResult<SecretPayload> {
        match (self.secret_string, self.secret_binary) {
            (Some(text), _) => Ok(SecretPayload::Text(text)),
            (None, Some(binary)) => Ok(SecretPayload::Binary(binary)),
            (None, None) => Err(SecretError::Unexpected(
                "secret has neither SecretString nor SecretBinary".into(),
            )),
        }
    }
}
