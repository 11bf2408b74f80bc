//! Store facade with enum dispatch over the concrete backends.

pub mod extension;
pub mod file;

use std::str::FromStr;

use tracing::{debug, info};

use crate::{
    credentials::{CredentialBundle, SecretPayload},
    errors::{SecretResult, StoreError},
};

/// Which backend holds the secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    /// Lambda Parameters and Secrets extension (HTTP on localhost).
    Extension,
    /// Plain file, for local runs.
    File,
}

impl FromStr for SecretSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "extension" => Ok(SecretSource::Extension),
            "file" => Ok(SecretSource::File),
            other => Err(format!("unsupported secret source `{other}`")),
        }
    }
}

/// Configuration needed to build a [`SecretStoreClient`].
#[derive(Clone)]
pub struct SecretStoreConfig {
    pub source: SecretSource,
    /// Extension base URL, e.g. `http://localhost:2773`.
    pub extension_endpoint: String,
    /// Session token forwarded to the extension.
    pub session_token: String,
}

impl std::fmt::Debug for SecretStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretStoreConfig")
            .field("source", &self.source)
            .field("extension_endpoint", &self.extension_endpoint)
            .field("session_token", &"<redacted>")
            .finish()
    }
}

/// Opaque key of the secret inside the store (ARN, name or file path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretLocator(String);

impl SecretLocator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Concrete store client.
#[derive(Debug, Clone)]
pub enum SecretStoreClient {
    Extension(extension::ExtensionStore),
    File(file::FileStore),
}

impl SecretStoreClient {
    pub fn from_config(cfg: &SecretStoreConfig) -> SecretResult<Self> {
        debug!(source = ?cfg.source, "initializing secret store client");
        match cfg.source {
            SecretSource::Extension => Ok(Self::Extension(extension::ExtensionStore::new(
                &cfg.extension_endpoint,
                cfg.session_token.clone(),
            )?)),
            SecretSource::File => Ok(Self::File(file::FileStore)),
        }
    }

    /// Reads the raw payload stored under `locator`.
    pub async fn get_secret(&self, locator: &SecretLocator) -> SecretResult<SecretPayload> {
        if locator.as_str().trim().is_empty() {
            return Err(StoreError::Config("secret locator is empty".into()).into());
        }
        match self {
            Self::Extension(s) => s.get_secret(locator.as_str()).await,
            Self::File(s) => s.get_secret(locator.as_str()).await,
        }
    }

    /// One read from the store, decoded into a [`CredentialBundle`]. No retries.
    pub async fn fetch_credentials(
        &self,
        locator: &SecretLocator,
    ) -> SecretResult<CredentialBundle> {
        let payload = self.get_secret(locator).await?;
        let bundle = CredentialBundle::from_payload(&payload)?;
        info!("credential bundle retrieved");
        Ok(bundle)
    }
}
