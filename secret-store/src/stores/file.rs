//! Local file backend for development: the locator is a path whose content
//! is the secret string.

use std::path::PathBuf;

use tracing::debug;

use crate::{
    credentials::SecretPayload,
    errors::{SecretError, SecretResult},
};

#[derive(Debug, Clone, Default)]
pub struct FileStore;

impl FileStore {
    pub async fn get_secret(&self, locator: &str) -> SecretResult<SecretPayload> {
        let path = PathBuf::from(locator);
        debug!(path = %path.display(), "reading secret from file");
        let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
            SecretError::Unexpected(format!("cannot read {}: {e}", path.display()))
        })?;
        Ok(SecretPayload::Text(text))
    }
}
