//! Error taxonomy for credential retrieval.
//!
//! Three causes, nothing else: the store could not be read, the payload could
//! not be parsed into a credential bundle, or something unanticipated happened.

use thiserror::Error;

pub type SecretResult<T> = Result<T, SecretError>;

/// Failure cause tag, stable across error detail changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretFailureCause {
    Store,
    Parse,
    Unexpected,
}

/// Root error type for the secret-store crate.
#[derive(Debug, Error)]
pub enum SecretError {
    /// Transport, authorization or availability failure of the store.
    #[error("secret store error: {0}")]
    Store(#[from] StoreError),

    /// Payload present but not a valid credential bundle.
    #[error("secret parse error: {0}")]
    Parse(String),

    /// Anything not anticipated by the two cases above.
    #[error("unexpected secret error: {0}")]
    Unexpected(String),
}

impl SecretError {
    pub fn cause(&self) -> SecretFailureCause {
        match self {
            SecretError::Store(_) => SecretFailureCause::Store,
            SecretError::Parse(_) => SecretFailureCause::Parse,
            SecretError::Unexpected(_) => SecretFailureCause::Unexpected,
        }
    }
}

/// Store-level failures, kept apart for diagnostics.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store answered with a non-2xx status.
    #[error("HTTP {status}: {snippet}")]
    HttpStatus { status: u16, snippet: String },

    /// Network/transport failure (connect, reset, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// Store configuration is unusable (empty locator, bad endpoint).
    #[error("invalid store configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => StoreError::HttpStatus {
                status: status.as_u16(),
                snippet: String::new(),
            },
            None => StoreError::Transport(e.to_string()),
        }
    }
}

impl From<reqwest::Error> for SecretError {
    fn from(e: reqwest::Error) -> Self {
        SecretError::Store(StoreError::from(e))
    }
}
