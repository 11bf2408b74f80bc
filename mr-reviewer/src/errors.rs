//! Crate-wide error hierarchy for mr-reviewer.
//!
//! Goals:
//! - Single root `Error` for all fallible pipeline stages.
//! - One closed variant per call site (credentials, diff fetch, completion),
//!   so the pipeline maps failures to outcomes without looking at client
//!   error types.
//! - Ergonomic `?` via `From` impls.

use ai_llm_service::AiLlmError;
use git_context_engine::GitContextEngineError;
use secret_store::{SecretError, SecretFailureCause};
use thiserror::Error;

use crate::outcome::UpstreamStage;

/// Convenient alias for crate-wide results.
pub type MrResult<T> = Result<T, Error>;

/// Root error type for the mr-reviewer crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Credential retrieval failed.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// A call to the source-control host or completion service failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamCallError),

    /// Configuration problems (missing locator, bad numbers, bad provider).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Anything not anticipated by the variants above.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Pipeline stage the failure is reported under.
    pub fn stage(&self) -> UpstreamStage {
        match self {
            Error::Credential(CredentialError::Store(_)) => UpstreamStage::SecretStore,
            Error::Credential(CredentialError::Parse(_)) => UpstreamStage::SecretParse,
            Error::Credential(CredentialError::Unexpected(_)) => UpstreamStage::Unexpected,
            Error::Upstream(UpstreamCallError::DiffFetch(_)) => UpstreamStage::DiffFetch,
            Error::Upstream(UpstreamCallError::Completion(_)) => UpstreamStage::Completion,
            Error::Config(_) | Error::Unexpected(_) => UpstreamStage::Unexpected,
        }
    }
}

/// Credential failures, one variant per cause.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("secret store failure: {0}")]
    Store(String),

    #[error("secret parse failure: {0}")]
    Parse(String),

    #[error("unexpected credential failure: {0}")]
    Unexpected(String),
}

impl From<SecretError> for CredentialError {
    fn from(e: SecretError) -> Self {
        let detail = e.to_string();
        match e.cause() {
            SecretFailureCause::Store => CredentialError::Store(detail),
            SecretFailureCause::Parse => CredentialError::Parse(detail),
            SecretFailureCause::Unexpected => CredentialError::Unexpected(detail),
        }
    }
}

impl From<SecretError> for Error {
    fn from(e: SecretError) -> Self {
        Error::Credential(CredentialError::from(e))
    }
}

/// Failures of the two outbound calls. Sub-causes stay in the source error
/// for diagnostics only.
#[derive(Debug, Error)]
pub enum UpstreamCallError {
    #[error("diff fetch failed: {0}")]
    DiffFetch(#[from] GitContextEngineError),

    #[error("completion failed: {0}")]
    Completion(#[from] AiLlmError),
}

impl From<GitContextEngineError> for Error {
    fn from(e: GitContextEngineError) -> Self {
        Error::Upstream(UpstreamCallError::DiffFetch(e))
    }
}

impl From<AiLlmError> for Error {
    fn from(e: AiLlmError) -> Self {
        Error::Upstream(UpstreamCallError::Completion(e))
    }
}

/// Configuration errors raised while building the hook.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("invalid model configuration: {0}")]
    Model(String),
}
