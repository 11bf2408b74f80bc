//! Terminal result of one invocation.

use crate::event::IgnoreReason;

/// Stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamStage {
    SecretStore,
    SecretParse,
    DiffFetch,
    Completion,
    Unexpected,
}

impl UpstreamStage {
    pub fn as_str(self) -> &'static str {
        match self {
            UpstreamStage::SecretStore => "secret_store",
            UpstreamStage::SecretParse => "secret_parse",
            UpstreamStage::DiffFetch => "diff_fetch",
            UpstreamStage::Completion => "completion",
            UpstreamStage::Unexpected => "unexpected",
        }
    }
}

/// Request-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    MethodNotAllowed { method: String },
}

/// Exactly one per invocation; never retried.
///
/// `detail` fields are for diagnostics only and never reach a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ignored {
        reason: IgnoreReason,
    },
    ValidationFailure {
        detail: Validation,
    },
    UpstreamFailure {
        stage: UpstreamStage,
        detail: String,
    },
    Success {
        method: String,
        formatted_body: String,
    },
}

impl Outcome {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Ignored { .. } => "ignored",
            Outcome::ValidationFailure { .. } => "validation_failure",
            Outcome::UpstreamFailure { .. } => "upstream_failure",
            Outcome::Success { .. } => "success",
        }
    }
}
