//! Default model configuration for the review summary.
//!
//! The review hook pins one model per deployment. This module turns the
//! provider/endpoint/model triple into a validated [`LlmModelConfig`] with the
//! sampling defaults used for summaries. The API key is not part of the
//! deployment config: it is attached per invocation via
//! [`LlmModelConfig::with_api_key`] once credentials are retrieved.

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{ConfigError, Result, validate_http_endpoint, validate_range_f32},
};

/// Sampling temperature used for review summaries.
pub const REVIEW_TEMPERATURE: f32 = 0.2;

/// Constructs the config for the review-summary model.
///
/// # Defaults
/// - `temperature = Some(0.2)`
/// - `max_tokens = None`, `top_p = None`
///
/// # Errors
/// - [`ConfigError::EmptyModel`] if `model` is blank
/// - [`ConfigError::InvalidFormat`] if `endpoint` is not http/https
pub fn config_review_summary(
    provider: LlmProvider,
    endpoint: &str,
    model: &str,
    timeout_secs: Option<u64>,
) -> Result<LlmModelConfig> {
    if model.trim().is_empty() {
        return Err(ConfigError::EmptyModel.into());
    }
    validate_http_endpoint("endpoint", endpoint)?;
    validate_range_f32("temperature", REVIEW_TEMPERATURE, 0.0, 2.0)?;

    Ok(LlmModelConfig {
        provider,
        model: model.trim().to_string(),
        endpoint: endpoint.trim().trim_end_matches('/').to_string(),
        api_key: None,
        max_tokens: None,
        temperature: Some(REVIEW_TEMPERATURE),
        top_p: None,
        timeout_secs,
    })
}
