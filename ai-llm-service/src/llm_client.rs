//! Provider facade without async-trait or dynamic trait objects.
//!
//! [`LlmClient`] wraps the concrete services and dispatches on the configured
//! provider, so callers hold one value regardless of backend.

use tracing::debug;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::Result,
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
    structured::OutputChannel,
};

/// Concrete completion client with enum dispatch.
#[derive(Debug)]
pub enum LlmClient {
    OpenAI(OpenAiService),
    Ollama(OllamaService),
}

impl LlmClient {
    /// Builds the client matching `cfg.provider`.
    pub fn from_config(cfg: LlmModelConfig) -> Result<Self> {
        debug!(provider = %cfg.provider, model = %cfg.model, "initializing completion client");
        match cfg.provider {
            LlmProvider::OpenAI => Ok(Self::OpenAI(OpenAiService::new(cfg)?)),
            LlmProvider::Ollama => Ok(Self::Ollama(OllamaService::new(cfg)?)),
        }
    }

    /// One system+user completion; returns the text of `channel`.
    pub async fn complete_channel(
        &self,
        system: &str,
        user: &str,
        channel: &OutputChannel,
    ) -> Result<String> {
        match self {
            Self::OpenAI(c) => c.complete_channel(system, user, channel).await,
            Self::Ollama(c) => c.complete_channel(system, user, channel).await,
        }
    }

    pub fn provider(&self) -> LlmProvider {
        match self {
            Self::OpenAI(_) => LlmProvider::OpenAI,
            Self::Ollama(_) => LlmProvider::Ollama,
        }
    }
}
