//! Review Requester: one completion call per merge request.
//!
//! Flow:
//!   1) attach the per-invocation API key to the pinned model config;
//!   2) build the client for the configured provider;
//!   3) send [`prompt::PromptPair`] and read the `summary` channel.
//!
//! Every failure is an [`crate::errors::UpstreamCallError::Completion`]; nothing is retried.

pub mod prompt;

use std::time::Instant;

use ai_llm_service::{LlmClient, LlmModelConfig};
use tracing::{debug, info, warn};

use crate::errors::MrResult;
use prompt::{PROMPT_VERSION, PromptPair, SUMMARY};

/// Text of the `summary` channel, unformatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewResult {
    pub text: String,
}

/// Holds the validated model config; the API key arrives per invocation.
#[derive(Debug, Clone)]
pub struct ReviewRequester {
    model_cfg: LlmModelConfig,
}

impl ReviewRequester {
    pub fn new(model_cfg: LlmModelConfig) -> Self {
        Self { model_cfg }
    }

    /// Requests the summary for `diff`.
    pub async fn summarize(&self, diff: &str, api_key: &str) -> MrResult<ReviewResult> {
        let started = Instant::now();
        let prompt = PromptPair::for_diff(diff);

        debug!(
            provider = %self.model_cfg.provider,
            model = %self.model_cfg.model,
            prompt_version = PROMPT_VERSION,
            diff_len = diff.len(),
            "requesting review summary"
        );

        let cfg = self.model_cfg.clone().with_api_key(api_key);
        let client = LlmClient::from_config(cfg)?;
        let text = client
            .complete_channel(prompt.system, prompt.human, &SUMMARY)
            .await?;

        if text.trim().is_empty() {
            warn!(model = %self.model_cfg.model, "completion returned an empty summary");
        }
        info!(
            model = %self.model_cfg.model,
            summary_len = text.len(),
            latency_ms = started.elapsed().as_millis(),
            "review summary received"
        );

        Ok(ReviewResult { text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Error, UpstreamCallError};
    use ai_llm_service::{LlmProvider, config::default_config::config_review_summary};
    use serde_json::json;

    fn requester(endpoint: &str) -> ReviewRequester {
        ReviewRequester::new(
            config_review_summary(LlmProvider::OpenAI, endpoint, "gpt-4o-mini", None).unwrap(),
        )
    }

    #[tokio::test]
    async fn returns_summary_channel_text() {
        let mut server = mockito::Server::new_async().await;
        let content = json!({ "summary": "Adds a retry flag." }).to_string();
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(mockito::Matcher::PartialJson(json!({ "model": "gpt-4o-mini" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
                    .to_string(),
            )
            .create_async()
            .await;

        let result = requester(&server.url())
            .summarize("diff --git a/a b/a\n", "sk-test")
            .await
            .unwrap();
        assert_eq!(result.text, "Adds a retry flag.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_failure_is_a_completion_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let err = requester(&server.url())
            .summarize("diff", "sk-test")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Upstream(UpstreamCallError::Completion(_))
        ));
    }

    #[tokio::test]
    async fn blank_key_is_a_completion_error() {
        let err = requester("http://127.0.0.1:9")
            .summarize("diff", "  ")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Upstream(UpstreamCallError::Completion(_))
        ));
    }
}
