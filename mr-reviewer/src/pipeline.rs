//! Pipeline orchestration.
//!
//! Flow per invocation:
//!   1) method check (`POST` only);
//!   2) classify the event; ignored events stop here;
//!   3) credentials from the secret store;
//!   4) raw diff from GitLab;
//!   5) one completion call for the summary;
//!   6) markdown normalization;
//!   7) response assembly.
//!
//! Each stage failure becomes exactly one [`Outcome`]; nothing escapes
//! [`ReviewHook::handle`] and nothing is retried.

use std::{any::Any, panic::AssertUnwindSafe};

use ai_llm_service::config::default_config::config_review_summary;
use futures::FutureExt;
use git_context_engine::{ChangeRequestId, ProviderConfig, fetch_merge_request_diff};
use secret_store::{CredentialBundle, SecretStoreClient, SecretStoreConfig};
use serde_json::Value;
use tracing::{info, instrument};

use crate::{
    config::HookConfig,
    context::{InvocationContext, Stage},
    errors::{ConfigError, Error, MrResult},
    event::{Classification, InvocationEvent, classify},
    markdown::{self, FormatOptions},
    outcome::{Outcome, UpstreamStage, Validation},
    response::{HookResponse, build_response},
    review::ReviewRequester,
};

const ALLOWED_METHOD: &str = "POST";

/// The review hook. Holds immutable configuration only, so one value can be
/// shared across concurrent invocations.
#[derive(Debug, Clone)]
pub struct ReviewHook {
    config: HookConfig,
    requester: ReviewRequester,
}

impl ReviewHook {
    /// Validates the model settings up front; everything else is checked per
    /// invocation.
    pub fn new(config: HookConfig) -> MrResult<Self> {
        let model_cfg = config_review_summary(
            config.llm_provider,
            &config.llm_endpoint,
            &config.model,
            config.llm_timeout_secs,
        )
        .map_err(|e| ConfigError::Model(e.to_string()))?;

        info!(
            provider = %config.llm_provider,
            model = %model_cfg.model,
            secret_source = ?config.secret_source,
            gitlab_api_base = %config.gitlab_api_base,
            wrap_width = config.wrap_width,
            "review hook configured"
        );

        Ok(Self {
            requester: ReviewRequester::new(model_cfg),
            config,
        })
    }

    /// Runs one invocation and returns its response.
    pub async fn handle(
        &self,
        event: &InvocationEvent,
        ctx: &mut InvocationContext,
    ) -> HookResponse {
        let outcome = self.run(event, ctx).await;
        let response = build_response(&outcome);
        ctx.info(
            Stage::Respond,
            format!(
                "outcome={} status={} elapsed_ms={}",
                outcome.kind(),
                response.status_code,
                ctx.elapsed().as_millis()
            ),
        );
        response
    }

    /// Convenience for raw JSON events; the request id is taken from the
    /// gateway context when present.
    pub async fn handle_value(&self, value: Value) -> HookResponse {
        let event = InvocationEvent::from_value(value);
        let mut ctx = match event.request_id() {
            Some(id) => InvocationContext::new(id),
            None => InvocationContext::generate(),
        };
        self.handle(&event, &mut ctx).await
    }

    /// Runs the stages and returns the terminal outcome.
    #[instrument(skip_all, fields(request_id = %ctx.request_id()))]
    pub async fn run(&self, event: &InvocationEvent, ctx: &mut InvocationContext) -> Outcome {
        let method = event.method().to_string();
        if method != ALLOWED_METHOD {
            ctx.warn(Stage::Classify, format!("rejected method {method}"));
            return Outcome::ValidationFailure {
                detail: Validation::MethodNotAllowed { method },
            };
        }

        let (project_id, request_iid) = match classify(&event.inbound()) {
            Classification::Actionable {
                project_id,
                request_iid,
            } => (project_id, request_iid),
            Classification::Ignored(reason) => {
                ctx.info(Stage::Classify, format!("ignored: {}", reason.as_str()));
                return Outcome::Ignored { reason };
            }
        };
        ctx.info(
            Stage::Classify,
            format!("actionable merge request project={project_id} iid={request_iid}"),
        );

        match guarded(self.review(project_id, request_iid, ctx)).await {
            Ok(formatted_body) => Outcome::Success {
                method,
                formatted_body,
            },
            Err(e) => {
                let stage = e.stage();
                let detail = e.to_string();
                let at = match stage {
                    UpstreamStage::SecretStore | UpstreamStage::SecretParse => Stage::Credentials,
                    UpstreamStage::DiffFetch => Stage::DiffFetch,
                    UpstreamStage::Completion => Stage::Completion,
                    UpstreamStage::Unexpected => Stage::Respond,
                };
                ctx.error(at, format!("{} failure: {detail}", stage.as_str()));
                Outcome::UpstreamFailure { stage, detail }
            }
        }
    }

    async fn review(
        &self,
        project_id: u64,
        request_iid: u64,
        ctx: &mut InvocationContext,
    ) -> MrResult<String> {
        let credentials = self.credentials(ctx).await?;

        let id = ChangeRequestId::new(project_id.to_string(), request_iid);
        let provider = ProviderConfig {
            base_api: self.config.gitlab_api_base.clone(),
            token: credentials.source_control_token.clone(),
        };
        let diff = fetch_merge_request_diff(provider, &id).await?;
        if diff.is_empty() {
            ctx.warn(Stage::DiffFetch, "merge request diff is empty; requesting summary anyway");
        } else {
            ctx.debug(
                Stage::DiffFetch,
                format!("diff bytes={} files={}", diff.len(), diff.file_count()),
            );
        }

        let review = self
            .requester
            .summarize(diff.as_str(), &credentials.model_api_key)
            .await?;
        ctx.debug(Stage::Completion, format!("summary chars={}", review.text.len()));

        let formatted = markdown::format(
            &review.text,
            &FormatOptions {
                wrap_width: self.config.wrap_width,
            },
        );
        ctx.debug(Stage::Format, format!("formatted chars={}", formatted.len()));
        Ok(formatted)
    }

    async fn credentials(&self, ctx: &mut InvocationContext) -> MrResult<CredentialBundle> {
        let store = SecretStoreClient::from_config(&SecretStoreConfig {
            source: self.config.secret_source,
            extension_endpoint: self.config.secrets_extension_url.clone(),
            session_token: self.config.secrets_session_token.clone(),
        })?;

        let bundle = store.fetch_credentials(&self.config.secret_locator).await?;
        ctx.debug(Stage::Credentials, "credentials retrieved");
        Ok(bundle)
    }
}

/// Runs a stage future, turning a panic inside it into [`Error::Unexpected`].
async fn guarded<T>(stage: impl Future<Output = MrResult<T>>) -> MrResult<T> {
    AssertUnwindSafe(stage)
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(Error::Unexpected(panic_message(panic.as_ref()))))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("stage panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("stage panicked: {s}")
    } else {
        "stage panicked".to_string()
    }
}
