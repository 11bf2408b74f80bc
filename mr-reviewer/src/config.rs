//! Explicit hook configuration.
//!
//! [`HookConfig`] is built once (usually from the environment) and handed to
//! [`crate::ReviewHook::new`]. Variables and defaults:
//!
//! | Field                   | Variable                | Default                     |
//! |-------------------------|-------------------------|-----------------------------|
//! | `secret_locator`        | `SECRETS_ARN`           | required                    |
//! | `secret_source`         | `SECRETS_SOURCE`        | `extension`                 |
//! | `secrets_extension_url` | `SECRETS_EXTENSION_URL` | `http://localhost:2773`     |
//! | `secrets_session_token` | `AWS_SESSION_TOKEN`     | empty                       |
//! | `gitlab_api_base`       | `GITLAB_API_BASE`       | `https://gitlab.com/api/v4` |
//! | `llm_provider`          | `LLM_KIND`              | `openai`                    |
//! | `llm_endpoint`          | `LLM_ENDPOINT`          | `https://api.openai.com`    |
//! | `model`                 | `LLM_MODEL`             | `gpt-4o-mini`               |
//! | `llm_timeout_secs`      | `LLM_TIMEOUT_SECS`      | none                        |
//! | `wrap_width`            | `MARKDOWN_WRAP_WIDTH`   | `120`                       |

use std::{fmt, str::FromStr};

use ai_llm_service::LlmProvider;
use secret_store::{SecretLocator, SecretSource};

use crate::{errors::ConfigError, markdown::DEFAULT_WRAP_WIDTH};

pub const DEFAULT_SECRETS_EXTENSION_URL: &str = "http://localhost:2773";
pub const DEFAULT_GITLAB_API_BASE: &str = "https://gitlab.com/api/v4";
pub const DEFAULT_LLM_ENDPOINT: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Clone)]
pub struct HookConfig {
    pub secret_locator: SecretLocator,
    pub secret_source: SecretSource,
    pub secrets_extension_url: String,
    pub secrets_session_token: String,
    pub gitlab_api_base: String,
    pub llm_provider: LlmProvider,
    pub llm_endpoint: String,
    /// Pinned model identifier.
    pub model: String,
    pub llm_timeout_secs: Option<u64>,
    pub wrap_width: usize,
}

impl fmt::Debug for HookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookConfig")
            .field("secret_locator", &self.secret_locator)
            .field("secret_source", &self.secret_source)
            .field("secrets_extension_url", &self.secrets_extension_url)
            .field("secrets_session_token", &"<redacted>")
            .field("gitlab_api_base", &self.gitlab_api_base)
            .field("llm_provider", &self.llm_provider)
            .field("llm_endpoint", &self.llm_endpoint)
            .field("model", &self.model)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("wrap_width", &self.wrap_width)
            .finish()
    }
}

impl HookConfig {
    /// Config with every default applied and the given secret locator.
    pub fn new(secret_locator: impl Into<String>) -> Self {
        Self {
            secret_locator: SecretLocator::new(secret_locator),
            secret_source: SecretSource::Extension,
            secrets_extension_url: DEFAULT_SECRETS_EXTENSION_URL.to_string(),
            secrets_session_token: String::new(),
            gitlab_api_base: DEFAULT_GITLAB_API_BASE.to_string(),
            llm_provider: LlmProvider::OpenAI,
            llm_endpoint: DEFAULT_LLM_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            llm_timeout_secs: None,
            wrap_width: DEFAULT_WRAP_WIDTH,
        }
    }

    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads variables through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let locator = get("SECRETS_ARN").ok_or(ConfigError::Missing("SECRETS_ARN"))?;
        let mut cfg = Self::new(locator);

        if let Some(v) = get("SECRETS_SOURCE") {
            cfg.secret_source = v.parse().map_err(|reason| ConfigError::Invalid {
                var: "SECRETS_SOURCE",
                reason,
            })?;
        }
        if let Some(v) = get("SECRETS_EXTENSION_URL") {
            cfg.secrets_extension_url = v;
        }
        if let Some(v) = get("AWS_SESSION_TOKEN") {
            cfg.secrets_session_token = v;
        }
        if let Some(v) = get("GITLAB_API_BASE") {
            cfg.gitlab_api_base = v;
        }
        if let Some(v) = get("LLM_KIND") {
            cfg.llm_provider = v.parse().map_err(|e| ConfigError::Invalid {
                var: "LLM_KIND",
                reason: format!("{e}"),
            })?;
        }
        if let Some(v) = get("LLM_ENDPOINT") {
            cfg.llm_endpoint = v;
        }
        if let Some(v) = get("LLM_MODEL") {
            cfg.model = v;
        }
        if let Some(v) = get("LLM_TIMEOUT_SECS") {
            cfg.llm_timeout_secs = Some(parse_number("LLM_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = get("MARKDOWN_WRAP_WIDTH") {
            cfg.wrap_width = parse_number("MARKDOWN_WRAP_WIDTH", &v)?;
        }

        Ok(cfg)
    }
}

fn parse_number<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: format!("`{value}`: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_locator_is_set() {
        let cfg =
            HookConfig::from_lookup(lookup(&[("SECRETS_ARN", "arn:aws:secret:hook")])).unwrap();
        assert_eq!(cfg.secret_locator.as_str(), "arn:aws:secret:hook");
        assert_eq!(cfg.secret_source, SecretSource::Extension);
        assert_eq!(cfg.gitlab_api_base, DEFAULT_GITLAB_API_BASE);
        assert_eq!(cfg.llm_provider, LlmProvider::OpenAI);
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.llm_timeout_secs, None);
        assert_eq!(cfg.wrap_width, 120);
    }

    #[test]
    fn locator_is_required() {
        let err = HookConfig::from_lookup(lookup(&[("SECRETS_ARN", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SECRETS_ARN")));
    }

    #[test]
    fn overrides_are_read() {
        let cfg = HookConfig::from_lookup(lookup(&[
            ("SECRETS_ARN", "/run/secrets/hook.json"),
            ("SECRETS_SOURCE", "file"),
            ("GITLAB_API_BASE", "https://git.example.com/api/v4"),
            ("LLM_KIND", "ollama"),
            ("LLM_ENDPOINT", "http://localhost:11434"),
            ("LLM_MODEL", "qwen3:14b"),
            ("LLM_TIMEOUT_SECS", "30"),
            ("MARKDOWN_WRAP_WIDTH", "80"),
        ]))
        .unwrap();
        assert_eq!(cfg.secret_source, SecretSource::File);
        assert_eq!(cfg.llm_provider, LlmProvider::Ollama);
        assert_eq!(cfg.llm_timeout_secs, Some(30));
        assert_eq!(cfg.wrap_width, 80);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for (var, value) in [
            ("MARKDOWN_WRAP_WIDTH", "wide"),
            ("LLM_TIMEOUT_SECS", "-1"),
            ("LLM_KIND", "bard"),
            ("SECRETS_SOURCE", "vault"),
        ] {
            let err = HookConfig::from_lookup(lookup(&[("SECRETS_ARN", "x"), (var, value)]))
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { var: v, .. } if v == var),
                "{var}={value}"
            );
        }
    }

    #[test]
    fn debug_redacts_session_token() {
        let mut cfg = HookConfig::new("x");
        cfg.secrets_session_token = "very-secret".into();
        assert!(!format!("{cfg:?}").contains("very-secret"));
    }
}
