//! Completion service clients shared by the review hook.
//!
//! - [`config`]: model configuration and provider selection.
//! - [`services`]: thin HTTP clients for OpenAI-compatible and Ollama backends.
//! - [`structured`]: named output channels (JSON-schema structured output).
//! - [`llm_client`]: enum dispatch over the concrete services.
//! - [`telemetry`]: crate-scoped `tracing` layer.

pub mod config;
pub mod error_handler;
pub mod llm_client;
pub mod services;
pub mod structured;
pub mod telemetry;

pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::{AiLlmError, Result};
pub use llm_client::LlmClient;
pub use structured::OutputChannel;
