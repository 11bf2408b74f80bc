//! Named output channels.
//!
//! A completion is requested as a JSON object with exactly one string field
//! (the *channel*). Providers are asked to honour the schema natively
//! (`response_format` for OpenAI, `format` for Ollama); the reply is then
//! decoded here and the channel text extracted.

use serde_json::{Map, Value, json};

use crate::error_handler::{Provider, ProviderError, ProviderErrorKind, Result};

/// A single named text field expected in the model's structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputChannel {
    pub name: &'static str,
    pub description: &'static str,
}

impl OutputChannel {
    pub const fn new(name: &'static str, description: &'static str) -> Self {
        Self { name, description }
    }

    /// JSON schema of the object carrying this channel.
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        properties.insert(
            self.name.to_string(),
            json!({ "type": "string", "description": self.description }),
        );
        json!({
            "type": "object",
            "properties": properties,
            "required": [self.name],
            "additionalProperties": false,
        })
    }

    /// Decodes `raw` model output and returns the channel text.
    ///
    /// Tolerates a surrounding markdown code fence, which some models emit even
    /// in JSON mode.
    ///
    /// # Errors
    /// - `Decode` if `raw` is not a JSON object
    /// - `MissingChannel` if the field is absent or not a string
    pub fn extract(&self, provider: Provider, raw: &str) -> Result<String> {
        let body = strip_code_fence(raw.trim());
        let value: Value = serde_json::from_str(body).map_err(|e| {
            ProviderError::new(
                provider,
                ProviderErrorKind::Decode(format!("structured output is not JSON: {e}")),
            )
        })?;

        let Value::Object(mut fields) = value else {
            return Err(ProviderError::new(
                provider,
                ProviderErrorKind::Decode("structured output is not a JSON object".into()),
            )
            .into());
        };

        match fields.remove(self.name) {
            Some(Value::String(text)) => Ok(text),
            _ => Err(ProviderError::new(
                provider,
                ProviderErrorKind::MissingChannel(self.name.to_string()),
            )
            .into()),
        }
    }
}

fn strip_code_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    let Some(rest) = rest.strip_suffix("```") else {
        return s;
    };
    // Drop the info string (`json`) on the opening line.
    match rest.find('\n') {
        Some(nl) => rest[nl + 1..].trim(),
        None => rest.trim(),
    }
}
