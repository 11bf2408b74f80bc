//! The credential bundle and the payload decoding rules.

use base64::Engine;
use serde::Deserialize;

use crate::errors::{SecretError, SecretResult};

const BASE64: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

/// Raw payload as returned by a store.
#[derive(Clone, PartialEq, Eq)]
pub enum SecretPayload {
    /// UTF-8 JSON text.
    Text(String),
    /// Base64 text whose decoded bytes must be ASCII JSON.
    Binary(String),
}

impl std::fmt::Debug for SecretPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretPayload::Text(s) => write!(f, "Text(<{} bytes>)", s.len()),
            SecretPayload::Binary(s) => write!(f, "Binary(<{} bytes>)", s.len()),
        }
    }
}

/// Tokens needed by one invocation.
///
/// Both keys are required and non-empty. Built fresh per invocation and
/// dropped with it; `Debug` never prints the values.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialBundle {
    pub source_control_token: String,
    pub model_api_key: String,
}

impl std::fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("source_control_token", &"<redacted>")
            .field("model_api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct RawBundle {
    source_control_token: Option<String>,
    model_api_key: Option<String>,
}

impl CredentialBundle {
    /// Decodes a store payload.
    ///
    /// - text payload: parsed as JSON
    /// - binary payload: base64 → ASCII text → JSON
    ///
    /// # Errors
    /// - [`SecretError::Parse`] for malformed JSON, a non-object, or
    ///   missing/empty keys
    /// - [`SecretError::Unexpected`] for invalid base64 or non-ASCII bytes
    pub fn from_payload(payload: &SecretPayload) -> SecretResult<Self> {
        match payload {
            SecretPayload::Text(text) => Self::from_json(text),
            SecretPayload::Binary(encoded) => {
                let bytes = BASE64.decode(encoded.trim()).map_err(|e| {
                    SecretError::Unexpected(format!("binary secret is not valid base64: {e}"))
                })?;
                if !bytes.is_ascii() {
                    return Err(SecretError::Unexpected(
                        "binary secret does not decode to ASCII text".into(),
                    ));
                }
                // ASCII is valid UTF-8.
                let text = String::from_utf8(bytes)
                    .map_err(|e| SecretError::Unexpected(e.to_string()))?;
                Self::from_json(&text)
            }
        }
    }

    fn from_json(text: &str) -> SecretResult<Self> {
        let raw: RawBundle = serde_json::from_str(text)
            .map_err(|e| SecretError::Parse(format!("secret is not a JSON object: {e}")))?;

        let source_control_token = require("source_control_token", raw.source_control_token)?;
        let model_api_key = require("model_api_key", raw.model_api_key)?;

        Ok(Self {
            source_control_token,
            model_api_key,
        })
    }
}

fn require(key: &'static str, value: Option<String>) -> SecretResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        Some(_) => Err(SecretError::Parse(format!("`{key}` is empty"))),
        None => Err(SecretError::Parse(format!("`{key}` is missing"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SecretFailureCause;

    const GOOD: &str = r#"{"source_control_token":"glpat-1","model_api_key":"sk-1","extra":1}"#;

    #[test]
    fn parses_text_payload() {
        let bundle = CredentialBundle::from_payload(&SecretPayload::Text(GOOD.into())).unwrap();
        assert_eq!(bundle.source_control_token, "glpat-1");
        assert_eq!(bundle.model_api_key, "sk-1");
    }

    #[test]
    fn parses_binary_payload() {
        let encoded = BASE64.encode(GOOD);
        let bundle = CredentialBundle::from_payload(&SecretPayload::Binary(encoded)).unwrap();
        assert_eq!(bundle.model_api_key, "sk-1");
    }

    #[test]
    fn malformed_json_is_parse_failure() {
        let err = CredentialBundle::from_payload(&SecretPayload::Text("{not json".into()))
            .unwrap_err();
        assert_eq!(err.cause(), SecretFailureCause::Parse);
    }

    #[test]
    fn binary_that_is_not_json_is_parse_failure() {
        let encoded = BASE64.encode("plain words");
        let err = CredentialBundle::from_payload(&SecretPayload::Binary(encoded)).unwrap_err();
        assert_eq!(err.cause(), SecretFailureCause::Parse);
    }

    #[test]
    fn missing_or_empty_keys_are_parse_failures() {
        for text in [
            r#"{"source_control_token":"t"}"#,
            r#"{"source_control_token":"t","model_api_key":"  "}"#,
            r#""just a string""#,
        ] {
            let payload = SecretPayload::Text(text.into());
            let err = CredentialBundle::from_payload(&payload).unwrap_err();
            assert_eq!(err.cause(), SecretFailureCause::Parse, "payload: {text}");
        }
    }

    #[test]
    fn invalid_base64_and_non_ascii_are_unexpected() {
        let err =
            CredentialBundle::from_payload(&SecretPayload::Binary("***".into())).unwrap_err();
        assert_eq!(err.cause(), SecretFailureCause::Unexpected);

        let encoded = BASE64.encode([0xC3_u8, 0xA9]);
        let err = CredentialBundle::from_payload(&SecretPayload::Binary(encoded)).unwrap_err();
        assert_eq!(err.cause(), SecretFailureCause::Unexpected);
    }

    #[test]
    fn debug_redacts_values() {
        let bundle = CredentialBundle::from_payload(&SecretPayload::Text(GOOD.into())).unwrap();
        let printed = format!("{bundle:?}");
        assert!(!printed.contains("glpat-1"));
        assert!(!printed.contains("sk-1"));
    }
}
