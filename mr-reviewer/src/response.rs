//! Maps an [`Outcome`] to an HTTP-shaped response.
//!
//! | Outcome                   | Status | `error` / `message`                                                        |
//! |---------------------------|--------|----------------------------------------------------------------------------|
//! | ignored                   | 200    | "Event ignored - <reason>" plus the discriminating field(s)                |
//! | method not allowed        | 405    | "Method Not Allowed" (+ `Allow: POST`)                                     |
//! | secret store              | 500    | "Internal Server Error" / "Failed to retrieve secret"                     |
//! | secret parse              | 500    | "Internal Server Error" / "Failed to parse secret"                        |
//! | diff fetch                | 502    | "Failed to contact GitLab API" / "Failed to fetch merge request diff"     |
//! | completion                | 502    | "Failed to contact completion service" / "Failed to generate review summary" |
//! | unexpected                | 500    | "Internal Server Error" / "An unexpected error occurred"                  |
//! | success                   | 200    | "Event received successfully", `method`, `data`                            |
//!
//! Every body carries a `timestamp` taken when the response is built.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    event::IgnoreReason,
    outcome::{Outcome, UpstreamStage, Validation},
};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";
pub const ALLOW: &str = "Allow";

/// `{statusCode, headers, body}`; `body` is a JSON document as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HookResponse {
    /// Parsed body; bodies built here always parse.
    pub fn body_json(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}

/// Builds the response for `outcome`, stamped with the current time.
pub fn build_response(outcome: &Outcome) -> HookResponse {
    build_response_at(outcome, Utc::now())
}

/// Same as [`build_response`] with an explicit timestamp.
pub fn build_response_at(outcome: &Outcome, now: DateTime<Utc>) -> HookResponse {
    let timestamp = now.to_rfc3339_opts(SecondsFormat::Micros, true);
    let mut headers = BTreeMap::from([(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())]);

    let (status_code, body) = match outcome {
        Outcome::Ignored { reason } => (200, ignored_body(reason, &timestamp)),

        Outcome::ValidationFailure {
            detail: Validation::MethodNotAllowed { method },
        } => {
            headers.insert(ALLOW.to_string(), "POST".to_string());
            (
                405,
                json!({
                    "error": "Method Not Allowed",
                    "message": format!(
                        "HTTP method {method} is not supported. Only POST requests are allowed."
                    ),
                    "timestamp": timestamp,
                }),
            )
        }

        Outcome::UpstreamFailure { stage, .. } => {
            let (status, error, message) = failure_fields(*stage);
            (
                status,
                json!({ "error": error, "message": message, "timestamp": timestamp }),
            )
        }

        Outcome::Success {
            method,
            formatted_body,
        } => (
            200,
            json!({
                "message": "Event received successfully",
                "method": method,
                "data": formatted_body,
                "timestamp": timestamp,
            }),
        ),
    };

    HookResponse {
        status_code,
        headers,
        body: body.to_string(),
    }
}

fn ignored_body(reason: &IgnoreReason, timestamp: &str) -> Value {
    let message = format!("Event ignored - {}", reason.as_str());
    match reason {
        IgnoreReason::NotMergeRequest {
            event_type,
            object_kind,
        } => json!({
            "message": message,
            "event_type": event_type,
            "object_kind": object_kind,
            "timestamp": timestamp,
        }),
        IgnoreReason::NotOpened { state } => json!({
            "message": message,
            "state": state,
            "timestamp": timestamp,
        }),
        IgnoreReason::MissingIdentifiers => json!({
            "message": message,
            "timestamp": timestamp,
        }),
    }
}

fn failure_fields(stage: UpstreamStage) -> (u16, &'static str, &'static str) {
    match stage {
        UpstreamStage::SecretStore => (500, "Internal Server Error", "Failed to retrieve secret"),
        UpstreamStage::SecretParse => (500, "Internal Server Error", "Failed to parse secret"),
        UpstreamStage::DiffFetch => (
            502,
            "Failed to contact GitLab API",
            "Failed to fetch merge request diff",
        ),
        UpstreamStage::Completion => (
            502,
            "Failed to contact completion service",
            "Failed to generate review summary",
        ),
        UpstreamStage::Unexpected => (
            500,
            "Internal Server Error",
            "An unexpected error occurred",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap()
    }

    fn body(resp: &HookResponse) -> Value {
        resp.body_json().unwrap()
    }

    #[test]
    fn success_carries_method_and_data() {
        let resp = build_response_at(
            &Outcome::Success {
                method: "POST".into(),
                formatted_body: "No issues found.\n".into(),
            },
            fixed_now(),
        );
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.headers.get(CONTENT_TYPE).map(String::as_str), Some(APPLICATION_JSON));
        let b = body(&resp);
        assert_eq!(b["message"], "Event received successfully");
        assert_eq!(b["method"], "POST");
        assert_eq!(b["data"], "No issues found.\n");
        assert_eq!(b["timestamp"], "2026-10-16T09:30:00.000000Z");
    }

    #[test]
    fn ignored_echoes_discriminating_fields() {
        let resp = build_response_at(
            &Outcome::Ignored {
                reason: IgnoreReason::NotMergeRequest {
                    event_type: Some("push".into()),
                    object_kind: None,
                },
            },
            fixed_now(),
        );
        let b = body(&resp);
        assert_eq!(resp.status_code, 200);
        assert_eq!(b["message"], "Event ignored - not a merge request event");
        assert_eq!(b["event_type"], "push");
        assert!(b["object_kind"].is_null());

        let resp = build_response_at(
            &Outcome::Ignored {
                reason: IgnoreReason::NotOpened {
                    state: Some("merged".into()),
                },
            },
            fixed_now(),
        );
        let b = body(&resp);
        assert_eq!(b["message"], "Event ignored - merge request not in opened state");
        assert_eq!(b["state"], "merged");
    }

    #[test]
    fn method_not_allowed_sets_allow_header() {
        let resp = build_response_at(
            &Outcome::ValidationFailure {
                detail: Validation::MethodNotAllowed {
                    method: "GET".into(),
                },
            },
            fixed_now(),
        );
        assert_eq!(resp.status_code, 405);
        assert_eq!(resp.headers.get(ALLOW).map(String::as_str), Some("POST"));
        let b = body(&resp);
        assert_eq!(b["error"], "Method Not Allowed");
        assert!(b["message"].as_str().unwrap().contains("GET"));
    }

    #[test]
    fn failures_map_to_fixed_status_and_message() {
        let cases = [
            (UpstreamStage::SecretStore, 500, "Failed to retrieve secret"),
            (UpstreamStage::SecretParse, 500, "Failed to parse secret"),
            (UpstreamStage::DiffFetch, 502, "Failed to fetch merge request diff"),
            (UpstreamStage::Completion, 502, "Failed to generate review summary"),
            (UpstreamStage::Unexpected, 500, "An unexpected error occurred"),
        ];
        for (stage, status, message) in cases {
            let resp = build_response_at(
                &Outcome::UpstreamFailure {
                    stage,
                    detail: "connection reset by peer at 10.0.0.1".into(),
                },
                fixed_now(),
            );
            assert_eq!(resp.status_code, status, "{stage:?}");
            assert!(!resp.headers.contains_key(ALLOW));
            let b = body(&resp);
            assert_eq!(b["message"], message);
            assert!(!resp.body.contains("10.0.0.1"), "detail leaked for {stage:?}");
        }
    }

    #[test]
    fn serializes_with_camel_case_status_code() {
        let resp = build_response_at(
            &Outcome::Ignored {
                reason: IgnoreReason::MissingIdentifiers,
            },
            fixed_now(),
        );
        let envelope = serde_json::to_value(&resp).unwrap();
        assert_eq!(envelope["statusCode"], 200);
        assert_eq!(envelope["headers"]["Content-Type"], "application/json");
        assert!(envelope["body"].is_string());
    }

    #[test]
    fn timestamp_is_taken_at_build_time() {
        let before = Utc::now();
        let resp = build_response(&Outcome::Ignored {
            reason: IgnoreReason::MissingIdentifiers,
        });
        let stamped = body(&resp)["timestamp"].as_str().unwrap().to_string();
        let parsed = DateTime::parse_from_rfc3339(&stamped).unwrap();
        assert!(parsed >= before - chrono::Duration::milliseconds(1));
    }
}
