//! Inbound events and their classification.
//!
//! Two layers:
//! - [`InvocationEvent`]: what the transport hands over. Either a gateway
//!   proxy event (`httpMethod`, `body`, `isBase64Encoded`) carrying the
//!   webhook JSON in its body, or a direct invocation whose payload *is* the
//!   webhook JSON.
//! - [`InboundEvent`]: the recognized webhook fields. Every field is optional
//!   and read leniently, so a malformed payload lands in one of the ignore
//!   branches of [`classify`] instead of failing.

use base64::Engine;
use serde_json::{Map, Value};
use tracing::debug;

const BASE64: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

const MERGE_REQUEST: &str = "merge_request";
const OPENED: &str = "opened";

/// Recognized fields of a GitLab merge request webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundEvent {
    pub event_type: Option<String>,
    pub object_kind: Option<String>,
    pub object_attributes: Option<ObjectAttributes>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectAttributes {
    pub state: Option<String>,
    pub target_project_id: Option<u64>,
    pub iid: Option<u64>,
}

impl InboundEvent {
    /// Reads the recognized keys from a JSON value. Unknown keys and values of
    /// the wrong type are treated as absent.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        Self {
            event_type: string_field(obj, "event_type"),
            object_kind: string_field(obj, "object_kind"),
            object_attributes: obj
                .get("object_attributes")
                .and_then(Value::as_object)
                .map(|attrs| ObjectAttributes {
                    state: string_field(attrs, "state"),
                    target_project_id: id_field(attrs, "target_project_id"),
                    iid: id_field(attrs, "iid"),
                }),
        }
    }

    /// Parses webhook JSON text; anything unparseable is an empty event.
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                debug!(error = %e, "event body is not JSON; treating as empty mapping");
                Self::default()
            }
        }
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// GitLab sends numeric ids; numeric strings are accepted as well.
fn id_field(obj: &Map<String, Value>, key: &str) -> Option<u64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Transport-level envelope of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationEvent {
    /// Gateway proxy event; the webhook JSON travels in `body`.
    Gateway {
        http_method: String,
        body: Option<String>,
        is_base64_encoded: bool,
        request_id: Option<String>,
    },
    /// Direct invocation; the payload is the webhook JSON itself.
    Direct(Value),
}

impl InvocationEvent {
    /// Recognizes a gateway event by its `httpMethod` key; anything else is a
    /// direct invocation.
    pub fn from_value(value: Value) -> Self {
        let method = value
            .get("httpMethod")
            .and_then(Value::as_str)
            .map(str::to_string);
        let Some(http_method) = method else {
            return InvocationEvent::Direct(value);
        };
        InvocationEvent::Gateway {
            http_method,
            body: value.get("body").and_then(Value::as_str).map(str::to_string),
            is_base64_encoded: value
                .get("isBase64Encoded")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            request_id: value
                .pointer("/requestContext/requestId")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    /// Builds a gateway-shaped event from a plain HTTP request.
    pub fn http(method: impl Into<String>, body: impl Into<String>) -> Self {
        InvocationEvent::Gateway {
            http_method: method.into(),
            body: Some(body.into()),
            is_base64_encoded: false,
            request_id: None,
        }
    }

    /// HTTP method of the invocation. Direct invocations count as `POST`.
    pub fn method(&self) -> &str {
        match self {
            InvocationEvent::Gateway { http_method, .. } => http_method,
            InvocationEvent::Direct(_) => "POST",
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        match self {
            InvocationEvent::Gateway { request_id, .. } => request_id.as_deref(),
            InvocationEvent::Direct(_) => None,
        }
    }

    /// Extracts the webhook fields.
    pub fn inbound(&self) -> InboundEvent {
        match self {
            InvocationEvent::Direct(value) => InboundEvent::from_value(value),
            InvocationEvent::Gateway {
                body: None,
                ..
            } => InboundEvent::default(),
            InvocationEvent::Gateway {
                body: Some(body),
                is_base64_encoded,
                ..
            } => {
                if !is_base64_encoded {
                    return InboundEvent::from_json(body);
                }
                match BASE64.decode(body.trim()) {
                    Ok(bytes) => InboundEvent::from_json(&String::from_utf8_lossy(&bytes)),
                    Err(e) => {
                        debug!(error = %e, "event body is not valid base64; using empty mapping");
                        InboundEvent::default()
                    }
                }
            }
        }
    }
}

/// Why an event was not acted upon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// `event_type` or `object_kind` is not `merge_request`; both are echoed.
    NotMergeRequest {
        event_type: Option<String>,
        object_kind: Option<String>,
    },
    /// The merge request is not in `opened` state; the state is echoed.
    NotOpened { state: Option<String> },
    /// Opened merge request without project id or iid.
    MissingIdentifiers,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::NotMergeRequest { .. } => "not a merge request event",
            IgnoreReason::NotOpened { .. } => "merge request not in opened state",
            IgnoreReason::MissingIdentifiers => "merge request missing identifiers",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Actionable { project_id: u64, request_iid: u64 },
    Ignored(IgnoreReason),
}

/// Decides whether `event` is an opened merge request. Pure; no I/O.
///
/// Rules, in order:
/// 1. `event_type` or `object_kind` differs from `merge_request` → ignored.
/// 2. `object_attributes.state` differs from `opened` → ignored.
/// 3. otherwise actionable, provided both identifiers are present.
pub fn classify(event: &InboundEvent) -> Classification {
    let is_mr = event.event_type.as_deref() == Some(MERGE_REQUEST)
        && event.object_kind.as_deref() == Some(MERGE_REQUEST);
    if !is_mr {
        return Classification::Ignored(IgnoreReason::NotMergeRequest {
            event_type: event.event_type.clone(),
            object_kind: event.object_kind.clone(),
        });
    }

    let attrs = event.object_attributes.as_ref();
    let state = attrs.and_then(|a| a.state.clone());
    if state.as_deref() != Some(OPENED) {
        return Classification::Ignored(IgnoreReason::NotOpened { state });
    }

    match attrs.and_then(|a| a.target_project_id.zip(a.iid)) {
        Some((project_id, request_iid)) => Classification::Actionable {
            project_id,
            request_iid,
        },
        None => Classification::Ignored(IgnoreReason::MissingIdentifiers),
    }
}
