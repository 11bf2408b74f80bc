use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method},
};
use mr_reviewer::{InvocationContext, InvocationEvent};
use tracing::{debug, instrument};

use crate::{
    core::{app_state::AppState, http::hook_response::HttpHookResponse},
    middleware_layer::request_id,
};

/// ANY /webhook
///
/// Native GitLab webhook target: the request body is the webhook payload and
/// the hook response is written as the HTTP response. Every method is routed
/// here so that non-POST requests get the hook's 405.
#[instrument(skip_all, fields(%method))]
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> HttpHookResponse {
    let event = InvocationEvent::http(method.as_str(), String::from_utf8_lossy(&body));
    let mut ctx = match request_id::request_id(&headers) {
        Some(id) => InvocationContext::new(id),
        None => InvocationContext::generate(),
    };
    debug!(
        request_id = %ctx.request_id(),
        gitlab_event = headers.get("X-Gitlab-Event").and_then(|v| v.to_str().ok()),
        bytes = body.len(),
        "webhook received"
    );

    HttpHookResponse(state.hook.handle(&event, &mut ctx).await)
}
