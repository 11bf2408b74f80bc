use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use mr_reviewer::{HookResponse, InvocationContext, InvocationEvent};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{core::app_state::AppState, error_handler::AppResult, middleware_layer::request_id};

/// POST /2015-03-31/functions/function/invocations
///
/// Runtime-emulator shaped entry point. The request body is the invocation
/// event (gateway proxy event or bare webhook JSON); the reply is always 200
/// with the `{statusCode, headers, body}` envelope. Only a body that is not
/// JSON at all is rejected with 400.
#[instrument(skip_all)]
pub async fn invoke(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<HookResponse>> {
    let value: Value = serde_json::from_slice(&body)?;
    let event = InvocationEvent::from_value(value);

    let id = event
        .request_id()
        .map(str::to_string)
        .or_else(|| request_id::request_id(&headers))
        .unwrap_or_else(|| InvocationContext::generate().request_id().to_string());
    let mut ctx = InvocationContext::new(id);
    debug!(request_id = %ctx.request_id(), method = event.method(), "invocation received");

    let response = state.hook.handle(&event, &mut ctx).await;
    Ok(Json(response))
}
