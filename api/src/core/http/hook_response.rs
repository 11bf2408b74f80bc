use axum::{
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use mr_reviewer::HookResponse;
use tracing::warn;

/// Writes a [`HookResponse`] as a real HTTP response: status, headers and the
/// JSON body text as-is.
pub struct HttpHookResponse(pub HookResponse);

impl IntoResponse for HttpHookResponse {
    fn into_response(self) -> Response {
        let HookResponse {
            status_code,
            headers,
            body,
        } = self.0;

        let status = StatusCode::from_u16(status_code).unwrap_or_else(|_| {
            warn!(status_code, "hook produced an invalid status code; sending 500");
            StatusCode::INTERNAL_SERVER_ERROR
        });

        let mut resp = (status, body).into_response();
        for (name, value) in headers {
            match (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                (Ok(n), Ok(v)) => {
                    resp.headers_mut().insert(n, v);
                }
                _ => warn!(header = %name, "skipping header that is not valid HTTP"),
            }
        }
        resp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn copies_status_and_headers() {
        let resp = HttpHookResponse(HookResponse {
            status_code: 405,
            headers: BTreeMap::from([
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Allow".to_string(), "POST".to_string()),
            ]),
            body: "{}".into(),
        })
        .into_response();

        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["allow"], "POST");
        assert_eq!(resp.headers()["content-type"], "application/json");
    }
}
