//! Correlation id middleware.

use std::sync::LazyLock;

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use regex::Regex;
use tracing::Span;
use uuid::Uuid;

static CLIENT_REQUEST_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._\-]{1,128}$").expect("request id pattern should compile")
});

/// Per-request context made available to inner middleware and handlers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
}

/// The id to use for this request: the client's `X-Request-Id` when it is well formed,
/// otherwise a fresh UUID.
fn resolve_request_id(client_id: Option<&str>) -> String {
    client_id
        .filter(|id| CLIENT_REQUEST_ID.is_match(id))
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Assigns every request an id, records it on the request span and echoes it back.
///
/// - `X-Request-Id` is always set on the response.
/// - A client `X-Correlation-Id` is echoed unchanged.
#[tracing::instrument(
    name = "http_request",
    skip_all,
    fields(
        http.method = %req.method(),
        http.route = %req.uri().path(),
        http.response.status_code = tracing::field::Empty,
        request_id = tracing::field::Empty,
    )
)]
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let span = Span::current();

    let request_id = resolve_request_id(
        req.headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
    );
    let correlation_id = req.headers().get("x-correlation-id").cloned();
    span.record("request_id", request_id.as_str());

    req.extensions_mut().insert(RequestContext {
        request_id: request_id.clone(),
    });

    let mut response = next.run(req).await;
    span.record("http.response.status_code", response.status().as_u16());

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        headers.insert("x-request-id", value);
    }
    if let Some(value) = correlation_id {
        headers.insert("x-correlation-id", value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_well_formed_client_ids() {
        assert_eq!(resolve_request_id(Some("abc-123_x.y")), "abc-123_x.y");
    }

    #[test]
    fn replaces_malformed_client_ids() {
        let too_long = "a".repeat(129);
        for bad in ["", "has space", "semi;colon", too_long.as_str()] {
            let id = resolve_request_id(Some(bad));
            assert_ne!(id, bad);
            assert!(Uuid::parse_str(&id).is_ok());
        }
        assert!(Uuid::parse_str(&resolve_request_id(None)).is_ok());
    }
}
