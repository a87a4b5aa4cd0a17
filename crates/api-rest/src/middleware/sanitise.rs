//! Input sanitisation for request bodies.
//!
//! Runs innermost, just before the handler. For `POST`/`PUT`/`PATCH` with a body it enforces the
//! media type and size limit, requires well-formed JSON and cleans every string value.

use std::sync::LazyLock;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use regex::Regex;
use serde_json::Value;

use crate::error::ApiError;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("HTML tag pattern should compile"));

const ACCEPTED_MEDIA_TYPES: &[&str] = &["application/json", "application/fhir+json"];

/// Strip HTML tags, drop control characters other than newline and tab, then trim.
pub fn clean_text(value: &str) -> String {
    let without_tags = HTML_TAG.replace_all(value, "");
    without_tags
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Apply [`clean_text`] to every string in `value`.
pub fn sanitise_strings(value: &mut Value) {
    match value {
        Value::String(s) => *s = clean_text(s),
        Value::Array(items) => items.iter_mut().for_each(sanitise_strings),
        Value::Object(map) => map.values_mut().for_each(sanitise_strings),
        _ => {}
    }
}

fn check_media_type(headers: &HeaderMap) -> Result<(), ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let media_type = content_type.split(';').next().unwrap_or_default().trim();

    if ACCEPTED_MEDIA_TYPES
        .iter()
        .any(|accepted| media_type.eq_ignore_ascii_case(accepted))
    {
        Ok(())
    } else if media_type.is_empty() {
        Err(ApiError::UnsupportedMediaType(
            "Content-Type is required for request bodies".into(),
        ))
    } else {
        Err(ApiError::UnsupportedMediaType(format!(
            "'{media_type}' is not accepted; use application/json or application/fhir+json"
        )))
    }
}

async fn sanitise_request(req: Request, limit: usize) -> Result<Request, ApiError> {
    if !matches!(*req.method(), Method::POST | Method::PUT | Method::PATCH) {
        return Ok(req);
    }

    let declared = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(ApiError::PayloadTooLarge { limit });
    }

    let (mut parts, body) = req.into_parts();
    let bytes = to_bytes(body, limit)
        .await
        .map_err(|_| ApiError::PayloadTooLarge { limit })?;

    // Bodiless actions such as cancel carry no media type.
    if bytes.is_empty() {
        return Ok(Request::from_parts(parts, Body::empty()));
    }
    check_media_type(&parts.headers)?;

    let mut value: Value = serde_json::from_slice(&bytes)
        .map_err(|err| ApiError::InvalidBody(format!("body is not valid JSON: {err}")))?;
    sanitise_strings(&mut value);

    let cleaned = serde_json::to_vec(&value)
        .map_err(|err| ApiError::Internal(format!("failed to re-encode request: {err}")))?;
    parts
        .headers
        .insert(header::CONTENT_LENGTH, HeaderValue::from(cleaned.len()));

    Ok(Request::from_parts(parts, Body::from(cleaned)))
}

pub async fn sanitise_middleware(
    State(limit): State<usize>,
    req: Request,
    next: Next,
) -> Response {
    match sanitise_request(req, limit).await {
        Ok(req) => next.run(req).await,
        Err(err) => err.into_response(),
    }
}
