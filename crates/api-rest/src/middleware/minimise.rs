//! Data minimisation of JSON responses.
//!
//! `null` members are dropped from every JSON response. Contact numbers and record numbers are
//! masked to their last four characters unless the caller declares a treatment purpose with
//! `X-Purpose-Of-Use: TREAT`.

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::error::ApiError;

/// Members whose string value is masked wherever they appear.
const MASKED_MEMBERS: &[&str] = &["phone", "mrn"];

/// FHIR arrays whose elements' `value` is masked.
const MASKED_FHIR_ARRAYS: &[&str] = &["telecom", "identifier"];

const VISIBLE_SUFFIX: usize = 4;

fn wants_full_detail(headers: &HeaderMap) -> bool {
    headers
        .get("x-purpose-of-use")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("TREAT"))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| {
            let media_type = ct.split(';').next().unwrap_or_default().trim();
            media_type.eq_ignore_ascii_case("application/json")
                || media_type.eq_ignore_ascii_case("application/fhir+json")
        })
}

/// Replace all but the last four characters with `*`.
pub fn mask_value(value: &str) -> String {
    let len = value.chars().count();
    // Short values would be fully revealed by their suffix.
    let hidden = if len <= VISIBLE_SUFFIX {
        len
    } else {
        len - VISIBLE_SUFFIX
    };
    value
        .chars()
        .enumerate()
        .map(|(i, c)| if i < hidden { '*' } else { c })
        .collect()
}

/// Drop `null` members and, when `mask` is set, mask identifying values in place.
pub fn minimise(value: &mut Value, mask: bool) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            for (key, member) in map.iter_mut() {
                if mask {
                    mask_member(key, member);
                }
                minimise(member, mask);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|item| minimise(item, mask)),
        _ => {}
    }
}

fn mask_member(key: &str, member: &mut Value) {
    if MASKED_MEMBERS.contains(&key) {
        if let Value::String(s) = member {
            *s = mask_value(s);
        }
    } else if MASKED_FHIR_ARRAYS.contains(&key) {
        if let Value::Array(items) = member {
            for item in items {
                if let Some(Value::String(s)) = item.get_mut("value") {
                    *s = mask_value(s);
                }
            }
        }
    }
}

pub async fn minimise_middleware(req: Request, next: Next) -> Response {
    let mask = !wants_full_detail(req.headers());
    let response = next.run(req).await;

    if !is_json(response.headers()) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            return ApiError::Internal(format!("failed to buffer response: {err}")).into_response()
        }
    };

    let Ok(mut value) = serde_json::from_slice::<Value>(&bytes) else {
        return Response::from_parts(parts, Body::from(bytes));
    };
    minimise(&mut value, mask);

    match serde_json::to_vec(&value) {
        Ok(body) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(body))
        }
        Err(err) => {
            ApiError::Internal(format!("failed to re-encode response: {err}")).into_response()
        }
    }
}
