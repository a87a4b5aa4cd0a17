//! HTTP error rendering.
//!
//! Every failure leaving the API is rendered as a FHIR `OperationOutcome`. Validation failures
//! carry one issue per offending field with `expression` set to the field path, so a client can
//! fix every problem in one round trip.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use fhir::{OperationOutcome, OperationOutcomeIssue};
use paeds_core::CoreError;

use crate::response::FHIR_JSON;

/// Errors returned by handlers and middleware.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The body is not JSON or does not match the expected shape.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(err) => match err {
                CoreError::InvalidInput(_)
                | CoreError::Validation(_)
                | CoreError::InvalidReference(_)
                | CoreError::InvalidId(_) => StatusCode::BAD_REQUEST,
                CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                CoreError::Conflict(_) => StatusCode::CONFLICT,
                CoreError::StoreUnavailable | CoreError::Fhir(_) | CoreError::Corrupt { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::InvalidBody(_) | ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `OperationOutcome` describing this error.
    ///
    /// Internal failures get a generic diagnostic; the detail only goes to the log.
    pub fn outcome(&self) -> OperationOutcome {
        let status = self.status();
        if status.is_server_error() {
            return OperationOutcome::error("exception", "An internal error occurred");
        }

        match self {
            ApiError::Core(CoreError::Validation(issues)) => OperationOutcome::new(
                issues
                    .iter()
                    .map(|issue| {
                        OperationOutcomeIssue::error("invalid", &issue.message).at(&issue.field)
                    })
                    .collect(),
            ),
            ApiError::Core(CoreError::NotFound { resource_type, id }) => OperationOutcome::error(
                "not-found",
                format!("{resource_type}/{id} was not found"),
            ),
            ApiError::InvalidBody(detail) => OperationOutcome::error("structure", detail),
            other => OperationOutcome::error(status_to_fhir_code(status), other.to_string()),
        }
    }
}

/// FHIR `IssueType` code for an HTTP status.
fn status_to_fhir_code(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "invalid",
        StatusCode::NOT_FOUND => "not-found",
        StatusCode::CONFLICT => "conflict",
        StatusCode::PAYLOAD_TOO_LARGE => "too-long",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "not-supported",
        StatusCode::TOO_MANY_REQUESTS => "throttled",
        _ => "exception",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }

        let body = match serde_json::to_vec(&self.outcome()) {
            Ok(body) => body,
            Err(err) => {
                tracing::error!(error = %err, "failed to serialise OperationOutcome");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        let mut response = (status, [(header::CONTENT_TYPE, FHIR_JSON)], body).into_response();
        if let ApiError::RateLimited { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paeds_core::FieldIssue;

    #[test]
    fn validation_issues_carry_field_expressions() {
        let err = ApiError::from(CoreError::Validation(vec![
            FieldIssue {
                field: "family".into(),
                message: "is required".into(),
            },
            FieldIssue {
                field: "guardian.phone".into(),
                message: "is not a valid phone number".into(),
            },
        ]));

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let outcome = err.outcome();
        assert_eq!(outcome.issue.len(), 2);
        assert_eq!(outcome.issue[1].code, "invalid");
        assert_eq!(outcome.issue[1].expression, ["guardian.phone"]);
    }

    #[test]
    fn statuses_follow_error_kind() {
        let not_found = ApiError::from(CoreError::not_found("Patient", "abc"));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.outcome().issue[0].code, "not-found");

        let conflict = ApiError::from(CoreError::Conflict("still referenced".into()));
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let reference = ApiError::from(CoreError::InvalidReference("Patient/x".into()));
        assert_eq!(reference.status(), StatusCode::BAD_REQUEST);

        assert_eq!(
            ApiError::PayloadTooLarge { limit: 10 }.outcome().issue[0].code,
            "too-long"
        );
        assert_eq!(
            ApiError::RateLimited { retry_after_secs: 3 }.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn internal_errors_hide_detail() {
        let err = ApiError::from(CoreError::StoreUnavailable);
        let outcome = err.outcome();
        assert_eq!(outcome.issue[0].code, "exception");
        assert_eq!(
            outcome.issue[0].diagnostics.as_deref(),
            Some("An internal error occurred")
        );
    }

    #[test]
    fn rate_limited_response_sets_retry_after() {
        let response = ApiError::RateLimited { retry_after_secs: 12 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "12");
        assert_eq!(response.headers()[header::CONTENT_TYPE], FHIR_JSON);
    }
}
