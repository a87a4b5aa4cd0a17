//! Response helpers shared by the handlers.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::error::ApiError;

/// Media type of every FHIR payload the API emits.
pub const FHIR_JSON: &str = "application/fhir+json; charset=utf-8";

/// A FHIR resource rendered with the FHIR media type.
pub struct FhirJson<T>(pub T);

impl<T: Serialize> IntoResponse for FhirJson<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(body) => ([(header::CONTENT_TYPE, FHIR_JSON)], body).into_response(),
            Err(err) => {
                ApiError::Internal(format!("failed to render FHIR JSON: {err}")).into_response()
            }
        }
    }
}

/// `201 Created` with a `Location` header pointing at the new resource.
pub fn created<T: Serialize>(location: String, body: T) -> Response {
    let mut response = (StatusCode::CREATED, Json(body)).into_response();
    match HeaderValue::from_str(&location) {
        Ok(value) => {
            response.headers_mut().insert(header::LOCATION, value);
        }
        Err(err) => tracing::warn!(%location, error = %err, "location is not a valid header"),
    }
    response
}
