//! `/patients` endpoints.

use api_shared::{FormatQuery, PatientListRes, PatientQuery, PatientReq, PatientRes};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use fhir::Bundle;
use paeds_core::CoreError;

use crate::error::ApiResult;
use crate::extractors::{ApiJson, ApiQuery};
use crate::response::{created, FhirJson};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/patients",
    request_body = PatientReq,
    responses(
        (status = 201, description = "Patient registered", body = PatientRes),
        (status = 400, description = "Validation failed; OperationOutcome lists every bad field"),
        (status = 413, description = "Body too large"),
        (status = 415, description = "Unsupported media type")
    )
)]
/// Register a patient
///
/// The new record's location is returned in the `Location` header.
#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PatientReq>,
) -> ApiResult<Response> {
    let patient = state.services.patients.create(&req)?;
    Ok(created(format!("/patients/{}", patient.id), patient))
}

#[utoipa::path(
    get,
    path = "/patients",
    params(PatientQuery, FormatQuery),
    responses(
        (status = 200, description = "Page of patients, or a searchset Bundle with _format=fhir", body = PatientListRes),
        (status = 400, description = "Invalid filter or paging")
    )
)]
/// List patients
///
/// Filters by family-name prefix and gender; ordered by registration.
#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PatientQuery>,
    ApiQuery(format): ApiQuery<FormatQuery>,
) -> ApiResult<Response> {
    if format.wants_fhir() {
        let page = state.services.patients.list_resources(&query)?;
        let bundle = Bundle::searchset(page.total, &page.items).map_err(CoreError::from)?;
        return Ok(FhirJson(bundle).into_response());
    }
    Ok(Json(state.services.patients.list(&query)?).into_response())
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id"), FormatQuery),
    responses(
        (status = 200, description = "Patient, or the FHIR Patient with _format=fhir", body = PatientRes),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "No such patient")
    )
)]
/// Read a patient
#[axum::debug_handler]
pub async fn read_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(format): ApiQuery<FormatQuery>,
) -> ApiResult<Response> {
    if format.wants_fhir() {
        let patient = state.services.patients.get_resource(&id)?;
        return Ok(FhirJson(patient).into_response());
    }
    Ok(Json(state.services.patients.get(&id)?).into_response())
}

#[utoipa::path(
    put,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    request_body = PatientReq,
    responses(
        (status = 200, description = "Patient replaced", body = PatientRes),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "No such patient")
    )
)]
/// Replace a patient
///
/// The whole record is replaced; the version is incremented.
#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<PatientReq>,
) -> ApiResult<Json<PatientRes>> {
    Ok(Json(state.services.patients.update(&id, &req)?))
}

#[utoipa::path(
    delete,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 204, description = "Patient deleted"),
        (status = 404, description = "No such patient"),
        (status = 409, description = "Observations or appointments still reference the patient")
    )
)]
/// Delete a patient
#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.services.patients.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
