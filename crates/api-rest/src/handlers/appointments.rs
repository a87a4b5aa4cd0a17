//! `/appointments` endpoints.

use api_shared::{
    AppointmentListRes, AppointmentQuery, AppointmentReq, AppointmentRes, CancelAppointmentReq,
    FormatQuery,
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use fhir::Bundle;
use paeds_core::CoreError;

use crate::error::ApiResult;
use crate::extractors::{decode_json, ApiJson, ApiQuery};
use crate::response::{created, FhirJson};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/appointments",
    request_body = AppointmentReq,
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentRes),
        (status = 400, description = "Validation failed or the patient does not exist"),
        (status = 413, description = "Body too large"),
        (status = 415, description = "Unsupported media type")
    )
)]
/// Book an appointment
///
/// The end time defaults to the start plus the visit type's usual length.
#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AppointmentReq>,
) -> ApiResult<Response> {
    let appointment = state.services.appointments.create(&req)?;
    Ok(created(format!("/appointments/{}", appointment.id), appointment))
}

#[utoipa::path(
    get,
    path = "/appointments",
    params(AppointmentQuery, FormatQuery),
    responses(
        (status = 200, description = "Page of appointments by start time, or a searchset Bundle with _format=fhir", body = AppointmentListRes),
        (status = 400, description = "Invalid filter or paging")
    )
)]
/// List appointments
///
/// Filters by patient, status and UTC start day.
#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AppointmentQuery>,
    ApiQuery(format): ApiQuery<FormatQuery>,
) -> ApiResult<Response> {
    if format.wants_fhir() {
        let page = state.services.appointments.list_resources(&query)?;
        let bundle = Bundle::searchset(page.total, &page.items).map_err(CoreError::from)?;
        return Ok(FhirJson(bundle).into_response());
    }
    Ok(Json(state.services.appointments.list(&query)?).into_response())
}

#[utoipa::path(
    get,
    path = "/appointments/{id}",
    params(("id" = String, Path, description = "Appointment id"), FormatQuery),
    responses(
        (status = 200, description = "Appointment, or the FHIR Appointment with _format=fhir", body = AppointmentRes),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "No such appointment")
    )
)]
/// Read an appointment
#[axum::debug_handler]
pub async fn read_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(format): ApiQuery<FormatQuery>,
) -> ApiResult<Response> {
    if format.wants_fhir() {
        let appointment = state.services.appointments.get_resource(&id)?;
        return Ok(FhirJson(appointment).into_response());
    }
    Ok(Json(state.services.appointments.get(&id)?).into_response())
}

#[utoipa::path(
    put,
    path = "/appointments/{id}",
    params(("id" = String, Path, description = "Appointment id")),
    request_body = AppointmentReq,
    responses(
        (status = 200, description = "Appointment replaced", body = AppointmentRes),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "No such appointment")
    )
)]
/// Replace an appointment
///
/// Any status may be set here; the booking time is kept.
#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<AppointmentReq>,
) -> ApiResult<Json<AppointmentRes>> {
    Ok(Json(state.services.appointments.update(&id, &req)?))
}

#[utoipa::path(
    delete,
    path = "/appointments/{id}",
    params(("id" = String, Path, description = "Appointment id")),
    responses(
        (status = 204, description = "Appointment deleted"),
        (status = 404, description = "No such appointment")
    )
)]
/// Delete an appointment
#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.services.appointments.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/appointments/{id}/cancel",
    params(("id" = String, Path, description = "Appointment id")),
    request_body(content = CancelAppointmentReq, description = "Optional cancellation reason"),
    responses(
        (status = 200, description = "Appointment cancelled", body = AppointmentRes),
        (status = 404, description = "No such appointment"),
        (status = 409, description = "Appointment already fulfilled or cancelled")
    )
)]
/// Cancel an appointment
///
/// The body is optional; an empty request cancels without a reason.
#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<AppointmentRes>> {
    let req = if body.is_empty() {
        CancelAppointmentReq::default()
    } else {
        decode_json(&body)?
    };
    Ok(Json(state.services.appointments.cancel(&id, &req)?))
}
