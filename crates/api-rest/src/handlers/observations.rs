//! `/observations` endpoints.

use api_shared::{
    FormatQuery, ObservationListRes, ObservationQuery, ObservationReq, ObservationRes,
};
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
    path = "/observations",
    request_body = ObservationReq,
    responses(
        (status = 201, description = "Observation recorded", body = ObservationRes),
        (status = 400, description = "Validation failed or the patient does not exist"),
        (status = 413, description = "Body too large"),
        (status = 415, description = "Unsupported media type")
    )
)]
/// Record a vital-sign observation
///
/// The reference range and interpretation are derived from the patient's age on the
/// effective date.
#[axum::debug_handler]
pub async fn create_observation(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ObservationReq>,
) -> ApiResult<Response> {
    let observation = state.services.observations.create(&req)?;
    Ok(created(format!("/observations/{}", observation.id), observation))
}

#[utoipa::path(
    get,
    path = "/observations",
    params(ObservationQuery, FormatQuery),
    responses(
        (status = 200, description = "Page of observations, newest first, or a searchset Bundle with _format=fhir", body = ObservationListRes),
        (status = 400, description = "Invalid filter or paging")
    )
)]
/// List observations
///
/// Filters by patient and vital sign.
#[axum::debug_handler]
pub async fn list_observations(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ObservationQuery>,
    ApiQuery(format): ApiQuery<FormatQuery>,
) -> ApiResult<Response> {
    if format.wants_fhir() {
        let page = state.services.observations.list_resources(&query)?;
        let bundle = Bundle::searchset(page.total, &page.items).map_err(CoreError::from)?;
        return Ok(FhirJson(bundle).into_response());
    }
    Ok(Json(state.services.observations.list(&query)?).into_response())
}

#[utoipa::path(
    get,
    path = "/observations/{id}",
    params(("id" = String, Path, description = "Observation id"), FormatQuery),
    responses(
        (status = 200, description = "Observation, or the FHIR Observation with _format=fhir", body = ObservationRes),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "No such observation")
    )
)]
/// Read an observation
#[axum::debug_handler]
pub async fn read_observation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiQuery(format): ApiQuery<FormatQuery>,
) -> ApiResult<Response> {
    if format.wants_fhir() {
        let observation = state.services.observations.get_resource(&id)?;
        return Ok(FhirJson(observation).into_response());
    }
    Ok(Json(state.services.observations.get(&id)?).into_response())
}

#[utoipa::path(
    put,
    path = "/observations/{id}",
    params(("id" = String, Path, description = "Observation id")),
    request_body = ObservationReq,
    responses(
        (status = 200, description = "Observation replaced", body = ObservationRes),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "No such observation")
    )
)]
/// Replace an observation
#[axum::debug_handler]
pub async fn update_observation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ObservationReq>,
) -> ApiResult<Json<ObservationRes>> {
    Ok(Json(state.services.observations.update(&id, &req)?))
}

#[utoipa::path(
    delete,
    path = "/observations/{id}",
    params(("id" = String, Path, description = "Observation id")),
    responses(
        (status = 204, description = "Observation deleted"),
        (status = 404, description = "No such observation")
    )
)]
/// Delete an observation
#[axum::debug_handler]
pub async fn delete_observation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.services.observations.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
