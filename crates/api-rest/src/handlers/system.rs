//! Liveness and server capability endpoints.

use api_shared::{HealthRes, HealthService};
use axum::{extract::State, response::Json};
use fhir::{CapabilityResource, CapabilityStatement};

use crate::response::FhirJson;
use crate::state::AppState;

/// Name reported in the CapabilityStatement.
const SOFTWARE_NAME: &str = "Paeds FHIR API";

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used by monitoring and load balancer probes; never rate limited.
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/metadata",
    responses(
        (status = 200, description = "FHIR CapabilityStatement (application/fhir+json)")
    )
)]
/// FHIR capability statement
///
/// Lists the resource types served, their interactions and search parameters.
#[axum::debug_handler]
pub async fn metadata(State(state): State<AppState>) -> FhirJson<CapabilityStatement> {
    FhirJson(capability_statement(&state))
}

fn capability_statement(state: &AppState) -> CapabilityStatement {
    CapabilityStatement::for_server(
        SOFTWARE_NAME,
        env!("CARGO_PKG_VERSION"),
        &state.started_at.format("%Y-%m-%d").to_string(),
        vec![
            CapabilityResource::crud("Patient", &[("family", "string"), ("gender", "token")]),
            CapabilityResource::crud(
                "Observation",
                &[("patient", "reference"), ("vital", "token")],
            ),
            CapabilityResource::crud(
                "Appointment",
                &[("patient", "reference"), ("status", "token"), ("date", "date")],
            ),
        ],
    )
}
