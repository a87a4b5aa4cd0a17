//! Read-only clinical reference tables.

use api_shared::{AppointmentTypeListRes, VitalSignReferenceListRes, VitalSignReferenceQuery};
use axum::response::Json;
use paeds_core::reference::{appointment_type_table, vital_sign_table};

use crate::extractors::ApiQuery;

#[utoipa::path(
    get,
    path = "/reference/vital-signs",
    params(VitalSignReferenceQuery),
    responses(
        (status = 200, description = "Reference range of each vital sign for the age", body = VitalSignReferenceListRes),
        (status = 400, description = "Missing or invalid age_months")
    )
)]
/// Vital-sign reference ranges for an age
#[axum::debug_handler]
pub async fn vital_sign_reference(
    ApiQuery(query): ApiQuery<VitalSignReferenceQuery>,
) -> Json<VitalSignReferenceListRes> {
    Json(vital_sign_table(query.age_months))
}

#[utoipa::path(
    get,
    path = "/reference/appointment-types",
    responses(
        (status = 200, description = "Visit types with codes and default lengths", body = AppointmentTypeListRes)
    )
)]
/// Appointment types
#[axum::debug_handler]
pub async fn appointment_types() -> Json<AppointmentTypeListRes> {
    Json(appointment_type_table())
}
