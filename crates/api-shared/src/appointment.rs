use crate::common::CodeDisplayRes;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /appointments` and `PUT /appointments/{id}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AppointmentReq {
    pub patient_id: String,
    /// One of `well_child`, `sick_visit`, `follow_up`, `vaccination`.
    pub appointment_type: String,
    /// RFC 3339.
    pub start: String,
    /// RFC 3339; defaults to `start` plus the type's default duration.
    #[serde(default)]
    pub end: Option<String>,
    /// One of `routine`, `urgent`, `emergency`; defaults to `routine`.
    #[serde(default)]
    pub priority: Option<String>,
    /// Defaults to `booked`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub practitioner: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Body of `POST /appointments/{id}/cancel`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CancelAppointmentReq {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AppointmentRes {
    pub id: String,
    pub version: u32,
    pub patient_id: String,
    pub appointment_type: String,
    pub service_type: CodeDisplayRes,
    pub start: String,
    pub end: String,
    pub duration_minutes: u32,
    pub priority: String,
    /// FHIR `Appointment.priority`; lower is more urgent.
    pub priority_code: u32,
    pub status: String,
    pub practitioner: Option<String>,
    pub reason: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AppointmentListRes {
    pub total: usize,
    pub offset: usize,
    pub count: usize,
    pub items: Vec<AppointmentRes>,
}
