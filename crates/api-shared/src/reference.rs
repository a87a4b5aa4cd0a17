use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VitalSignReferenceRes {
    pub vital: String,
    pub loinc_code: String,
    pub display: String,
    pub unit: String,
    /// Absent for vitals without an age-banded range (weight, height).
    pub low: Option<f64>,
    pub high: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VitalSignReferenceListRes {
    pub age_months: u32,
    pub age_band: String,
    pub items: Vec<VitalSignReferenceRes>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AppointmentTypeRes {
    pub appointment_type: String,
    pub snomed_code: String,
    pub display: String,
    pub default_minutes: u32,
    /// HL7 v2-0276 appointment reason code.
    pub reason_code: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AppointmentTypeListRes {
    pub items: Vec<AppointmentTypeRes>,
}
