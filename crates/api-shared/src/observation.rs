use crate::common::CodeDisplayRes;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /observations` and `PUT /observations/{id}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ObservationReq {
    pub patient_id: String,
    /// Vital sign key, e.g. `heart_rate`.
    pub vital: String,
    pub value: f64,
    /// Must equal the canonical UCUM unit of the vital sign when given.
    #[serde(default)]
    pub unit: Option<String>,
    /// RFC 3339; defaults to now.
    #[serde(default)]
    pub effective_at: Option<String>,
    /// One of `preliminary`, `final`, `amended`; defaults to `final`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReferenceRangeRes {
    pub low: f64,
    pub high: f64,
    pub unit: String,
    pub age_band: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ObservationRes {
    pub id: String,
    pub version: u32,
    pub patient_id: String,
    pub vital: String,
    pub loinc_code: String,
    pub display: String,
    pub value: f64,
    pub unit: String,
    pub effective_at: String,
    pub status: String,
    /// Completed months of age at `effective_at`.
    pub patient_age_months: Option<u32>,
    pub reference_range: Option<ReferenceRangeRes>,
    pub interpretation: Option<CodeDisplayRes>,
    /// True when the value falls outside the reference range.
    pub abnormal: bool,
    pub note: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ObservationListRes {
    pub total: usize,
    pub offset: usize,
    pub count: usize,
    pub items: Vec<ObservationRes>,
}
