use serde::Deserialize;
use utoipa::IntoParams;

/// Filters for `GET /patients`.
#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PatientQuery {
    /// Case-insensitive prefix of the family name.
    pub family: Option<String>,
    /// `male`, `female`, `other` or `unknown`.
    pub gender: Option<String>,
    /// Page size (default 20).
    pub count: Option<usize>,
    /// Number of matches to skip.
    pub offset: Option<usize>,
}

/// Filters for `GET /observations`.
#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ObservationQuery {
    /// Patient id.
    pub patient: Option<String>,
    /// Vital sign key, e.g. `heart_rate`.
    pub vital: Option<String>,
    pub count: Option<usize>,
    pub offset: Option<usize>,
}

/// Filters for `GET /appointments`.
#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AppointmentQuery {
    /// Patient id.
    pub patient: Option<String>,
    /// Appointment status, e.g. `booked`.
    pub status: Option<String>,
    /// UTC calendar day of the start time, `YYYY-MM-DD`.
    pub date: Option<String>,
    pub count: Option<usize>,
    pub offset: Option<usize>,
}

/// Query for `GET /reference/vital-signs`.
#[derive(Clone, Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VitalSignReferenceQuery {
    /// Age in completed months.
    pub age_months: u32,
}

/// Representation selector accepted by read and list endpoints.
#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FormatQuery {
    /// `fhir` returns the FHIR resource (or a searchset Bundle) instead of the API shape.
    #[serde(rename = "_format")]
    pub format: Option<String>,
}

impl FormatQuery {
    pub fn wants_fhir(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("fhir") || f.contains("fhir+json"))
    }
}
