use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Health check used by `GET /health`.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Liveness only; the in-memory store has nothing else to probe.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Paeds FHIR API is alive".into(),
        }
    }
}
