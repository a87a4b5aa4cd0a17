//! # API Shared
//!
//! Request and response shapes for the paediatric care REST API.
//!
//! Contains:
//! - Request bodies accepted by the create/replace endpoints
//! - Response bodies returned by read/list endpoints, including derived fields
//! - Shared services like `HealthService`
//!
//! Every type derives `serde` and `utoipa::ToSchema` so the same definitions drive JSON
//! handling and the OpenAPI document. Enumerated fields are carried as strings and checked by
//! the validation layer in `paeds-core`, so clients get one report listing every bad field.

pub mod appointment;
pub mod common;
pub mod health;
pub mod observation;
pub mod patient;
pub mod query;
pub mod reference;

pub use appointment::{AppointmentListRes, AppointmentReq, AppointmentRes, CancelAppointmentReq};
pub use common::{AgeRes, CodeDisplayRes};
pub use health::{HealthRes, HealthService};
pub use observation::{ObservationListRes, ObservationReq, ObservationRes, ReferenceRangeRes};
pub use patient::{GuardianReq, GuardianRes, PatientListRes, PatientReq, PatientRes};
pub use query::{
    AppointmentQuery, FormatQuery, ObservationQuery, PatientQuery, VitalSignReferenceQuery,
};
pub use reference::{
    AppointmentTypeListRes, AppointmentTypeRes, VitalSignReferenceListRes, VitalSignReferenceRes,
};
