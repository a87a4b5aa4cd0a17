//! # Paeds Core
//!
//! Core business logic for the paediatric care API.
//!
//! This crate contains pure data operations:
//! - Patient, vital-sign observation and appointment services
//! - Validation of incoming requests and mapping to FHIR R4 resources
//! - Paediatric reference tables (vital-sign ranges by age band, visit types)
//! - In-memory, versioned resource storage
//!
//! **No API concerns**: HTTP routing, middleware and response rendering belong in `api-rest`;
//! request and response shapes live in `api-shared`.

pub mod age;
pub mod config;
pub mod constants;
pub mod demographics;
pub mod error;
pub mod reference;
pub mod repositories;
pub mod scheduling;
pub mod store;
pub mod validation;
pub mod vitals;

pub use config::CoreConfig;
pub use error::{CoreError, CoreResult, FieldIssue};
pub use repositories::appointments::AppointmentService;
pub use repositories::observations::{ObservationService, ObservationStatus};
pub use repositories::patients::PatientService;
pub use repositories::shared::{Page, Paged};
pub use store::{Registry, ResourceStore, Stored};

use std::sync::Arc;

/// Every service, wired to one shared store.
#[derive(Clone)]
pub struct PaedsServices {
    pub patients: PatientService,
    pub observations: ObservationService,
    pub appointments: AppointmentService,
}

impl PaedsServices {
    /// Services backed by a fresh in-memory registry.
    pub fn in_memory(cfg: CoreConfig) -> Self {
        let cfg = Arc::new(cfg);
        let registry = Arc::new(Registry::new());

        Self {
            patients: PatientService::new(cfg.clone(), registry.clone()),
            observations: ObservationService::new(cfg.clone(), registry.clone()),
            appointments: AppointmentService::new(cfg, registry),
        }
    }
}
