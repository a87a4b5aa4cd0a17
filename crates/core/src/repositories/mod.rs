//! Resource services.
//!
//! One service per FHIR resource type. Services validate requests, map them to FHIR resources,
//! store them in the shared [`Registry`](crate::store::Registry) and map stored resources back
//! to API responses.

pub mod appointments;
pub mod observations;
pub mod patients;
pub mod shared;
