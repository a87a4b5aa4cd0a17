//! FHIR R4 wire models for the paediatric care API.
//!
//! This crate provides **wire models** and **format helpers** for the FHIR resources the API
//! stores and serves:
//! - `Patient`, `Observation` and `Appointment` (the stored resources)
//! - `Bundle` (searchset results), `OperationOutcome` (errors) and `CapabilityStatement`
//!
//! This crate focuses on:
//! - FHIR JSON naming and shape (`resourceType`, camelCase elements)
//! - strict parsing with a best-effort path to the failing element
//! - the small [`Resource`] seam the in-memory store needs to stamp identity and metadata
//!
//! It deliberately knows nothing about validation rules, code tables or derived fields; those
//! live in `paeds-core`.

pub mod appointment;
pub mod bundle;
pub mod capability;
pub mod datatypes;
pub mod observation;
pub mod outcome;
pub mod patient;

pub use appointment::{Appointment, AppointmentParticipant};
pub use bundle::{Bundle, BundleEntry};
pub use capability::{
    CapabilityInteraction, CapabilityResource, CapabilityRest, CapabilitySearchParam,
    CapabilitySoftware, CapabilityStatement,
};
pub use datatypes::{
    Annotation, CodeableConcept, Coding, ContactPoint, HumanName, Identifier, Meta, Quantity,
    Reference,
};
pub use observation::{Observation, ObservationReferenceRange};
pub use outcome::{OperationOutcome, OperationOutcomeIssue};
pub use patient::{Patient, PatientContact};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// FHIR version implemented by the wire models.
pub const FHIR_VERSION: &str = "4.0.1";

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;

/// Common behaviour of a stored FHIR resource.
///
/// Implemented by every resource kept in the in-memory store so it can assign the logical id
/// and maintain `meta.versionId` / `meta.lastUpdated` without knowing the resource shape.
pub trait Resource: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The FHIR `resourceType` value, e.g. `"Patient"`.
    const RESOURCE_TYPE: &'static str;

    /// The `resourceType` carried by this instance.
    fn resource_type(&self) -> &str;

    /// The logical id, if one has been assigned.
    fn id(&self) -> Option<&str>;

    /// Assign the logical id.
    fn set_id(&mut self, id: String);

    /// Mutable access to the resource metadata.
    fn meta_mut(&mut self) -> &mut Option<Meta>;

    /// Stamp identity and version metadata in one step.
    fn stamp(&mut self, id: String, version_id: u32, last_updated: String) {
        self.set_id(id);
        let meta = self.meta_mut().get_or_insert_with(Meta::default);
        meta.version_id = Some(version_id.to_string());
        meta.last_updated = Some(last_updated);
    }
}

/// Parse a FHIR resource of a known type from JSON text.
///
/// This uses `serde_path_to_error` to surface a best-effort path (e.g. `name.0.family`) to the
/// failing element when the JSON does not match the wire schema.
///
/// # Errors
///
/// Returns [`FhirError`] if:
/// - the text is not valid JSON or does not match the schema (including unknown elements),
/// - `resourceType` is not `R::RESOURCE_TYPE`.
pub fn parse_resource<R: Resource>(json_text: &str) -> FhirResult<R> {
    let mut deserializer = serde_json::Deserializer::from_str(json_text);

    let resource = match serde_path_to_error::deserialize::<_, R>(&mut deserializer) {
        Ok(parsed) => parsed,
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            return Err(FhirError::Translation(format!(
                "{} schema mismatch at {path}: {source}",
                R::RESOURCE_TYPE
            )));
        }
    };

    if resource.resource_type() != R::RESOURCE_TYPE {
        return Err(FhirError::InvalidInput(format!(
            "Expected resourceType '{}', got '{}'",
            R::RESOURCE_TYPE,
            resource.resource_type()
        )));
    }

    Ok(resource)
}

/// Render a FHIR resource as pretty-printed JSON.
pub fn render_resource<R: Resource>(resource: &R) -> FhirResult<String> {
    Ok(serde_json::to_string_pretty(resource)?)
}

/// A parsed resource whose type was only known at runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyResource {
    Patient(Patient),
    Observation(Observation),
    Appointment(Appointment),
}

impl AnyResource {
    /// Parse any of the stored resource types, dispatching on `resourceType`.
    pub fn parse(json_text: &str) -> FhirResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json_text)?;
        let resource_type = value
            .get("resourceType")
            .and_then(|v| v.as_str())
            .ok_or_else(|| FhirError::InvalidInput("missing resourceType".into()))?;

        match resource_type {
            Patient::RESOURCE_TYPE => parse_resource(json_text).map(AnyResource::Patient),
            Observation::RESOURCE_TYPE => parse_resource(json_text).map(AnyResource::Observation),
            Appointment::RESOURCE_TYPE => parse_resource(json_text).map(AnyResource::Appointment),
            other => Err(FhirError::InvalidInput(format!(
                "unsupported resourceType '{other}'"
            ))),
        }
    }

    pub fn resource_type(&self) -> &'static str {
        match self {
            AnyResource::Patient(_) => Patient::RESOURCE_TYPE,
            AnyResource::Observation(_) => Observation::RESOURCE_TYPE,
            AnyResource::Appointment(_) => Appointment::RESOURCE_TYPE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reports_path_of_bad_element() {
        let input = r#"{
            "resourceType": "Patient",
            "name": [{ "family": "Lee", "given": "not-an-array" }]
        }"#;

        let err = parse_resource::<Patient>(input).expect_err("should reject wrong type");
        match err {
            FhirError::Translation(msg) => assert!(msg.contains("name"), "{msg}"),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_unknown_elements() {
        let input = r#"{ "resourceType": "Patient", "unexpectedKey": true }"#;
        let err = parse_resource::<Patient>(input).expect_err("should reject unknown key");
        assert!(err.to_string().contains("unexpectedKey"));
    }

    #[test]
    fn parse_rejects_mismatched_resource_type() {
        let input = r#"{ "resourceType": "Practitioner" }"#;
        let err = parse_resource::<Patient>(input).expect_err("should reject resourceType");
        assert!(matches!(err, FhirError::InvalidInput(_)));
    }

    #[test]
    fn stamp_sets_id_and_meta() {
        let mut patient = Patient::new();
        patient.stamp("abc".into(), 3, "2026-01-01T00:00:00Z".into());

        assert_eq!(patient.id(), Some("abc"));
        let meta = patient.meta.expect("meta stamped");
        assert_eq!(meta.version_id.as_deref(), Some("3"));
        assert_eq!(meta.last_updated.as_deref(), Some("2026-01-01T00:00:00Z"));
    }

    #[test]
    fn any_resource_dispatches_on_resource_type() {
        let input = r#"{ "resourceType": "Appointment", "status": "booked" }"#;
        let parsed = AnyResource::parse(input).expect("parse appointment");
        assert_eq!(parsed.resource_type(), "Appointment");

        let err = AnyResource::parse(r#"{ "resourceType": "Encounter" }"#);
        assert!(err.is_err());
    }
}
