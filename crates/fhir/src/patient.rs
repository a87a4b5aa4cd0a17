//! FHIR Patient wire model.
//!
//! Only the elements the paediatric API populates are modelled; anything else is rejected on
//! parse (`deny_unknown_fields`) rather than silently dropped.

use crate::datatypes::{CodeableConcept, ContactPoint, HumanName, Identifier, Meta};
use crate::Resource;
use serde::{Deserialize, Serialize};

/// Wire representation of a Patient resource.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Patient {
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact: Vec<PatientContact>,
}

/// A contact party for the patient; for children this is the parent or guardian.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PatientContact {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationship: Vec<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<HumanName>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,
}

impl Patient {
    pub fn new() -> Self {
        Self {
            resource_type: Self::RESOURCE_TYPE.to_string(),
            ..Default::default()
        }
    }

    /// The first name entry, treated as the primary name.
    pub fn primary_name(&self) -> Option<&HumanName> {
        self.name.first()
    }

    /// The first identifier value issued by `system`.
    pub fn identifier_value(&self, system: &str) -> Option<&str> {
        self.identifier
            .iter()
            .find(|i| i.system.as_deref() == Some(system))
            .and_then(|i| i.value.as_deref())
    }
}

impl Resource for Patient {
    const RESOURCE_TYPE: &'static str = "Patient";

    fn resource_type(&self) -> &str {
        &self.resource_type
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn meta_mut(&mut self) -> &mut Option<Meta> {
        &mut self.meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_resource, render_resource};

    const SAMPLE: &str = r#"{
        "resourceType": "Patient",
        "id": "90a8d1ea318041d9adb070a834d4e0f6",
        "meta": { "versionId": "2", "lastUpdated": "2026-01-23T13:58:04Z" },
        "identifier": [{ "system": "urn:example:mrn", "value": "MRN-0042" }],
        "active": true,
        "name": [{ "use": "official", "family": "Williams", "given": ["Sarah", "Jane"] }],
        "gender": "female",
        "birthDate": "2022-03-20",
        "contact": [{
            "relationship": [{ "text": "Mother" }],
            "name": { "text": "Emma Williams" },
            "telecom": [{ "system": "phone", "value": "+44 7700 900123" }]
        }]
    }"#;

    #[test]
    fn parses_sample_patient() {
        let patient: Patient = parse_resource(SAMPLE).expect("parse patient");

        assert_eq!(patient.birth_date.as_deref(), Some("2022-03-20"));
        assert_eq!(
            patient.primary_name().and_then(|n| n.family.as_deref()),
            Some("Williams")
        );
        assert_eq!(patient.identifier_value("urn:example:mrn"), Some("MRN-0042"));
        assert_eq!(patient.contact.len(), 1);
    }

    #[test]
    fn render_uses_fhir_element_names() {
        let patient: Patient = parse_resource(SAMPLE).expect("parse patient");
        let rendered = render_resource(&patient).expect("render patient");

        assert!(rendered.contains("\"resourceType\": \"Patient\""));
        assert!(rendered.contains("\"birthDate\""));
        assert!(rendered.contains("\"lastUpdated\""));
        assert!(!rendered.contains("birth_date"));
    }
}
