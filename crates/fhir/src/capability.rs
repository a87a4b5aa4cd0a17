//! CapabilityStatement describing what the server supports.

use crate::FHIR_VERSION;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityStatement {
    pub resource_type: String,
    pub status: String,
    pub date: String,
    pub kind: String,
    pub software: CapabilitySoftware,
    pub fhir_version: String,
    pub format: Vec<String>,
    pub rest: Vec<CapabilityRest>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CapabilitySoftware {
    pub name: String,
    pub version: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CapabilityRest {
    pub mode: String,
    pub resource: Vec<CapabilityResource>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub interaction: Vec<CapabilityInteraction>,
    pub versioning: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_param: Vec<CapabilitySearchParam>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CapabilityInteraction {
    pub code: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CapabilitySearchParam {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
}

impl CapabilityStatement {
    /// A server capability statement listing `resources`.
    pub fn for_server(
        software_name: &str,
        software_version: &str,
        date: &str,
        resources: Vec<CapabilityResource>,
    ) -> Self {
        Self {
            resource_type: "CapabilityStatement".to_string(),
            status: "active".to_string(),
            date: date.to_string(),
            kind: "instance".to_string(),
            software: CapabilitySoftware {
                name: software_name.to_string(),
                version: software_version.to_string(),
            },
            fhir_version: FHIR_VERSION.to_string(),
            format: vec!["json".to_string()],
            rest: vec![CapabilityRest {
                mode: "server".to_string(),
                resource: resources,
            }],
        }
    }
}

impl CapabilityResource {
    /// A resource supporting the full CRUD set plus search with `search_params`
    /// (`(name, type)` pairs).
    pub fn crud(resource_type: &str, search_params: &[(&str, &str)]) -> Self {
        Self {
            resource_type: resource_type.to_string(),
            interaction: ["read", "update", "delete", "create", "search-type"]
                .into_iter()
                .map(|code| CapabilityInteraction {
                    code: code.to_string(),
                })
                .collect(),
            versioning: "versioned".to_string(),
            search_param: search_params
                .iter()
                .map(|(name, param_type)| CapabilitySearchParam {
                    name: name.to_string(),
                    param_type: param_type.to_string(),
                })
                .collect(),
        }
    }
}
