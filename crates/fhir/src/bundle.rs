//! Searchset Bundle used for list results.

use crate::{FhirResult, Resource};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Bundle {
    pub resource_type: String,

    #[serde(rename = "type")]
    pub bundle_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<BundleEntry>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BundleEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    pub resource: serde_json::Value,
}

impl Bundle {
    /// Build a searchset bundle for one page of matches.
    ///
    /// `total` is the number of matches before paging; each entry's `fullUrl` is the relative
    /// literal reference `{Type}/{id}`.
    pub fn searchset<R: Resource>(total: usize, resources: &[R]) -> FhirResult<Self> {
        let entry = resources
            .iter()
            .map(|resource| {
                Ok(BundleEntry {
                    full_url: resource
                        .id()
                        .map(|id| format!("{}/{}", R::RESOURCE_TYPE, id)),
                    resource: serde_json::to_value(resource)?,
                })
            })
            .collect::<FhirResult<Vec<_>>>()?;

        Ok(Self {
            resource_type: "Bundle".to_string(),
            bundle_type: "searchset".to_string(),
            total: Some(total),
            entry,
        })
    }
}
