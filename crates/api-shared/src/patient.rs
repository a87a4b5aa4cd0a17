use crate::common::AgeRes;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /patients` and `PUT /patients/{id}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PatientReq {
    /// Given names, first name first (1-5 entries).
    pub given: Vec<String>,
    pub family: String,
    /// `YYYY-MM-DD`.
    pub birth_date: String,
    /// One of `male`, `female`, `other`, `unknown`.
    pub gender: String,
    /// Medical record number, `[A-Z0-9-]{4,20}`.
    #[serde(default)]
    pub mrn: Option<String>,
    #[serde(default)]
    pub guardian: Option<GuardianReq>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct GuardianReq {
    pub name: String,
    /// One of `mother`, `father`, `guardian`, `grandparent`, `other`.
    pub relationship: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GuardianRes {
    pub name: String,
    pub relationship: String,
    pub phone: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    pub id: String,
    pub version: u32,
    pub mrn: Option<String>,
    pub given: Vec<String>,
    pub family: String,
    pub full_name: String,
    pub birth_date: String,
    pub gender: String,
    pub age: AgeRes,
    /// Paediatric age group, e.g. `toddler`.
    pub age_group: String,
    pub guardian: Option<GuardianRes>,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PatientListRes {
    /// Matches before paging.
    pub total: usize,
    pub offset: usize,
    /// Items in this page.
    pub count: usize,
    pub items: Vec<PatientRes>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_default_when_absent() {
        let req: PatientReq = serde_json::from_str(
            r#"{ "given": ["Mia"], "family": "Ng", "birth_date": "2023-01-02", "gender": "female" }"#,
        )
        .unwrap();

        assert_eq!(req.mrn, None);
        assert_eq!(req.guardian, None);
        assert_eq!(req.active, None);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = serde_json::from_str::<PatientReq>(
            r#"{ "given": ["Mia"], "family": "Ng", "birth_date": "2023-01-02", "gender": "female", "ssn": "x" }"#,
        );
        assert!(err.is_err());
    }
}
