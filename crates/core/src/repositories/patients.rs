//! Patient registration and demographics.
//!
//! Requests are validated in full, mapped onto a FHIR `Patient` and stored. Responses are built
//! back from the stored resource with age and age group derived at read time, so they stay
//! correct as the child gets older.
//!
//! ## FHIR mapping
//!
//! | request            | Patient element                                    |
//! |--------------------|----------------------------------------------------|
//! | `mrn`              | `identifier[system = MRN_SYSTEM].value`            |
//! | `given`, `family`  | `name[0]` (`use = official`, `text` = full name)   |
//! | `gender`           | `gender`                                           |
//! | `birth_date`       | `birthDate`                                        |
//! | `guardian`         | `contact[0]` (RoleCode relationship, phone telecom)|
//! | `active`           | `active` (defaults to `true`)                      |

use crate::age::Age;
use crate::config::CoreConfig;
use crate::constants::{MRN_SYSTEM, ROLE_CODE_SYSTEM};
use crate::demographics::{Gender, Relationship};
use crate::repositories::shared::{birth_date_of, path_id, timestamps, Page, Paged};
use crate::store::{Registry, Stored};
use crate::validation::Violations;
use crate::vitals::AgeBand;
use crate::{CoreError, CoreResult};
use api_shared::{GuardianReq, GuardianRes, PatientListRes, PatientQuery, PatientReq, PatientRes};
use chrono::{NaiveDate, Utc};
use fhir::{CodeableConcept, ContactPoint, HumanName, Identifier, Patient, PatientContact, Resource};
use std::sync::Arc;

const MAX_GIVEN_NAMES: usize = 5;
const MAX_GIVEN_CHARS: usize = 50;
const MAX_FAMILY_CHARS: usize = 100;
const MAX_GUARDIAN_NAME_CHARS: usize = 100;

/// Service for patient CRUD.
#[derive(Clone)]
pub struct PatientService {
    cfg: Arc<CoreConfig>,
    registry: Arc<Registry>,
}

impl PatientService {
    pub fn new(cfg: Arc<CoreConfig>, registry: Arc<Registry>) -> Self {
        Self { cfg, registry }
    }

    /// Register a new patient.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] listing every invalid field.
    pub fn create(&self, req: &PatientReq) -> CoreResult<PatientRes> {
        let today = Utc::now().date_naive();
        let patient = build_patient(&self.cfg, req, today)
            .inspect_err(|e| tracing::debug!(error = %e, "patient rejected"))?;

        let stored = self.registry.patients.insert(patient, Utc::now())?;
        tracing::info!(patient_id = %stored.id, "patient created");
        patient_res(&stored, today)
    }

    /// Read a patient.
    pub fn get(&self, id: &str) -> CoreResult<PatientRes> {
        let stored = self.registry.patients.get(&path_id(id)?)?;
        patient_res(&stored, Utc::now().date_naive())
    }

    /// Read the stored FHIR `Patient`.
    pub fn get_resource(&self, id: &str) -> CoreResult<Patient> {
        Ok(self.registry.patients.get(&path_id(id)?)?.resource)
    }

    /// List patients in registration order.
    pub fn list(&self, query: &PatientQuery) -> CoreResult<PatientListRes> {
        let today = Utc::now().date_naive();
        let paged = self.search(query)?;
        let count = paged.items.len();
        let paged = paged.map(|stored| patient_res(&stored, today))?;

        Ok(PatientListRes {
            total: paged.total,
            offset: paged.offset,
            count,
            items: paged.items,
        })
    }

    /// List patients as FHIR resources, for searchset bundles.
    pub fn list_resources(&self, query: &PatientQuery) -> CoreResult<Paged<Patient>> {
        self.search(query)?.map(|stored| Ok(stored.resource))
    }

    fn search(&self, query: &PatientQuery) -> CoreResult<Paged<Stored<Patient>>> {
        let mut violations = Violations::new();
        let gender = match query.gender.as_deref() {
            Some(g) => violations.one_of::<Gender>("gender", g, &Gender::all().map(Gender::as_str)),
            None => None,
        };
        let family = query
            .family
            .as_deref()
            .map(|f| f.trim().to_lowercase())
            .filter(|f| !f.is_empty());
        violations.finish()?;
        let page = Page::resolve(&self.cfg, query.count, query.offset)?;

        let matches = self
            .registry
            .patients
            .list()?
            .into_iter()
            .filter(|stored| {
                let p = &stored.resource;
                let family_ok = family.as_deref().is_none_or(|prefix| {
                    p.primary_name()
                        .and_then(|n| n.family.as_deref())
                        .is_some_and(|f| f.to_lowercase().starts_with(prefix))
                });
                let gender_ok =
                    gender.is_none_or(|g| p.gender.as_deref() == Some(g.as_str()));
                family_ok && gender_ok
            })
            .collect();

        Ok(page.apply(matches))
    }

    /// Replace a patient's demographics, bumping the version.
    pub fn update(&self, id: &str, req: &PatientReq) -> CoreResult<PatientRes> {
        let id = path_id(id)?;
        let today = Utc::now().date_naive();
        let patient = build_patient(&self.cfg, req, today)
            .inspect_err(|e| tracing::debug!(patient_id = %id, error = %e, "patient update rejected"))?;

        let stored = self.registry.patients.replace(&id, patient, Utc::now())?;
        tracing::info!(patient_id = %id, version = stored.version, "patient updated");
        patient_res(&stored, today)
    }

    /// Delete a patient.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Conflict`] while any observation or appointment still refers to the
    /// patient.
    pub fn delete(&self, id: &str) -> CoreResult<()> {
        let id = path_id(id)?;
        self.registry.patients.get(&id)?;

        let key = id.to_string();
        let observed = self.registry.observations.any(|o| {
            o.subject.as_ref().and_then(|s| s.id_of(Patient::RESOURCE_TYPE)) == Some(key.as_str())
        })?;
        let scheduled = self
            .registry
            .appointments
            .any(|a| a.actor_id(Patient::RESOURCE_TYPE) == Some(key.as_str()))?;
        if observed || scheduled {
            tracing::debug!(patient_id = %id, "patient delete blocked by references");
            return Err(CoreError::Conflict(format!(
                "Patient/{id} is still referenced by observations or appointments"
            )));
        }

        self.registry.patients.remove(&id)?;
        tracing::info!(patient_id = %id, "patient deleted");
        Ok(())
    }
}

// ============================================================================
// REQUEST -> FHIR
// ============================================================================

fn build_patient(cfg: &CoreConfig, req: &PatientReq, today: NaiveDate) -> CoreResult<Patient> {
    let mut v = Violations::new();

    if req.given.is_empty() || req.given.len() > MAX_GIVEN_NAMES {
        v.add(
            "given",
            format!("must contain between 1 and {MAX_GIVEN_NAMES} names"),
        );
    }
    let given: Vec<String> = req
        .given
        .iter()
        .enumerate()
        .filter_map(|(i, name)| v.name(&format!("given[{i}]"), name, MAX_GIVEN_CHARS))
        .collect();

    let family = v.name("family", &req.family, MAX_FAMILY_CHARS);

    let birth_date = v.date("birth_date", &req.birth_date);
    if let Some(date) = birth_date {
        match Age::between(date, today) {
            None => v.add("birth_date", "cannot be in the future"),
            Some(age) if age.years > cfg.max_patient_age_years() => v.add(
                "birth_date",
                format!(
                    "patient must be at most {} years old",
                    cfg.max_patient_age_years()
                ),
            ),
            Some(_) => {}
        }
    }

    let gender = v.one_of::<Gender>("gender", &req.gender, &Gender::all().map(Gender::as_str));

    let mrn = match req.mrn.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        Some(mrn) => v.mrn("mrn", mrn),
        None => None,
    };

    let contact = req
        .guardian
        .as_ref()
        .and_then(|guardian| guardian_contact(&mut v, guardian));

    let (Some(family), Some(birth_date), Some(gender), true) =
        (family, birth_date, gender, v.is_empty())
    else {
        return Err(v.into_error());
    };

    let mut patient = Patient::new();
    if let Some(mrn) = mrn {
        patient.identifier.push(Identifier {
            use_type: Some("usual".into()),
            system: Some(MRN_SYSTEM.into()),
            value: Some(mrn),
        });
    }
    patient.active = Some(req.active.unwrap_or(true));
    patient.name.push(HumanName {
        use_type: Some("official".into()),
        text: Some(full_name(&given, &family)),
        family: Some(family),
        given,
    });
    patient.gender = Some(gender.as_str().into());
    patient.birth_date = Some(birth_date.format("%Y-%m-%d").to_string());
    patient.contact.extend(contact);

    Ok(patient)
}

fn guardian_contact(v: &mut Violations, guardian: &GuardianReq) -> Option<PatientContact> {
    let name = v.name("guardian.name", &guardian.name, MAX_GUARDIAN_NAME_CHARS);
    let relationship = v.one_of::<Relationship>(
        "guardian.relationship",
        &guardian.relationship,
        &Relationship::all().map(Relationship::as_str),
    );
    let phone = match guardian
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        Some(phone) => Some(v.phone("guardian.phone", phone)?),
        None => None,
    };

    let (name, relationship) = (name?, relationship?);
    let relationship = match relationship.role_code() {
        Some(code) => CodeableConcept::single(ROLE_CODE_SYSTEM, code, relationship.display()),
        None => CodeableConcept::text(relationship.display()),
    };

    Some(PatientContact {
        relationship: vec![relationship],
        name: Some(HumanName {
            text: Some(name),
            ..Default::default()
        }),
        telecom: phone
            .map(|value| ContactPoint {
                system: Some("phone".into()),
                value: Some(value),
                use_type: None,
            })
            .into_iter()
            .collect(),
    })
}

fn full_name(given: &[String], family: &str) -> String {
    let mut parts: Vec<&str> = given.iter().map(String::as_str).collect();
    parts.push(family);
    parts.join(" ")
}

// ============================================================================
// FHIR -> RESPONSE
// ============================================================================

fn patient_res(stored: &Stored<Patient>, today: NaiveDate) -> CoreResult<PatientRes> {
    let patient = &stored.resource;
    let corrupt = |detail: &str| CoreError::corrupt(Patient::RESOURCE_TYPE, detail);

    let name = patient.primary_name().ok_or_else(|| corrupt("name missing"))?;
    let family = name.family.clone().ok_or_else(|| corrupt("family name missing"))?;
    let birth_date = birth_date_of(patient)?;
    let age = Age::between(birth_date, today).ok_or_else(|| corrupt("birthDate is after today"))?;
    let gender = patient.gender.clone().ok_or_else(|| corrupt("gender missing"))?;
    let guardian = patient.contact.first().map(guardian_res).transpose()?;
    let (created_at, updated_at) = timestamps(stored);

    Ok(PatientRes {
        id: stored.id.to_string(),
        version: stored.version,
        mrn: patient.identifier_value(MRN_SYSTEM).map(str::to_string),
        given: name.given.clone(),
        full_name: full_name(&name.given, &family),
        family,
        birth_date: birth_date.format("%Y-%m-%d").to_string(),
        gender,
        age: age.to_res(),
        age_group: AgeBand::for_age_months(age.total_months).as_str().to_string(),
        guardian,
        active: patient.active.unwrap_or(true),
        created_at,
        updated_at,
    })
}

fn guardian_res(contact: &PatientContact) -> CoreResult<GuardianRes> {
    let corrupt = |detail: &str| CoreError::corrupt(Patient::RESOURCE_TYPE, detail);

    let concept = contact
        .relationship
        .first()
        .ok_or_else(|| corrupt("contact relationship missing"))?;
    let relationship = concept
        .code_in(ROLE_CODE_SYSTEM)
        .and_then(Relationship::from_role_code)
        .or_else(|| concept.text.as_deref().and_then(|t| t.parse().ok()))
        .ok_or_else(|| corrupt("contact relationship not recognised"))?;

    let name = contact
        .name
        .as_ref()
        .and_then(|n| n.text.clone())
        .ok_or_else(|| corrupt("contact name missing"))?;

    let phone = contact
        .telecom
        .iter()
        .find(|t| t.system.as_deref() == Some("phone"))
        .and_then(|t| t.value.clone());

    Ok(GuardianRes {
        name,
        relationship: relationship.as_str().to_string(),
        phone,
    })
}
