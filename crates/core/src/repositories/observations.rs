//! Vital-sign observations.
//!
//! Each observation records one vital sign for one patient. On create and replace the value is
//! checked against the sign's plausible range, and the paediatric reference range for the
//! patient's age at the effective time is attached along with a low/normal/high interpretation.
//! Those annotations are stored on the FHIR resource, so later reads report what was true when
//! the measurement was taken.

use crate::age::Age;
use crate::config::CoreConfig;
use crate::constants::{
    INTERPRETATION_SYSTEM, LOINC_SYSTEM, OBSERVATION_CATEGORY_SYSTEM, UCUM_SYSTEM,
    VITAL_SIGNS_CATEGORY,
};
use crate::repositories::shared::{
    birth_date_of, body_id, missing_patient, path_id, referenced_patient, timestamps, Page, Paged,
};
use crate::store::{Registry, Stored};
use crate::validation::{format_datetime, parse_datetime, Violations};
use crate::vitals::{interpret, reference_range, AgeBand, Interpretation, Range, VitalSign};
use crate::{CoreError, CoreResult};
use api_shared::{
    CodeDisplayRes, ObservationListRes, ObservationQuery, ObservationReq, ObservationRes,
    ReferenceRangeRes,
};
use chrono::{DateTime, Utc};
use fhir::{
    Annotation, CodeableConcept, Observation, ObservationReferenceRange, Patient, Quantity,
    Reference, Resource,
};
use paeds_uuid::ResourceId;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

const MAX_NOTE_CHARS: usize = 500;

/// Observation workflow status accepted by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObservationStatus {
    Preliminary,
    Final,
    Amended,
}

impl ObservationStatus {
    pub fn all() -> [ObservationStatus; 3] {
        [
            ObservationStatus::Preliminary,
            ObservationStatus::Final,
            ObservationStatus::Amended,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ObservationStatus::Preliminary => "preliminary",
            ObservationStatus::Final => "final",
            ObservationStatus::Amended => "amended",
        }
    }
}

impl fmt::Display for ObservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObservationStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or(())
    }
}

/// Service for vital-sign observation CRUD.
#[derive(Clone)]
pub struct ObservationService {
    cfg: Arc<CoreConfig>,
    registry: Arc<Registry>,
}

impl ObservationService {
    pub fn new(cfg: Arc<CoreConfig>, registry: Arc<Registry>) -> Self {
        Self { cfg, registry }
    }

    /// Record a vital sign.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Validation`] for invalid fields.
    /// - [`CoreError::InvalidReference`] when the patient does not exist.
    pub fn create(&self, req: &ObservationReq) -> CoreResult<ObservationRes> {
        let now = Utc::now();
        let observation = self
            .build_observation(req, now)
            .inspect_err(|e| tracing::debug!(error = %e, "observation rejected"))?;

        let stored = self.registry.observations.insert(observation, now)?;
        tracing::info!(observation_id = %stored.id, "observation created");
        self.observation_res(&stored)
    }

    pub fn get(&self, id: &str) -> CoreResult<ObservationRes> {
        let stored = self.registry.observations.get(&path_id(id)?)?;
        self.observation_res(&stored)
    }

    pub fn get_resource(&self, id: &str) -> CoreResult<Observation> {
        Ok(self.registry.observations.get(&path_id(id)?)?.resource)
    }

    /// List observations, most recent effective time first.
    pub fn list(&self, query: &ObservationQuery) -> CoreResult<ObservationListRes> {
        let paged = self.search(query)?;
        let count = paged.items.len();
        let paged = paged.map(|stored| self.observation_res(&stored))?;

        Ok(ObservationListRes {
            total: paged.total,
            offset: paged.offset,
            count,
            items: paged.items,
        })
    }

    pub fn list_resources(&self, query: &ObservationQuery) -> CoreResult<Paged<Observation>> {
        self.search(query)?.map(|stored| Ok(stored.resource))
    }

    fn search(&self, query: &ObservationQuery) -> CoreResult<Paged<Stored<Observation>>> {
        let mut v = Violations::new();
        let patient = query
            .patient
            .as_deref()
            .and_then(|p| body_id(&mut v, "patient", p))
            .map(|id| id.to_string());
        let vital = match query.vital.as_deref() {
            Some(vital) => v.one_of::<VitalSign>("vital", vital, &VitalSign::all().map(VitalSign::as_str)),
            None => None,
        };
        v.finish()?;
        let page = Page::resolve(&self.cfg, query.count, query.offset)?;

        let mut matches: Vec<_> = self
            .registry
            .observations
            .list()?
            .into_iter()
            .filter(|stored| {
                let o = &stored.resource;
                let patient_ok = patient.as_deref().is_none_or(|id| {
                    o.subject.as_ref().and_then(|s| s.id_of(Patient::RESOURCE_TYPE)) == Some(id)
                });
                let vital_ok =
                    vital.is_none_or(|vital| o.code.code_in(LOINC_SYSTEM) == Some(vital.loinc_code()));
                patient_ok && vital_ok
            })
            .collect();

        matches.sort_by_key(|stored| {
            std::cmp::Reverse(
                stored
                    .resource
                    .effective_date_time
                    .as_deref()
                    .and_then(parse_datetime),
            )
        });

        Ok(page.apply(matches))
    }

    /// Replace an observation. Reference range and interpretation are recomputed.
    pub fn update(&self, id: &str, req: &ObservationReq) -> CoreResult<ObservationRes> {
        let id = path_id(id)?;
        let now = Utc::now();
        let observation = self
            .build_observation(req, now)
            .inspect_err(|e| tracing::debug!(observation_id = %id, error = %e, "observation update rejected"))?;

        let stored = self.registry.observations.replace(&id, observation, now)?;
        tracing::info!(observation_id = %id, version = stored.version, "observation updated");
        self.observation_res(&stored)
    }

    pub fn delete(&self, id: &str) -> CoreResult<()> {
        let id = path_id(id)?;
        self.registry.observations.remove(&id)?;
        tracing::info!(observation_id = %id, "observation deleted");
        Ok(())
    }

    // ========================================================================
    // REQUEST -> FHIR
    // ========================================================================

    fn build_observation(&self, req: &ObservationReq, now: DateTime<Utc>) -> CoreResult<Observation> {
        let mut v = Violations::new();

        let patient_id = body_id(&mut v, "patient_id", &req.patient_id);
        let patient = referenced_patient(&self.registry, patient_id)?;

        let vital = v.one_of::<VitalSign>("vital", &req.vital, &VitalSign::all().map(VitalSign::as_str));

        if !req.value.is_finite() {
            v.add("value", "must be a finite number");
        } else if let Some(vital) = vital {
            let plausible = vital.plausible_range();
            if !plausible.contains(req.value) {
                v.add(
                    "value",
                    format!(
                        "must be between {} and {} {} for {vital}",
                        plausible.low,
                        plausible.high,
                        vital.unit()
                    ),
                );
            }
        }

        if let (Some(unit), Some(vital)) = (
            req.unit.as_deref().map(str::trim).filter(|u| !u.is_empty()),
            vital,
        ) {
            if unit != vital.unit() {
                v.add("unit", format!("must be '{}' for {vital}", vital.unit()));
            }
        }

        let effective_at = match req.effective_at.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            Some(text) => v.datetime("effective_at", text),
            None => Some(now),
        };
        let mut age_months = None;
        if let Some(effective_at) = effective_at {
            let latest = now.checked_add_signed(self.cfg.clock_skew());
            if latest.is_some_and(|latest| effective_at > latest) {
                v.add("effective_at", "cannot be in the future");
            } else if let Some(patient) = &patient {
                let birth_date = birth_date_of(&patient.resource)?;
                match Age::between(birth_date, effective_at.date_naive()) {
                    Some(age) => age_months = Some(age.total_months),
                    None => v.add("effective_at", "cannot be before the patient's birth date"),
                }
            }
        }

        let status = match req.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(status) => v.one_of::<ObservationStatus>(
                "status",
                status,
                &ObservationStatus::all().map(ObservationStatus::as_str),
            ),
            None => Some(ObservationStatus::Final),
        };

        let note = v.optional_text("note", req.note.as_deref(), MAX_NOTE_CHARS);

        let (Some(patient_id), Some(vital), Some(effective_at), Some(status), Ok(note), true) =
            (patient_id, vital, effective_at, status, note, v.is_empty())
        else {
            return Err(v.into_error());
        };
        let Some(age_months) = age_months else {
            return Err(missing_patient(Some(patient_id)));
        };

        let band = AgeBand::for_age_months(age_months);
        let range = reference_range(vital, band);

        let mut observation = Observation::new(status.as_str());
        observation.category.push(CodeableConcept::single(
            OBSERVATION_CATEGORY_SYSTEM,
            VITAL_SIGNS_CATEGORY,
            "Vital Signs",
        ));
        observation.code = CodeableConcept::single(LOINC_SYSTEM, vital.loinc_code(), vital.display());
        observation.subject = Some(Reference::to(Patient::RESOURCE_TYPE, &patient_id.to_string()));
        observation.effective_date_time = Some(format_datetime(effective_at));
        observation.issued = Some(format_datetime(now));
        observation.value_quantity = Some(ucum(req.value, vital));
        if let Some(range) = range {
            let flag = interpret(req.value, range);
            observation.interpretation.push(CodeableConcept::single(
                INTERPRETATION_SYSTEM,
                flag.code(),
                flag.display(),
            ));
            observation.reference_range.push(ObservationReferenceRange {
                low: Some(ucum(range.low, vital)),
                high: Some(ucum(range.high, vital)),
                text: Some(band.label().to_string()),
            });
        }
        if let Some(text) = note {
            observation.note.push(Annotation { text, time: None });
        }

        Ok(observation)
    }

    // ========================================================================
    // FHIR -> RESPONSE
    // ========================================================================

    fn observation_res(&self, stored: &Stored<Observation>) -> CoreResult<ObservationRes> {
        let obs = &stored.resource;
        let corrupt = |detail: &str| CoreError::corrupt(Observation::RESOURCE_TYPE, detail);

        let vital = obs
            .code
            .code_in(LOINC_SYSTEM)
            .and_then(VitalSign::from_loinc)
            .ok_or_else(|| corrupt("code is not a supported LOINC vital sign"))?;
        let value = obs
            .value_quantity
            .as_ref()
            .and_then(|q| q.value)
            .ok_or_else(|| corrupt("valueQuantity missing"))?;
        let patient_id = obs
            .subject
            .as_ref()
            .and_then(|s| s.id_of(Patient::RESOURCE_TYPE))
            .ok_or_else(|| corrupt("subject is not a Patient reference"))?
            .to_string();
        let effective_text = obs
            .effective_date_time
            .clone()
            .ok_or_else(|| corrupt("effectiveDateTime missing"))?;
        let effective_at =
            parse_datetime(&effective_text).ok_or_else(|| corrupt("effectiveDateTime invalid"))?;

        let patient = match ResourceId::parse(&patient_id) {
            Ok(id) => referenced_patient(&self.registry, Some(id))?,
            Err(_) => None,
        };
        let patient_age_months = match patient {
            Some(patient) => {
                let birth_date = birth_date_of(&patient.resource)?;
                Age::between(birth_date, effective_at.date_naive()).map(|a| a.total_months)
            }
            None => None,
        };

        let reference_range = obs.reference_range.first().and_then(|rr| {
            let low = rr.low.as_ref().and_then(|q| q.value)?;
            let high = rr.high.as_ref().and_then(|q| q.value)?;
            let band = rr.text.as_deref().and_then(AgeBand::from_label)?;
            Some((Range::new(low, high), band))
        });

        let interpretation = obs
            .interpretation
            .first()
            .and_then(|c| c.code_in(INTERPRETATION_SYSTEM))
            .and_then(Interpretation::from_code);

        let (created_at, updated_at) = timestamps(stored);

        Ok(ObservationRes {
            id: stored.id.to_string(),
            version: stored.version,
            patient_id,
            vital: vital.as_str().to_string(),
            loinc_code: vital.loinc_code().to_string(),
            display: vital.display().to_string(),
            value,
            unit: vital.unit().to_string(),
            effective_at: format_datetime(effective_at),
            status: obs.status.clone(),
            patient_age_months,
            reference_range: reference_range.map(|(range, band)| ReferenceRangeRes {
                low: range.low,
                high: range.high,
                unit: vital.unit().to_string(),
                age_band: band.as_str().to_string(),
            }),
            interpretation: interpretation.map(|i| CodeDisplayRes {
                code: i.code().to_string(),
                display: i.display().to_string(),
            }),
            abnormal: interpretation.is_some_and(Interpretation::is_abnormal),
            note: obs.note.first().map(|n| n.text.clone()),
            created_at,
            updated_at,
        })
    }
}

fn ucum(value: f64, vital: VitalSign) -> Quantity {
    Quantity {
        value: Some(value),
        unit: Some(vital.unit().to_string()),
        system: Some(UCUM_SYSTEM.to_string()),
        code: Some(vital.unit().to_string()),
    }
}
