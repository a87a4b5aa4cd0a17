//! Helpers shared by the resource services: paging, id handling and reference checks.

use crate::config::CoreConfig;
use crate::store::{Registry, Stored};
use crate::validation::{format_datetime, Violations};
use crate::{CoreError, CoreResult};
use chrono::NaiveDate;
use fhir::{Patient, Resource};
use paeds_uuid::ResourceId;

/// A validated window over a result list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub count: usize,
    pub offset: usize,
}

impl Page {
    /// Resolve the requested `count` and `offset` against configured limits.
    ///
    /// # Errors
    ///
    /// [`CoreError::Validation`] if `count` is zero or above the configured maximum.
    pub fn resolve(cfg: &CoreConfig, count: Option<usize>, offset: Option<usize>) -> CoreResult<Self> {
        let count = count.unwrap_or(cfg.default_page_size());
        let mut violations = Violations::new();
        if count == 0 || count > cfg.max_page_size() {
            violations.add(
                "count",
                format!("must be between 1 and {}", cfg.max_page_size()),
            );
        }
        violations.finish()?;

        Ok(Self {
            count,
            offset: offset.unwrap_or(0),
        })
    }

    /// Cut one page out of the full, already ordered, match list.
    pub fn apply<T>(&self, items: Vec<T>) -> Paged<T> {
        let total = items.len();
        let items = items
            .into_iter()
            .skip(self.offset)
            .take(self.count)
            .collect();
        Paged {
            total,
            offset: self.offset,
            items,
        }
    }
}

/// One page of results plus the number of matches before paging.
#[derive(Clone, Debug)]
pub struct Paged<T> {
    pub total: usize,
    pub offset: usize,
    pub items: Vec<T>,
}

impl<T> Paged<T> {
    pub fn map<U, F>(self, f: F) -> CoreResult<Paged<U>>
    where
        F: FnMut(T) -> CoreResult<U>,
    {
        Ok(Paged {
            total: self.total,
            offset: self.offset,
            items: self.items.into_iter().map(f).collect::<CoreResult<_>>()?,
        })
    }
}

/// Parse a resource id taken from a request body, recording a violation on failure.
pub(crate) fn body_id(violations: &mut Violations, field: &str, value: &str) -> Option<ResourceId> {
    match ResourceId::parse(value.trim()) {
        Ok(id) => Some(id),
        Err(_) => {
            violations.add(field, "must be a 32 character lowercase hex resource id");
            None
        }
    }
}

/// Parse a resource id taken from a URL path.
pub(crate) fn path_id(value: &str) -> CoreResult<ResourceId> {
    Ok(ResourceId::parse(value)?)
}

/// Look up the patient a new or replaced resource points at.
///
/// Returns `Ok(None)` when the patient does not exist so the caller can finish collecting
/// field violations before reporting the dangling reference.
pub(crate) fn referenced_patient(
    registry: &Registry,
    id: Option<ResourceId>,
) -> CoreResult<Option<Stored<Patient>>> {
    let Some(id) = id else {
        return Ok(None);
    };
    match registry.patients.get(&id) {
        Ok(stored) => Ok(Some(stored)),
        Err(CoreError::NotFound { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}

pub(crate) fn missing_patient(id: Option<ResourceId>) -> CoreError {
    match id {
        Some(id) => CoreError::InvalidReference(format!("{}/{id} does not exist", Patient::RESOURCE_TYPE)),
        None => CoreError::InvalidReference("patient_id is required".into()),
    }
}

/// Birth date stored on a patient resource.
pub(crate) fn birth_date_of(patient: &Patient) -> CoreResult<NaiveDate> {
    patient
        .birth_date
        .as_deref()
        .and_then(crate::validation::parse_date)
        .ok_or_else(|| CoreError::corrupt(Patient::RESOURCE_TYPE, "birthDate missing or invalid"))
}

/// `created_at` / `updated_at` pair rendered for a response.
pub(crate) fn timestamps<R>(stored: &Stored<R>) -> (String, String) {
    (
        format_datetime(stored.created_at),
        format_datetime(stored.updated_at),
    )
}
