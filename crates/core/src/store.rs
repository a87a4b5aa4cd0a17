//! In-memory resource storage.
//!
//! Each resource type lives in its own [`ResourceStore`], keyed by [`ResourceId`]. Records are
//! held as the FHIR resource itself plus the bookkeeping the API needs (version, timestamps and
//! an insertion sequence for stable ordering). The store stamps `id` and `meta` on every write so
//! the resource is always a valid, self-describing FHIR document.
//!
//! Lock poisoning is reported as [`CoreError::StoreUnavailable`] rather than propagating the
//! panic into every later request.

use crate::validation::format_datetime;
use crate::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use fhir::{Appointment, Observation, Patient, Resource};
use paeds_uuid::ResourceId;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A resource together with its storage metadata.
#[derive(Clone, Debug)]
pub struct Stored<R> {
    pub id: ResourceId,
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Insertion order; never reused.
    pub seq: u64,
    pub resource: R,
}

struct Records<R> {
    by_id: HashMap<ResourceId, Stored<R>>,
    next_seq: u64,
}

/// Versioned storage for one FHIR resource type.
pub struct ResourceStore<R> {
    records: RwLock<Records<R>>,
}

impl<R> Default for ResourceStore<R> {
    fn default() -> Self {
        Self {
            records: RwLock::new(Records {
                by_id: HashMap::new(),
                next_seq: 0,
            }),
        }
    }
}

impl<R: Resource> ResourceStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> CoreResult<RwLockReadGuard<'_, Records<R>>> {
        self.records.read().map_err(|_| {
            tracing::error!(resource_type = R::RESOURCE_TYPE, "store lock poisoned");
            CoreError::StoreUnavailable
        })
    }

    fn write(&self) -> CoreResult<RwLockWriteGuard<'_, Records<R>>> {
        self.records.write().map_err(|_| {
            tracing::error!(resource_type = R::RESOURCE_TYPE, "store lock poisoned");
            CoreError::StoreUnavailable
        })
    }

    /// Store a new resource under a freshly generated id at version 1.
    pub fn insert(&self, mut resource: R, now: DateTime<Utc>) -> CoreResult<Stored<R>> {
        let id = ResourceId::new();
        resource.stamp(id.to_string(), 1, format_datetime(now));

        let mut records = self.write()?;
        let seq = records.next_seq;
        records.next_seq += 1;

        let stored = Stored {
            id,
            version: 1,
            created_at: now,
            updated_at: now,
            seq,
            resource,
        };
        records.by_id.insert(id, stored.clone());
        Ok(stored)
    }

    /// Fetch a resource by id.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotFound`] if no resource has this id.
    pub fn get(&self, id: &ResourceId) -> CoreResult<Stored<R>> {
        self.read()?
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::not_found(R::RESOURCE_TYPE, id))
    }

    /// Replace the resource wholesale, bumping its version.
    ///
    /// `created_at` and the insertion sequence are kept.
    pub fn replace(&self, id: &ResourceId, resource: R, now: DateTime<Utc>) -> CoreResult<Stored<R>> {
        self.modify(id, now, |current| {
            *current = resource;
            Ok(())
        })
    }

    /// Apply `change` to the current resource under the write lock.
    ///
    /// If `change` fails nothing is written and the version is unchanged.
    pub fn modify<F>(&self, id: &ResourceId, now: DateTime<Utc>, change: F) -> CoreResult<Stored<R>>
    where
        F: FnOnce(&mut R) -> CoreResult<()>,
    {
        let mut records = self.write()?;
        let stored = records
            .by_id
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found(R::RESOURCE_TYPE, id))?;

        let mut resource = stored.resource.clone();
        change(&mut resource)?;

        let version = stored.version + 1;
        resource.stamp(id.to_string(), version, format_datetime(now));

        stored.version = version;
        stored.updated_at = now;
        stored.resource = resource;
        Ok(stored.clone())
    }

    /// Remove a resource, returning what was stored.
    pub fn remove(&self, id: &ResourceId) -> CoreResult<Stored<R>> {
        self.write()?
            .by_id
            .remove(id)
            .ok_or_else(|| CoreError::not_found(R::RESOURCE_TYPE, id))
    }

    /// All resources in insertion order.
    pub fn list(&self) -> CoreResult<Vec<Stored<R>>> {
        let mut items: Vec<_> = self.read()?.by_id.values().cloned().collect();
        items.sort_by_key(|s| s.seq);
        Ok(items)
    }

    /// Whether any stored resource matches `predicate`.
    pub fn any<P>(&self, predicate: P) -> CoreResult<bool>
    where
        P: Fn(&R) -> bool,
    {
        Ok(self.read()?.by_id.values().any(|s| predicate(&s.resource)))
    }

    pub fn len(&self) -> CoreResult<usize> {
        Ok(self.read()?.by_id.len())
    }

    pub fn is_empty(&self) -> CoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// One store per supported resource type, shared by every service.
#[derive(Default)]
pub struct Registry {
    pub patients: ResourceStore<Patient>,
    pub observations: ResourceStore<Observation>,
    pub appointments: ResourceStore<Appointment>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }
}
