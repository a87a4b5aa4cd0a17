//! Resource identifier utilities.
//!
//! Every stored resource is keyed by a generated identifier. To keep identifiers stable across
//! URLs, FHIR `id` elements and log lines, a single *canonical* representation is used:
//! **32 lowercase hexadecimal characters** (no hyphens).
//!
//! ## Canonical form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! This is the same value you would get from `Uuid::new_v4().simple().to_string()`, and it is a
//! valid FHIR `id` (`[A-Za-z0-9\-\.]{1,64}`).
//!
//! Identifiers supplied from outside (URL paths, request bodies) must already be canonical.
//! Use [`ResourceId::parse`] to validate them; non-canonical values are rejected rather than
//! normalised.

mod id;

pub use id::{ResourceId, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
