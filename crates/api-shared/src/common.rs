use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Age derived from a birth date at the time of the request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AgeRes {
    /// Completed years.
    pub years: u32,
    /// Completed months past the last birthday (0-11).
    pub months: u32,
    /// Days past the last monthly anniversary.
    pub days: u32,
    /// Completed months since birth.
    pub total_months: u32,
    /// Human readable age, e.g. `"2 years 3 months"`.
    pub display: String,
}

/// A code with its display text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CodeDisplayRes {
    pub code: String,
    pub display: String,
}
