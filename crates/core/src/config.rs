//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Services never read process-wide environment variables during
//! request handling.

use crate::constants::{
    DEFAULT_CLOCK_SKEW_SECS, DEFAULT_MAX_APPOINTMENT_MINUTES, DEFAULT_MAX_PAGE_SIZE,
    DEFAULT_MAX_PATIENT_AGE_YEARS, DEFAULT_PAGE_SIZE, MAX_CLOCK_SKEW_SECS,
};
use crate::{CoreError, CoreResult};
use chrono::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    max_patient_age_years: u32,
    max_appointment_minutes: u32,
    clock_skew: Duration,
    default_page_size: usize,
    max_page_size: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_patient_age_years: DEFAULT_MAX_PATIENT_AGE_YEARS,
            max_appointment_minutes: DEFAULT_MAX_APPOINTMENT_MINUTES,
            clock_skew: Duration::seconds(DEFAULT_CLOCK_SKEW_SECS),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if any limit is zero or the clock skew is negative or
    /// longer than a day.
    pub fn new(
        max_patient_age_years: u32,
        max_appointment_minutes: u32,
        clock_skew_secs: i64,
        max_page_size: usize,
    ) -> CoreResult<Self> {
        if max_patient_age_years == 0 {
            return Err(CoreError::InvalidInput(
                "max_patient_age_years must be greater than zero".into(),
            ));
        }
        if max_appointment_minutes == 0 {
            return Err(CoreError::InvalidInput(
                "max_appointment_minutes must be greater than zero".into(),
            ));
        }
        if !(0..=MAX_CLOCK_SKEW_SECS).contains(&clock_skew_secs) {
            return Err(CoreError::InvalidInput(format!(
                "clock_skew_secs must be between 0 and {MAX_CLOCK_SKEW_SECS}"
            )));
        }
        if max_page_size == 0 {
            return Err(CoreError::InvalidInput(
                "max_page_size must be greater than zero".into(),
            ));
        }

        Ok(Self {
            max_patient_age_years,
            max_appointment_minutes,
            clock_skew: Duration::seconds(clock_skew_secs),
            default_page_size: DEFAULT_PAGE_SIZE.min(max_page_size),
            max_page_size,
        })
    }

    pub fn max_patient_age_years(&self) -> u32 {
        self.max_patient_age_years
    }

    pub fn max_appointment_minutes(&self) -> u32 {
        self.max_appointment_minutes
    }

    pub fn clock_skew(&self) -> Duration {
        self.clock_skew
    }

    pub fn default_page_size(&self) -> usize {
        self.default_page_size
    }

    pub fn max_page_size(&self) -> usize {
        self.max_page_size
    }
}

/// Parse an optional numeric setting, falling back to `default` when unset or blank.
///
/// `name` is only used in the error message.
pub fn numeric_setting<T>(name: &str, value: Option<String>, default: T) -> CoreResult<T>
where
    T: std::str::FromStr,
{
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(default),
        Some(v) => v
            .parse::<T>()
            .map_err(|_| CoreError::InvalidInput(format!("{name} must be a number, got '{v}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_limits() {
        assert!(CoreConfig::new(0, 480, 300, 100).is_err());
        assert!(CoreConfig::new(21, 0, 300, 100).is_err());
        assert!(CoreConfig::new(21, 480, -1, 100).is_err());
        assert!(CoreConfig::new(21, 480, 300, 0).is_err());
    }

    #[test]
    fn clock_skew_is_capped_at_a_day() {
        assert!(CoreConfig::new(21, 480, MAX_CLOCK_SKEW_SECS, 100).is_ok());
        assert!(CoreConfig::new(21, 480, MAX_CLOCK_SKEW_SECS + 1, 100).is_err());
        assert!(CoreConfig::new(21, 480, 9_000_000_000_000, 100).is_err());
    }

    #[test]
    fn default_page_size_never_exceeds_max() {
        let cfg = CoreConfig::new(21, 480, 300, 5).unwrap();
        assert_eq!(cfg.default_page_size(), 5);
        assert_eq!(cfg.max_page_size(), 5);
    }

    #[test]
    fn numeric_setting_falls_back_and_parses() {
        assert_eq!(numeric_setting::<u32>("X", None, 7).unwrap(), 7);
        assert_eq!(numeric_setting::<u32>("X", Some("  ".into()), 7).unwrap(), 7);
        assert_eq!(numeric_setting::<u32>("X", Some(" 42 ".into()), 7).unwrap(), 42);

        let err = numeric_setting::<u32>("PAEDS_X", Some("lots".into()), 7).unwrap_err();
        assert!(err.to_string().contains("PAEDS_X"));
    }
}
