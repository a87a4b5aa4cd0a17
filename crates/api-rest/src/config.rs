//! Server configuration.
//!
//! Resolved once at startup from `PAEDS_*` environment variables (after `.env` has been loaded
//! by the binary). Nothing reads the environment while serving requests.

use std::str::FromStr;
use std::time::Duration;

use paeds_core::config::numeric_setting;
use paeds_core::constants::{
    DEFAULT_CLOCK_SKEW_SECS, DEFAULT_MAX_APPOINTMENT_MINUTES, DEFAULT_MAX_PAGE_SIZE,
    DEFAULT_MAX_PATIENT_AGE_YEARS,
};
use paeds_core::{CoreConfig, CoreError, CoreResult};

pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 100;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// Log output format selected by `PAEDS_LOG_FORMAT`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(CoreError::InvalidInput(format!(
                "PAEDS_LOG_FORMAT must be 'text' or 'json', got '{other}'"
            ))),
        }
    }
}

/// Everything the REST server needs to start.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: String,
    pub rate_limit_requests: u32,
    pub rate_limit_window: Duration,
    pub max_body_bytes: usize,
    /// Allowed CORS origins; empty means no CORS headers are emitted.
    pub cors_origins: Vec<String>,
    pub log_format: LogFormat,
    pub core: CoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_REST_ADDR.to_string(),
            rate_limit_requests: DEFAULT_RATE_LIMIT_REQUESTS,
            rate_limit_window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            cors_origins: Vec::new(),
            log_format: LogFormat::Text,
            core: CoreConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Resolve configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if any variable is malformed or out of range.
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CoreResult<Self> {
        let addr = lookup("PAEDS_REST_ADDR")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_REST_ADDR.to_string());

        let rate_limit_requests = numeric_setting(
            "PAEDS_RATE_LIMIT_REQUESTS",
            lookup("PAEDS_RATE_LIMIT_REQUESTS"),
            DEFAULT_RATE_LIMIT_REQUESTS,
        )?;
        let rate_limit_window_secs = numeric_setting(
            "PAEDS_RATE_LIMIT_WINDOW_SECS",
            lookup("PAEDS_RATE_LIMIT_WINDOW_SECS"),
            DEFAULT_RATE_LIMIT_WINDOW_SECS,
        )?;
        let max_body_bytes = numeric_setting(
            "PAEDS_MAX_BODY_BYTES",
            lookup("PAEDS_MAX_BODY_BYTES"),
            DEFAULT_MAX_BODY_BYTES,
        )?;

        if rate_limit_requests == 0 {
            return Err(CoreError::InvalidInput(
                "PAEDS_RATE_LIMIT_REQUESTS must be greater than zero".into(),
            ));
        }
        if rate_limit_window_secs == 0 {
            return Err(CoreError::InvalidInput(
                "PAEDS_RATE_LIMIT_WINDOW_SECS must be greater than zero".into(),
            ));
        }
        if max_body_bytes == 0 {
            return Err(CoreError::InvalidInput(
                "PAEDS_MAX_BODY_BYTES must be greater than zero".into(),
            ));
        }

        let cors_origins = lookup("PAEDS_CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let log_format = lookup("PAEDS_LOG_FORMAT")
            .map(|v| v.parse::<LogFormat>())
            .transpose()?
            .unwrap_or_default();

        let core = CoreConfig::new(
            numeric_setting(
                "PAEDS_MAX_PATIENT_AGE_YEARS",
                lookup("PAEDS_MAX_PATIENT_AGE_YEARS"),
                DEFAULT_MAX_PATIENT_AGE_YEARS,
            )?,
            numeric_setting(
                "PAEDS_MAX_APPOINTMENT_MINUTES",
                lookup("PAEDS_MAX_APPOINTMENT_MINUTES"),
                DEFAULT_MAX_APPOINTMENT_MINUTES,
            )?,
            numeric_setting(
                "PAEDS_CLOCK_SKEW_SECS",
                lookup("PAEDS_CLOCK_SKEW_SECS"),
                DEFAULT_CLOCK_SKEW_SECS,
            )?,
            numeric_setting(
                "PAEDS_MAX_PAGE_SIZE",
                lookup("PAEDS_MAX_PAGE_SIZE"),
                DEFAULT_MAX_PAGE_SIZE,
            )?,
        )?;

        Ok(Self {
            addr,
            rate_limit_requests,
            rate_limit_window: Duration::from_secs(rate_limit_window_secs),
            max_body_bytes,
            cors_origins,
            log_format,
            core,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let cfg = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.addr, "0.0.0.0:3000");
        assert_eq!(cfg.rate_limit_requests, 100);
        assert_eq!(cfg.rate_limit_window, Duration::from_secs(60));
        assert_eq!(cfg.max_body_bytes, 65536);
        assert!(cfg.cors_origins.is_empty());
        assert_eq!(cfg.log_format, LogFormat::Text);
        assert_eq!(cfg.core.max_patient_age_years(), 21);
    }

    #[test]
    fn reads_overrides() {
        let cfg = ServerConfig::from_lookup(lookup_from(&[
            ("PAEDS_REST_ADDR", "127.0.0.1:8080"),
            ("PAEDS_RATE_LIMIT_REQUESTS", "5"),
            ("PAEDS_CORS_ORIGINS", "https://a.example, https://b.example,"),
            ("PAEDS_LOG_FORMAT", "JSON"),
            ("PAEDS_MAX_PAGE_SIZE", "10"),
        ]))
        .unwrap();

        assert_eq!(cfg.addr, "127.0.0.1:8080");
        assert_eq!(cfg.rate_limit_requests, 5);
        assert_eq!(cfg.cors_origins, ["https://a.example", "https://b.example"]);
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.core.max_page_size(), 10);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ServerConfig::from_lookup(lookup_from(&[("PAEDS_RATE_LIMIT_REQUESTS", "0")])).is_err());
        assert!(ServerConfig::from_lookup(lookup_from(&[("PAEDS_MAX_BODY_BYTES", "big")])).is_err());
        assert!(ServerConfig::from_lookup(lookup_from(&[("PAEDS_LOG_FORMAT", "xml")])).is_err());
        assert!(ServerConfig::from_lookup(lookup_from(&[("PAEDS_MAX_PATIENT_AGE_YEARS", "0")])).is_err());
        assert!(ServerConfig::from_lookup(lookup_from(&[("PAEDS_CLOCK_SKEW_SECS", "9000000000000")])).is_err());
    }
}
