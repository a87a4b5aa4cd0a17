//! Shared application state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use paeds_core::PaedsServices;

use crate::config::ServerConfig;
use crate::middleware::RateLimiter;

/// Application state for the REST API server
///
/// Cloned into every handler; all members are cheap handles onto shared data.
#[derive(Clone)]
pub struct AppState {
    pub services: PaedsServices,
    pub config: Arc<ServerConfig>,
    pub limiter: Arc<RateLimiter>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// State with empty in-memory stores.
    pub fn new(config: ServerConfig) -> Self {
        let limiter = RateLimiter::new(config.rate_limit_requests, config.rate_limit_window);

        Self {
            services: PaedsServices::in_memory(config.core.clone()),
            config: Arc::new(config),
            limiter: Arc::new(limiter),
            started_at: Utc::now(),
        }
    }
}
