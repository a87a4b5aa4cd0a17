//! Fixed-window rate limiting per client address.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::RwLock;

use super::client_ip;
use super::security::harden;
use crate::error::ApiError;

/// Expired windows are swept once the table holds more keys than this.
const PRUNE_THRESHOLD: usize = 10_000;

/// Paths that are never limited.
const EXEMPT_PATHS: &[&str] = &["/health"];

struct WindowEntry {
    count: u32,
    window_start: Instant,
}

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    /// Requests left in the current window after this one.
    pub remaining: u32,
    /// Time until the current window closes.
    pub resets_in: Duration,
}

/// Counts requests per key in fixed windows.
pub struct RateLimiter {
    windows: RwLock<HashMap<String, WindowEntry>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Admit or reject one request from `key`.
    pub async fn check(&self, key: &str) -> Decision {
        self.check_at(key, Instant::now()).await
    }

    async fn check_at(&self, key: &str, now: Instant) -> Decision {
        let mut windows = self.windows.write().await;

        if windows.len() > PRUNE_THRESHOLD && !windows.contains_key(key) {
            let window = self.window;
            let before = windows.len();
            windows.retain(|_, entry| now.duration_since(entry.window_start) < window);
            tracing::debug!(removed = before - windows.len(), "pruned expired rate limit windows");
        }

        let entry = windows.entry(key.to_string()).or_insert(WindowEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) >= self.window {
            entry.count = 0;
            entry.window_start = now;
        }

        let resets_in = self
            .window
            .saturating_sub(now.duration_since(entry.window_start));

        if entry.count >= self.max_requests {
            return Decision {
                allowed: false,
                remaining: 0,
                resets_in,
            };
        }

        entry.count += 1;
        Decision {
            allowed: true,
            remaining: self.max_requests - entry.count,
            resets_in,
        }
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.windows.read().await.len()
    }
}

/// Rejects clients that exceed their window with `429` and a `Retry-After` header.
///
/// Every limited response carries `X-RateLimit-Limit` and `X-RateLimit-Remaining`.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    if EXEMPT_PATHS.contains(&req.uri().path()) {
        return next.run(req).await;
    }

    let ip = client_ip(&req);
    let decision = limiter.check(&ip).await;

    let mut response = if decision.allowed {
        next.run(req).await
    } else {
        tracing::warn!(client_ip = %ip, "rate limit exceeded");
        let retry_after_secs = decision.resets_in.as_secs_f64().ceil().max(1.0) as u64;
        let mut rejected = ApiError::RateLimited { retry_after_secs }.into_response();
        harden(rejected.headers_mut());
        rejected
    };

    let headers = response.headers_mut();
    headers.insert(
        "x-ratelimit-limit",
        HeaderValue::from(limiter.max_requests()),
    );
    headers.insert(
        "x-ratelimit-remaining",
        HeaderValue::from(decision.remaining),
    );

    response
}
