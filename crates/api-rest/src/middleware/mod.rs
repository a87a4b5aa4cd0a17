//! Middleware stack for the API.
//!
//! Applied outermost first: request id, audit, rate limit, security headers, data minimisation,
//! input sanitisation. See [`crate::router`] for the wiring.

pub mod audit;
pub mod layers;
pub mod minimise;
pub mod rate_limit;
pub mod request_id;
pub mod sanitise;
pub mod security;

pub use audit::audit_middleware;
pub use layers::cors;
pub use minimise::minimise_middleware;
pub use rate_limit::{rate_limit_middleware, RateLimiter};
pub use request_id::{request_id_middleware, RequestContext};
pub use sanitise::sanitise_middleware;
pub use security::security_headers_middleware;

use axum::{extract::ConnectInfo, extract::Request};
use std::net::SocketAddr;

/// Best-effort client address: first `X-Forwarded-For` hop, else the socket peer, else `unknown`.
pub fn client_ip(req: &Request) -> String {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn client_ip_prefers_first_forwarded_hop() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&req), "203.0.113.7");
    }

    #[test]
    fn client_ip_falls_back_to_socket_then_unknown() {
        let mut req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_ip(&req), "unknown");

        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 4000))));
        assert_eq!(client_ip(&req), "192.0.2.1");
    }
}
