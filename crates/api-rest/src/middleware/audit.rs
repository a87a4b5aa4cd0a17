//! Audit trail of every request.
//!
//! Emits one structured event per request on the `audit` target. Fields follow the FHIR
//! `AuditEvent` vocabulary so the log can be mapped onto AuditEvent resources later.

use std::time::Instant;

use axum::{
    extract::Request,
    http::{header, Method},
    middleware::Next,
    response::Response,
};

use super::{client_ip, RequestContext};

/// FHIR `AuditEvent.action` for a request.
fn audit_action(method: &Method, path: &str) -> &'static str {
    match *method {
        Method::POST if path.ends_with("/cancel") => "U",
        Method::POST => "C",
        Method::GET | Method::HEAD => "R",
        Method::PUT | Method::PATCH => "U",
        Method::DELETE => "D",
        _ => "E",
    }
}

/// FHIR R4 `AuditEvent.outcome`: 0 success, 4 minor failure, 8 serious failure.
fn audit_outcome(status: u16) -> &'static str {
    match status {
        0..=399 => "0",
        400..=499 => "4",
        _ => "8",
    }
}

/// Resource type and id addressed by `path`, if it targets a stored resource.
fn audit_target(path: &str) -> Option<(&'static str, Option<&str>)> {
    let mut segments = path.trim_start_matches('/').split('/');
    let resource_type = match segments.next()? {
        "patients" => "Patient",
        "observations" => "Observation",
        "appointments" => "Appointment",
        _ => return None,
    };
    let id = segments.next().filter(|s| !s.is_empty());
    Some((resource_type, id))
}

pub async fn audit_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let ip = client_ip(&req);
    let request_id = req
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let target = audit_target(&path);
    let resource_id = target.and_then(|(_, id)| id.map(String::from)).or_else(|| {
        // Creation only learns the id from the Location header.
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|loc| loc.rsplit('/').next())
            .map(String::from)
    });

    tracing::info!(
        target: "audit",
        request_id = %request_id,
        client_ip = %ip,
        method = %method,
        path = %path,
        resource_type = target.map(|(rt, _)| rt).unwrap_or("-"),
        resource_id = resource_id.as_deref().unwrap_or("-"),
        action = audit_action(&method, &path),
        outcome = audit_outcome(status),
        status,
        duration_ms = start.elapsed().as_millis() as u64,
        "request audited"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_follow_method() {
        assert_eq!(audit_action(&Method::POST, "/patients"), "C");
        assert_eq!(audit_action(&Method::POST, "/appointments/abc/cancel"), "U");
        assert_eq!(audit_action(&Method::GET, "/patients/abc"), "R");
        assert_eq!(audit_action(&Method::PUT, "/patients/abc"), "U");
        assert_eq!(audit_action(&Method::DELETE, "/patients/abc"), "D");
        assert_eq!(audit_action(&Method::OPTIONS, "/patients"), "E");
    }

    #[test]
    fn outcome_codes() {
        assert_eq!(audit_outcome(201), "0");
        assert_eq!(audit_outcome(404), "4");
        assert_eq!(audit_outcome(500), "8");
    }

    #[test]
    fn targets_only_resource_paths() {
        assert_eq!(audit_target("/patients"), Some(("Patient", None)));
        assert_eq!(
            audit_target("/appointments/abc/cancel"),
            Some(("Appointment", Some("abc")))
        );
        assert_eq!(audit_target("/observations/"), Some(("Observation", None)));
        assert_eq!(audit_target("/health"), None);
        assert_eq!(audit_target("/reference/vital-signs"), None);
    }
}
