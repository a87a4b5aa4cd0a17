mod common;

use api_rest::ServerConfig;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use common::*;

#[tokio::test]
async fn health_is_alive() {
    let res = get(&app(), "/health").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["ok"], true);
}

#[tokio::test]
async fn metadata_is_a_capability_statement() {
    let res = get(&app(), "/metadata").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.headers["content-type"],
        "application/fhir+json; charset=utf-8"
    );
    assert_eq!(res.body["resourceType"], "CapabilityStatement");
    assert_eq!(res.body["fhirVersion"], "4.0.1");
    let types: Vec<_> = res.body["rest"][0]["resource"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(types, ["Patient", "Observation", "Appointment"]);
}

#[tokio::test]
async fn reference_tables() {
    let app = app();

    let res = get(&app, "/reference/vital-signs?age_months=6").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["age_band"], "infant");
    assert_eq!(res.body["items"].as_array().unwrap().len(), 8);

    let res = get(&app, "/reference/vital-signs").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["resourceType"], "OperationOutcome");

    let res = get(&app, "/reference/appointment-types").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["items"][0]["appointment_type"], "well_child");
    assert_eq!(res.body["items"][0]["default_minutes"], 30);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let res = get(&app(), "/api-docs/openapi.json").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body["paths"]["/patients/{id}"].is_object());
    assert!(res.body["paths"]["/appointments/{id}/cancel"].is_object());
}

#[tokio::test]
async fn request_ids_are_assigned_and_echoed() {
    let app = app();

    let res = get(&app, "/health").await;
    let generated = res.headers["x-request-id"].to_str().unwrap();
    assert_eq!(generated.len(), 36);

    let res = send(
        &app,
        Request::builder()
            .uri("/health")
            .header("x-request-id", "client-req.42")
            .header("x-correlation-id", "journey-7")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(res.headers["x-request-id"], "client-req.42");
    assert_eq!(res.headers["x-correlation-id"], "journey-7");

    let res = send(
        &app,
        Request::builder()
            .uri("/health")
            .header("x-request-id", "<script>")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_ne!(res.headers["x-request-id"], "<script>");
}

#[tokio::test]
async fn security_headers_on_errors_too() {
    let res = get(&app(), "/patients/0123456789abcdef0123456789abcdef").await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.headers["x-content-type-options"], "nosniff");
    assert_eq!(res.headers["x-frame-options"], "DENY");
    assert_eq!(res.headers["cache-control"], "no-store");
    assert!(res.headers.get("x-request-id").is_some());
}

#[tokio::test]
async fn rate_limit_applies_per_client_but_not_to_health() {
    let app = app_with(ServerConfig {
        rate_limit_requests: 2,
        ..ServerConfig::default()
    });

    for remaining in ["1", "0"] {
        let res = get(&app, "/patients").await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.headers["x-ratelimit-limit"], "2");
        assert_eq!(res.headers["x-ratelimit-remaining"], remaining);
    }

    let res = get(&app, "/patients").await;
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res.body["issue"][0]["code"], "throttled");
    assert!(res.headers.get("retry-after").is_some());
    assert_eq!(res.headers["x-content-type-options"], "nosniff");
    assert_eq!(res.headers["cache-control"], "no-store");

    let res = send(
        &app,
        Request::builder()
            .uri("/patients")
            .header("x-forwarded-for", "198.51.100.9")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);

    let res = get(&app, "/health").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.headers.get("x-ratelimit-limit").is_none());
}

#[tokio::test]
async fn bodies_must_be_json_and_small() {
    let app = app_with(ServerConfig {
        max_body_bytes: 128,
        ..ServerConfig::default()
    });

    let res = send(
        &app,
        Request::builder()
            .method(Method::POST)
            .uri("/patients")
            .header("content-type", "text/plain")
            .body(Body::from("family=Lee"))
            .unwrap(),
    )
    .await;
    assert_eq!(res.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(res.body["issue"][0]["code"], "not-supported");

    let mut big = patient_body();
    big["family"] = serde_json::Value::String("L".repeat(200));
    let res = send_json(&app, Method::POST, "/patients", &big).await;
    assert_eq!(res.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(res.body["issue"][0]["code"], "too-long");

    let res = send(
        &app,
        Request::builder()
            .method(Method::POST)
            .uri("/patients")
            .header("content-type", "application/fhir+json")
            .body(Body::from("{ not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["issue"][0]["code"], "structure");
}

#[tokio::test]
async fn input_is_sanitised_before_validation() {
    let app = app();
    let mut body = patient_body();
    body["family"] = serde_json::json!("  <em>Lee</em>\u{0007} ");

    let res = send_json(&app, Method::POST, "/patients", &body).await;

    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    assert_eq!(res.body["family"], "Lee");
}
