mod common;

use axum::http::{Method, StatusCode};
use common::*;
use serde_json::{json, Value};

fn heart_rate(patient_id: &str, value: f64, at: &str) -> Value {
    json!({
        "patient_id": patient_id,
        "vital": "heart_rate",
        "value": value,
        "effective_at": at
    })
}

#[tokio::test]
async fn create_derives_range_and_interpretation() {
    let app = app();
    let patient = create_patient(&app).await;

    let res = send_json(
        &app,
        Method::POST,
        "/observations",
        &heart_rate(&patient, 150.0, "2024-03-20T10:00:00Z"),
    )
    .await;

    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    let id = res.body["id"].as_str().unwrap();
    assert_eq!(res.headers["location"], format!("/observations/{id}").as_str());
    assert_eq!(res.body["loinc_code"], "8867-4");
    assert_eq!(res.body["unit"], "/min");
    assert_eq!(res.body["status"], "final");
    assert_eq!(res.body["patient_age_months"], 48);
    assert_eq!(res.body["reference_range"]["low"], 80.0);
    assert_eq!(res.body["reference_range"]["high"], 120.0);
    assert_eq!(res.body["reference_range"]["age_band"], "preschool");
    assert_eq!(res.body["interpretation"]["code"], "H");
    assert_eq!(res.body["abnormal"], true);
}

#[tokio::test]
async fn fhir_shape_is_a_vital_signs_observation() {
    let app = app();
    let patient = create_patient(&app).await;
    let created = send_json(
        &app,
        Method::POST,
        "/observations",
        &heart_rate(&patient, 100.0, "2024-03-20T10:00:00Z"),
    )
    .await;
    let id = created.body["id"].as_str().unwrap();

    let res = get(&app, &format!("/observations/{id}?_format=fhir")).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["resourceType"], "Observation");
    assert_eq!(res.body["category"][0]["coding"][0]["code"], "vital-signs");
    assert_eq!(res.body["code"]["coding"][0]["code"], "8867-4");
    assert_eq!(
        res.body["subject"]["reference"],
        format!("Patient/{patient}").as_str()
    );
    assert_eq!(res.body["valueQuantity"]["value"], 100.0);
    assert_eq!(res.body["valueQuantity"]["code"], "/min");
    assert_eq!(res.body["effectiveDateTime"], "2024-03-20T10:00:00Z");
}

#[tokio::test]
async fn unknown_patient_is_a_bad_reference() {
    let app = app();

    let res = send_json(
        &app,
        Method::POST,
        "/observations",
        &heart_rate(
            "0123456789abcdef0123456789abcdef",
            100.0,
            "2024-03-20T10:00:00Z",
        ),
    )
    .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["issue"][0]["code"], "invalid");
}

#[tokio::test]
async fn implausible_values_are_rejected_together() {
    let app = app();
    let patient = create_patient(&app).await;

    let res = send_json(
        &app,
        Method::POST,
        "/observations",
        &json!({
            "patient_id": patient,
            "vital": "heart_rate",
            "value": 900,
            "unit": "bpm",
            "status": "draft"
        }),
    )
    .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(issue_fields(&res.body), ["value", "unit", "status"]);
}

#[tokio::test]
async fn list_filters_by_patient_and_vital_newest_first() {
    let app = app();
    let patient = create_patient(&app).await;
    let other = create_patient(&app).await;

    for at in ["2024-03-20T10:00:00Z", "2024-05-01T09:30:00Z"] {
        send_json(&app, Method::POST, "/observations", &heart_rate(&patient, 100.0, at)).await;
    }
    send_json(&app, Method::POST, "/observations", &heart_rate(&other, 100.0, "2024-04-01T00:00:00Z")).await;
    send_json(
        &app,
        Method::POST,
        "/observations",
        &json!({ "patient_id": patient, "vital": "body_weight", "value": 17.0 }),
    )
    .await;

    let res = get(&app, &format!("/observations?patient={patient}&vital=heart_rate")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["total"], 2);
    assert_eq!(res.body["items"][0]["effective_at"], "2024-05-01T09:30:00Z");
    assert_eq!(res.body["items"][1]["effective_at"], "2024-03-20T10:00:00Z");

    let res = get(&app, &format!("/observations?patient={patient}&_format=fhir")).await;
    assert_eq!(res.body["resourceType"], "Bundle");
    assert_eq!(res.body["total"], 3);
}

#[tokio::test]
async fn update_recomputes_interpretation() {
    let app = app();
    let patient = create_patient(&app).await;
    let created = send_json(
        &app,
        Method::POST,
        "/observations",
        &heart_rate(&patient, 150.0, "2024-03-20T10:00:00Z"),
    )
    .await;
    let id = created.body["id"].as_str().unwrap();

    let res = send_json(
        &app,
        Method::PUT,
        &format!("/observations/{id}"),
        &heart_rate(&patient, 100.0, "2024-03-20T10:00:00Z"),
    )
    .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["version"], 2);
    assert_eq!(res.body["interpretation"]["code"], "N");
    assert_eq!(res.body["abnormal"], false);
}
