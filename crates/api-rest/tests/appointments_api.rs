mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use common::*;
use serde_json::{json, Value};

fn well_child(patient_id: &str, start: &str) -> Value {
    json!({
        "patient_id": patient_id,
        "appointment_type": "well_child",
        "start": start,
        "practitioner": "Dr Amara Osei"
    })
}

async fn book(app: &axum::Router, patient_id: &str, start: &str) -> String {
    let res = send_json(app, Method::POST, "/appointments", &well_child(patient_id, start)).await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    res.body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn booking_fills_defaults() {
    let app = app();
    let patient = create_patient(&app).await;

    let res = send_json(
        &app,
        Method::POST,
        "/appointments",
        &well_child(&patient, "2030-06-01T09:00:00Z"),
    )
    .await;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["end"], "2030-06-01T09:30:00Z");
    assert_eq!(res.body["duration_minutes"], 30);
    assert_eq!(res.body["status"], "booked");
    assert_eq!(res.body["priority"], "routine");
    assert_eq!(res.body["priority_code"], 5);
    assert_eq!(res.body["service_type"]["code"], "410620009");
}

#[tokio::test]
async fn fhir_shape_lists_participants() {
    let app = app();
    let patient = create_patient(&app).await;
    let id = book(&app, &patient, "2030-06-01T09:00:00Z").await;

    let res = get(&app, &format!("/appointments/{id}?_format=fhir")).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["resourceType"], "Appointment");
    assert_eq!(res.body["status"], "booked");
    assert_eq!(res.body["minutesDuration"], 30);
    assert_eq!(res.body["appointmentType"]["coding"][0]["code"], "CHECKUP");
    assert_eq!(
        res.body["participant"][0]["actor"]["reference"],
        format!("Patient/{patient}").as_str()
    );
    assert_eq!(res.body["participant"][1]["actor"]["display"], "Dr Amara Osei");
}

#[tokio::test]
async fn invalid_times_and_statuses_are_rejected() {
    let app = app();
    let patient = create_patient(&app).await;

    let mut body = well_child(&patient, "2030-06-01T09:00:00Z");
    body["end"] = json!("2030-06-01T08:00:00Z");
    body["status"] = json!("fulfilled");
    let res = send_json(&app, Method::POST, "/appointments", &body).await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let fields = issue_fields(&res.body);
    assert!(fields.contains(&"end".to_string()), "{fields:?}");
    assert!(fields.contains(&"status".to_string()), "{fields:?}");
}

#[tokio::test]
async fn cancel_without_body_then_conflict() {
    let app = app();
    let patient = create_patient(&app).await;
    let id = book(&app, &patient, "2030-06-01T09:00:00Z").await;

    let res = send(
        &app,
        Request::builder()
            .method(Method::POST)
            .uri(format!("/appointments/{id}/cancel"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["status"], "cancelled");
    assert_eq!(res.body["version"], 2);

    let again = send_json(
        &app,
        Method::POST,
        &format!("/appointments/{id}/cancel"),
        &json!({ "reason": "Family unwell" }),
    )
    .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn cancel_records_reason() {
    let app = app();
    let patient = create_patient(&app).await;
    let id = book(&app, &patient, "2030-06-01T09:00:00Z").await;

    let res = send_json(
        &app,
        Method::POST,
        &format!("/appointments/{id}/cancel"),
        &json!({ "reason": "Family <b>unwell</b>" }),
    )
    .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["cancellation_reason"], "Family unwell");
}

#[tokio::test]
async fn list_filters_by_day_and_status_in_start_order() {
    let app = app();
    let patient = create_patient(&app).await;
    book(&app, &patient, "2030-06-01T15:00:00Z").await;
    book(&app, &patient, "2030-06-01T09:00:00Z").await;
    let next_day = book(&app, &patient, "2030-06-02T09:00:00Z").await;
    send_json(
        &app,
        Method::POST,
        &format!("/appointments/{next_day}/cancel"),
        &json!({}),
    )
    .await;

    let res = get(&app, "/appointments?date=2030-06-01").await;
    assert_eq!(res.body["total"], 2);
    assert_eq!(res.body["items"][0]["start"], "2030-06-01T09:00:00Z");
    assert_eq!(res.body["items"][1]["start"], "2030-06-01T15:00:00Z");

    let res = get(&app, &format!("/appointments?patient={patient}&status=cancelled")).await;
    assert_eq!(res.body["total"], 1);
    assert_eq!(res.body["items"][0]["id"], next_day.as_str());
}

#[tokio::test]
async fn replace_then_delete() {
    let app = app();
    let patient = create_patient(&app).await;
    let id = book(&app, &patient, "2030-06-01T09:00:00Z").await;

    let mut body = well_child(&patient, "2030-06-01T10:00:00Z");
    body["status"] = json!("arrived");
    body["priority"] = json!("urgent");
    let res = send_json(&app, Method::PUT, &format!("/appointments/{id}"), &body).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(res.body["status"], "arrived");
    assert_eq!(res.body["priority_code"], 3);

    assert_eq!(
        delete(&app, &format!("/appointments/{id}")).await.status,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        get(&app, &format!("/appointments/{id}")).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn length_limits_are_exact() {
    let app = app();
    let patient = create_patient(&app).await;
    let with_end = |start: &str, end: &str| {
        let mut body = well_child(&patient, start);
        body["end"] = json!(end);
        body
    };

    let res = send_json(
        &app,
        Method::POST,
        "/appointments",
        &with_end("2030-06-01T08:00:00Z", "2030-06-01T16:00:00Z"),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
    assert_eq!(res.body["duration_minutes"], 480);

    for end in ["2030-06-01T16:00:01Z", "2030-06-01T16:01:00Z"] {
        let res = send_json(
            &app,
            Method::POST,
            "/appointments",
            &with_end("2030-06-01T08:00:00Z", end),
        )
        .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{end}");
        assert_eq!(issue_fields(&res.body), ["end"]);
    }

    let res = send_json(
        &app,
        Method::POST,
        "/appointments",
        &with_end("2030-06-01T08:00:00.250Z", "2030-06-01T08:00:00.750Z"),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(issue_fields(&res.body), ["end"]);
}

#[tokio::test]
async fn bookings_that_would_end_after_year_9999_leave_the_list_usable() {
    let app = app();
    let patient = create_patient(&app).await;

    let res = send_json(
        &app,
        Method::POST,
        "/appointments",
        &well_child(&patient, "9999-12-31T23:50:00Z"),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(issue_fields(&res.body), ["end"]);

    let res = get(&app, "/appointments").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["total"], 0);
}
