use super::common::*;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn check_route_returns_flat_result() {
    let payload = json!({
        "donor": {
            "donor_id": "donor-77",
            "birth_date": "1990-04-02",
            "blood_type": "O-",
            "medical_history": {
                "current_medications": ["Warfarin"],
                "blood_transfusions": [{ "date": "not-a-date" }]
            }
        },
        "last_donation_date": "2025-05-01",
        "reference_date": "2025-06-15"
    });

    let response = router()
        .oneshot(
            Request::post("/api/v1/donors/eligibility")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["is_eligible"], false);
    assert_eq!(body["next_eligible_date"], "2025-06-26");
    assert_eq!(body["temporary_deferrals"].as_array().map(Vec::len), Some(2));
    assert_eq!(
        body["reasons"][0],
        "Must wait 11 more days since last donation"
    );
}

#[tokio::test]
async fn check_route_rejects_missing_birth_date() {
    let payload = json!({ "donor": { "blood_type": "A+" } });

    let response = router()
        .oneshot(
            Request::post("/api/v1/donors/eligibility")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .is_some_and(|error| error.contains("birth date")));
}

#[tokio::test]
async fn summary_route_reports_permanent_status() {
    let payload = json!({
        "donor": {
            "birth_date": "1980-01-01",
            "medical_history": { "chronic_conditions": ["Chronic hepatitis C"] }
        }
    });

    let response = router()
        .oneshot(
            Request::post("/api/v1/donors/eligibility/summary")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "permanently-deferred");
    assert!(body.get("next_eligible_date").is_none());
}

#[tokio::test]
async fn next_eligible_date_route_adds_interval() {
    let response = router()
        .oneshot(
            Request::get("/api/v1/donors/next-eligible-date?last_donation_date=2025-01-01")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["next_eligible_date"], "2025-02-26");
}
