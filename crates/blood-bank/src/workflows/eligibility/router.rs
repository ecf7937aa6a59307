use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::DonorSnapshot;
use super::{EligibilityEngine, EligibilityError};

/// Body for a full eligibility check. `last_donation_date` overrides the snapshot's
/// own value; `reference_date` defaults to today.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityCheckRequest {
    pub donor: DonorSnapshot,
    #[serde(default)]
    pub last_donation_date: Option<NaiveDate>,
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilitySummaryRequest {
    pub donor: DonorSnapshot,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NextEligibleDateQuery {
    pub last_donation_date: NaiveDate,
}

/// Router builder exposing the engine to booking, matching and profile screens.
pub fn eligibility_router(engine: Arc<EligibilityEngine>) -> Router {
    Router::new()
        .route("/api/v1/donors/eligibility", post(check_handler))
        .route("/api/v1/donors/eligibility/summary", post(summary_handler))
        .route(
            "/api/v1/donors/next-eligible-date",
            get(next_eligible_date_handler),
        )
        .with_state(engine)
}

pub(crate) async fn check_handler(
    State(engine): State<Arc<EligibilityEngine>>,
    Json(request): Json<EligibilityCheckRequest>,
) -> Response {
    let EligibilityCheckRequest {
        donor,
        last_donation_date,
        reference_date,
    } = request;

    let reference = reference_date.unwrap_or_else(|| Local::now().date_naive());
    let last_donation = last_donation_date.or(donor.last_donation_date);

    match engine.check_eligibility(&donor, last_donation, reference) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(error) => contract_violation(error),
    }
}

pub(crate) async fn summary_handler(
    State(engine): State<Arc<EligibilityEngine>>,
    Json(request): Json<EligibilitySummaryRequest>,
) -> Response {
    match engine.eligibility_summary(&request.donor) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => contract_violation(error),
    }
}

pub(crate) async fn next_eligible_date_handler(
    State(engine): State<Arc<EligibilityEngine>>,
    Query(query): Query<NextEligibleDateQuery>,
) -> Response {
    let payload = json!({
        "last_donation_date": query.last_donation_date,
        "next_eligible_date": engine.next_donation_date(query.last_donation_date),
    });
    (StatusCode::OK, Json(payload)).into_response()
}

fn contract_violation(error: EligibilityError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
}
