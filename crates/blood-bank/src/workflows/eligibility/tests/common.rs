use axum::response::Response;
use chrono::{Duration, NaiveDate};
use serde_json::Value;
use std::sync::Arc;

use crate::workflows::eligibility::domain::{
    ChronicCondition, DonorId, DonorSnapshot, Lifestyle, MedicalHistory, TransfusionRecord,
    TravelRecord,
};
use crate::workflows::eligibility::{eligibility_router, DeferralPolicy, EligibilityEngine};

pub(super) const RISK_REGION: &str = "risk-region-a";

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn reference_date() -> NaiveDate {
    date(2025, 6, 15)
}

pub(super) fn days_before_reference(days: i64) -> NaiveDate {
    reference_date() - Duration::days(days)
}

pub(super) fn engine() -> EligibilityEngine {
    EligibilityEngine::new(DeferralPolicy::default().with_risk_regions([RISK_REGION]))
}

/// Donor whose `years`-th birthday falls exactly on the reference date.
pub(super) fn donor_turning(years: i32) -> DonorSnapshot {
    let reference = reference_date();
    let birth = date(2025 - years, 6, 15);
    assert_eq!(crate::workflows::eligibility::age_in_years(birth, reference), years);
    DonorSnapshot {
        donor_id: Some(DonorId(format!("donor-{years}"))),
        ..DonorSnapshot::born_on(birth)
    }
}

pub(super) fn adult_donor() -> DonorSnapshot {
    donor_turning(34)
}

pub(super) fn with_history(donor: DonorSnapshot, history: MedicalHistory) -> DonorSnapshot {
    donor.with_medical_history(history)
}

pub(super) fn conditions(names: &[&str]) -> MedicalHistory {
    MedicalHistory {
        chronic_conditions: names.iter().map(|name| ChronicCondition::named(*name)).collect(),
        ..MedicalHistory::default()
    }
}

pub(super) fn medications(names: &[&str]) -> MedicalHistory {
    MedicalHistory {
        current_medications: names.iter().map(|name| name.to_string()).collect(),
        ..MedicalHistory::default()
    }
}

pub(super) fn transfusion_on(raw_date: &str) -> TransfusionRecord {
    TransfusionRecord {
        date: raw_date.to_string(),
        reason: Some("surgery".to_string()),
        location: Some("Regional Hospital".to_string()),
    }
}

pub(super) fn tattooed() -> Lifestyle {
    Lifestyle {
        recent_tattoos: true,
        ..Lifestyle::default()
    }
}

pub(super) fn trip(country: &str, from: NaiveDate, to: NaiveDate) -> TravelRecord {
    TravelRecord {
        country: country.to_string(),
        date_from: from.to_string(),
        date_to: to.to_string(),
    }
}

pub(super) fn router() -> axum::Router {
    eligibility_router(Arc::new(engine()))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
