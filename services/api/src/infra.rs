use blood_bank::config::AppConfig;
use blood_bank::workflows::eligibility::{BloodType, EligibilityEngine};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn engine_from_config(config: &AppConfig) -> EligibilityEngine {
    EligibilityEngine::new(config.eligibility.policy())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_blood_type(raw: &str) -> Result<BloodType, String> {
    raw.parse::<BloodType>().map_err(|err| err.to_string())
}
