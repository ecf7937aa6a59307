use super::decision::{EligibilityDecision, EligibilityResult, EligibilityStatus};
use super::domain::DonorSnapshot;
use super::{EligibilityEngine, EligibilityError};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Single user-facing status line for "can I donate" displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilitySummary {
    pub status: EligibilityStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_eligible_date: Option<NaiveDate>,
}

impl EligibilitySummary {
    pub fn from_result(result: &EligibilityResult) -> Self {
        let decision = result.decision();
        let message = match &decision {
            EligibilityDecision::Eligible => "You are eligible to donate blood.".to_string(),
            EligibilityDecision::TemporarilyDeferred {
                until: Some(until),
                reasons,
            } => format!(
                "You are temporarily deferred until {}: {}.",
                until.format("%B %-d, %Y"),
                reasons.join("; ")
            ),
            EligibilityDecision::TemporarilyDeferred {
                until: None,
                reasons,
            } => format!("You are temporarily deferred: {}.", reasons.join("; ")),
            EligibilityDecision::PermanentlyDeferred { reasons } => format!(
                "You are permanently deferred from donating: {}.",
                reasons.join("; ")
            ),
        };

        Self {
            status: decision.status(),
            message,
            next_eligible_date: result.next_eligible_date,
        }
    }
}

impl EligibilityEngine {
    /// Summarize `donor` as of today. The clock is read once, here.
    pub fn eligibility_summary(
        &self,
        donor: &DonorSnapshot,
    ) -> Result<EligibilitySummary, EligibilityError> {
        let today = Local::now().date_naive();
        self.eligibility_summary_on(donor, today)
    }

    pub fn eligibility_summary_on(
        &self,
        donor: &DonorSnapshot,
        reference: NaiveDate,
    ) -> Result<EligibilitySummary, EligibilityError> {
        let result = self.evaluate(donor, reference)?;
        Ok(EligibilitySummary::from_result(&result))
    }
}
