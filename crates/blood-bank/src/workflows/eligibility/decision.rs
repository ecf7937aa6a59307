use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Time-boxed disqualification. `until` is absent for open-ended deferrals that
/// clear only once the triggering condition is no longer reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporaryDeferral {
    pub reason: String,
    pub until: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Unconditional disqualification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermanentDeferral {
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Primary outcome of an evaluation. Contradictory states cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum EligibilityDecision {
    Eligible,
    TemporarilyDeferred {
        until: Option<NaiveDate>,
        reasons: Vec<String>,
    },
    PermanentlyDeferred {
        reasons: Vec<String>,
    },
}

impl EligibilityDecision {
    pub fn status(&self) -> EligibilityStatus {
        match self {
            EligibilityDecision::Eligible => EligibilityStatus::Eligible,
            EligibilityDecision::TemporarilyDeferred { .. } => {
                EligibilityStatus::TemporarilyDeferred
            }
            EligibilityDecision::PermanentlyDeferred { .. } => {
                EligibilityStatus::PermanentlyDeferred
            }
        }
    }

    /// Collapse the collected deferrals. Any permanent deferral wins; otherwise the
    /// donor waits for the latest dated window among the temporary ones.
    pub(crate) fn from_deferrals(
        temporary: &[TemporaryDeferral],
        permanent: &[PermanentDeferral],
    ) -> Self {
        if !permanent.is_empty() {
            return EligibilityDecision::PermanentlyDeferred {
                reasons: permanent.iter().map(|d| d.reason.clone()).collect(),
            };
        }

        if !temporary.is_empty() {
            return EligibilityDecision::TemporarilyDeferred {
                until: temporary.iter().filter_map(|d| d.until).max(),
                reasons: temporary.iter().map(|d| d.reason.clone()).collect(),
            };
        }

        EligibilityDecision::Eligible
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EligibilityStatus {
    Eligible,
    TemporarilyDeferred,
    PermanentlyDeferred,
}

impl EligibilityStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EligibilityStatus::Eligible => "eligible",
            EligibilityStatus::TemporarilyDeferred => "temporarily-deferred",
            EligibilityStatus::PermanentlyDeferred => "permanently-deferred",
        }
    }
}

/// Flat public projection of an evaluation handed back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub is_eligible: bool,
    pub reasons: Vec<String>,
    pub temporary_deferrals: Vec<TemporaryDeferral>,
    pub permanent_deferrals: Vec<PermanentDeferral>,
    pub next_eligible_date: Option<NaiveDate>,
}

impl EligibilityResult {
    pub(crate) fn project(decision: &EligibilityDecision, ledger: DeferralLedger) -> Self {
        let next_eligible_date = match decision {
            EligibilityDecision::TemporarilyDeferred { until, .. } => *until,
            EligibilityDecision::Eligible | EligibilityDecision::PermanentlyDeferred { .. } => None,
        };

        Self {
            is_eligible: matches!(decision, EligibilityDecision::Eligible),
            reasons: ledger.reasons,
            temporary_deferrals: ledger.temporary,
            permanent_deferrals: ledger.permanent,
            next_eligible_date,
        }
    }

    /// Rebuild the tagged outcome this result was projected from.
    pub fn decision(&self) -> EligibilityDecision {
        EligibilityDecision::from_deferrals(&self.temporary_deferrals, &self.permanent_deferrals)
    }

    pub fn status(&self) -> EligibilityStatus {
        self.decision().status()
    }
}

/// Accumulator the rules write into, in evaluation order.
#[derive(Debug, Default)]
pub(crate) struct DeferralLedger {
    reasons: Vec<String>,
    temporary: Vec<TemporaryDeferral>,
    permanent: Vec<PermanentDeferral>,
}

impl DeferralLedger {
    pub(crate) fn note(&mut self, explanation: impl Into<String>) {
        self.reasons.push(explanation.into());
    }

    /// Record a temporary deferral; its reason doubles as the explanation.
    pub(crate) fn defer_temporarily(&mut self, deferral: TemporaryDeferral) {
        self.reasons.push(deferral.reason.clone());
        self.temporary.push(deferral);
    }

    /// Record a temporary deferral with a separate user-facing explanation.
    pub(crate) fn defer_temporarily_explained(
        &mut self,
        deferral: TemporaryDeferral,
        explanation: impl Into<String>,
    ) {
        self.note(explanation);
        self.temporary.push(deferral);
    }

    pub(crate) fn defer_permanently(&mut self, deferral: PermanentDeferral) {
        self.reasons.push(deferral.reason.clone());
        self.permanent.push(deferral);
    }

    pub(crate) fn temporary(&self) -> &[TemporaryDeferral] {
        &self.temporary
    }

    pub(crate) fn permanent(&self) -> &[PermanentDeferral] {
        &self.permanent
    }

    pub(crate) fn into_result(self) -> EligibilityResult {
        let decision = EligibilityDecision::from_deferrals(&self.temporary, &self.permanent);
        EligibilityResult::project(&decision, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn temporary(reason: &str, until: Option<NaiveDate>) -> TemporaryDeferral {
        TemporaryDeferral {
            reason: reason.to_string(),
            until,
            notes: None,
        }
    }

    #[test]
    fn empty_ledger_projects_to_eligible() {
        let result = DeferralLedger::default().into_result();
        assert!(result.is_eligible);
        assert!(result.reasons.is_empty());
        assert!(result.next_eligible_date.is_none());
        assert_eq!(result.status(), EligibilityStatus::Eligible);
    }

    #[test]
    fn temporary_deferrals_wait_for_latest_window() {
        let mut ledger = DeferralLedger::default();
        ledger.defer_temporarily(temporary("first", Some(date(2025, 3, 1))));
        ledger.defer_temporarily(temporary("open", None));
        ledger.defer_temporarily(temporary("second", Some(date(2025, 9, 1))));

        let result = ledger.into_result();

        assert!(!result.is_eligible);
        assert_eq!(result.next_eligible_date, Some(date(2025, 9, 1)));
        assert_eq!(result.reasons, vec!["first", "open", "second"]);
        match result.decision() {
            EligibilityDecision::TemporarilyDeferred { until, reasons } => {
                assert_eq!(until, Some(date(2025, 9, 1)));
                assert_eq!(reasons.len(), 3);
            }
            other => panic!("expected temporary deferral, got {other:?}"),
        }
    }

    #[test]
    fn permanent_deferral_suppresses_next_date() {
        let mut ledger = DeferralLedger::default();
        ledger.defer_temporarily(temporary("window", Some(date(2025, 3, 1))));
        ledger.defer_permanently(PermanentDeferral {
            reason: "Age limit exceeded".to_string(),
            notes: None,
        });

        let result = ledger.into_result();

        assert!(!result.is_eligible);
        assert!(result.next_eligible_date.is_none());
        assert_eq!(result.status(), EligibilityStatus::PermanentlyDeferred);
    }

    #[test]
    fn status_labels_are_kebab_case() {
        assert_eq!(EligibilityStatus::TemporarilyDeferred.label(), "temporarily-deferred");
        let json = serde_json::to_string(&EligibilityStatus::PermanentlyDeferred).expect("json");
        assert_eq!(json, "\"permanently-deferred\"");
    }
}
