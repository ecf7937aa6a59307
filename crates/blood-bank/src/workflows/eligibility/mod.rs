//! Donor eligibility determination.
//!
//! The engine is a pure function of a donor snapshot and a reference date: every rule
//! runs on every call, results are collected in rule order, and nothing is retained
//! between calls. Callers pin the reference date; only the outer adapters read the clock.

pub mod age;
mod decision;
pub mod domain;
mod interval;
pub mod policy;
pub mod router;
mod rules;
mod summary;

#[cfg(test)]
mod tests;

pub use age::{age_in_years, birthday_at_age};
pub use decision::{
    EligibilityDecision, EligibilityResult, EligibilityStatus, PermanentDeferral,
    TemporaryDeferral,
};
pub use domain::{
    AlcoholConsumption, BloodType, ChronicCondition, DonorId, DonorSnapshot, HistoryDisclosure,
    Lifestyle, MedicalHistory, PregnancyHistory, TransfusionRecord, TravelRecord,
    UnknownBloodType,
};
pub use interval::next_eligible_date;
pub use policy::{ConditionKeyword, DeferralPolicy, InvalidAgeBounds};
pub use router::eligibility_router;
pub use summary::EligibilitySummary;

use chrono::NaiveDate;
use decision::DeferralLedger;
use tracing::debug;

/// Contract violations by the caller. Ineligibility is never an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EligibilityError {
    #[error("donor snapshot is missing a birth date")]
    MissingBirthDate,
}

/// Stateless evaluator applying a deferral policy to donor snapshots.
#[derive(Debug, Clone, Default)]
pub struct EligibilityEngine {
    policy: DeferralPolicy,
}

impl EligibilityEngine {
    pub fn new(policy: DeferralPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &DeferralPolicy {
        &self.policy
    }

    /// Evaluate `donor` on `reference`, using `last_donation_date` for the interval
    /// rule in place of the date carried on the snapshot.
    pub fn check_eligibility(
        &self,
        donor: &DonorSnapshot,
        last_donation_date: Option<NaiveDate>,
        reference: NaiveDate,
    ) -> Result<EligibilityResult, EligibilityError> {
        let birth_date = donor.birth_date.ok_or(EligibilityError::MissingBirthDate)?;
        let mut ledger = DeferralLedger::default();

        age::evaluate_age(birth_date, reference, &self.policy, &mut ledger);
        interval::evaluate_donation_interval(
            last_donation_date,
            reference,
            &self.policy,
            &mut ledger,
        );
        rules::evaluate_medical_history(
            &donor.medical_history,
            reference,
            &self.policy,
            &mut ledger,
        );

        debug!(
            donor = donor.donor_id.as_ref().map(|id| id.0.as_str()).unwrap_or("anonymous"),
            %reference,
            temporary = ledger.temporary().len(),
            permanent = ledger.permanent().len(),
            "donor eligibility evaluated"
        );

        Ok(ledger.into_result())
    }

    /// Evaluate `donor` on `reference` using the snapshot's own last donation date.
    pub fn evaluate(
        &self,
        donor: &DonorSnapshot,
        reference: NaiveDate,
    ) -> Result<EligibilityResult, EligibilityError> {
        self.check_eligibility(donor, donor.last_donation_date, reference)
    }

    /// Earliest date the donation-interval rule alone allows another donation.
    pub fn next_donation_date(&self, last_donation: NaiveDate) -> Option<NaiveDate> {
        interval::add_days(last_donation, self.policy.min_donation_interval_days)
    }
}
