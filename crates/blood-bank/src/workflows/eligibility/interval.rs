use super::decision::{DeferralLedger, TemporaryDeferral};
use super::policy::{DeferralPolicy, MIN_DONATION_INTERVAL_DAYS};
use chrono::{Days, NaiveDate};

/// Earliest date a donor who last gave on `last_donation` may give again under the
/// standard interval. Saturates at the maximum representable date.
pub fn next_eligible_date(last_donation: NaiveDate) -> NaiveDate {
    last_donation
        .checked_add_days(Days::new(MIN_DONATION_INTERVAL_DAYS.unsigned_abs()))
        .unwrap_or(NaiveDate::MAX)
}

pub(crate) fn evaluate_donation_interval(
    last_donation: Option<NaiveDate>,
    reference: NaiveDate,
    policy: &DeferralPolicy,
    ledger: &mut DeferralLedger,
) {
    let Some(last_donation) = last_donation else {
        return;
    };

    let required = policy.min_donation_interval_days;
    let days_since = reference.signed_duration_since(last_donation).num_days();
    if days_since >= required {
        return;
    }

    let until = add_days(last_donation, required);
    ledger.defer_temporarily_explained(
        TemporaryDeferral {
            reason: "Minimum interval between donations not met".to_string(),
            until,
            notes: Some(format!("last donation on {last_donation}")),
        },
        format!(
            "Must wait {} more days since last donation",
            required - days_since
        ),
    );
}

/// Date arithmetic that yields `None` instead of overflowing.
pub(crate) fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}
