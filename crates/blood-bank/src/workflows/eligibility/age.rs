use super::decision::{DeferralLedger, PermanentDeferral, TemporaryDeferral};
use super::policy::DeferralPolicy;
use chrono::{Datelike, NaiveDate};

/// Whole years elapsed between `birth_date` and `reference`. A birthday falling on
/// `reference` counts as reached.
pub fn age_in_years(birth_date: NaiveDate, reference: NaiveDate) -> i32 {
    let years = reference.year() - birth_date.year();
    if (reference.month(), reference.day()) < (birth_date.month(), birth_date.day()) {
        years - 1
    } else {
        years
    }
}

/// Date on which someone born on `birth_date` turns `years` old. February 29
/// birthdays fall on March 1 in common years, matching `age_in_years`.
pub fn birthday_at_age(birth_date: NaiveDate, years: i32) -> Option<NaiveDate> {
    let year = birth_date.year().checked_add(years)?;
    NaiveDate::from_ymd_opt(year, birth_date.month(), birth_date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
}

pub(crate) fn evaluate_age(
    birth_date: NaiveDate,
    reference: NaiveDate,
    policy: &DeferralPolicy,
    ledger: &mut DeferralLedger,
) {
    let age = age_in_years(birth_date, reference);

    if age < policy.min_age_years {
        let until = birthday_at_age(birth_date, policy.min_age_years);
        ledger.defer_temporarily_explained(
            TemporaryDeferral {
                reason: "Below minimum donor age".to_string(),
                until,
                notes: Some(format!("donor is {age}")),
            },
            format!(
                "Must be at least {} years old to donate (currently {age})",
                policy.min_age_years
            ),
        );
    } else if age > policy.max_age_years {
        ledger.defer_permanently(PermanentDeferral {
            reason: "Age limit exceeded".to_string(),
            notes: Some(format!(
                "donor is {age}, maximum is {}",
                policy.max_age_years
            )),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn birthday_not_yet_reached_subtracts_a_year() {
        let birth = date(2000, 6, 15);
        assert_eq!(age_in_years(birth, date(2024, 6, 14)), 23);
        assert_eq!(age_in_years(birth, date(2024, 6, 15)), 24);
        assert_eq!(age_in_years(birth, date(2024, 12, 31)), 24);
        assert_eq!(age_in_years(birth, date(2025, 1, 1)), 24);
    }

    #[test]
    fn leap_day_birthdays_roll_to_march_first() {
        let birth = date(2008, 2, 29);
        assert_eq!(age_in_years(birth, date(2025, 2, 28)), 16);
        assert_eq!(age_in_years(birth, date(2025, 3, 1)), 17);
        assert_eq!(birthday_at_age(birth, 17), Some(date(2025, 3, 1)));
        assert_eq!(birthday_at_age(birth, 16), Some(date(2024, 2, 29)));
    }

    #[test]
    fn future_birth_date_yields_negative_age() {
        assert_eq!(age_in_years(date(2030, 1, 1), date(2025, 1, 1)), -5);
    }

    #[test]
    fn underage_donor_waits_for_minimum_birthday() {
        let policy = DeferralPolicy::default();
        let mut ledger = DeferralLedger::default();
        let birth = date(2010, 5, 20);

        evaluate_age(birth, date(2025, 5, 19), &policy, &mut ledger);
        let result = ledger.into_result();

        assert_eq!(result.next_eligible_date, Some(date(2026, 5, 20)));
        assert!(result.reasons[0].contains("at least 16"));
        assert_eq!(result.temporary_deferrals.len(), 1);
    }

    #[test]
    fn donors_within_range_record_nothing() {
        let policy = DeferralPolicy::default();
        let mut ledger = DeferralLedger::default();

        evaluate_age(date(1925, 1, 1), date(2025, 1, 1), &policy, &mut ledger);

        assert!(ledger.into_result().is_eligible);
    }
}
