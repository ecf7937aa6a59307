use super::decision::{DeferralLedger, PermanentDeferral, TemporaryDeferral};
use super::domain::{
    parse_history_date, ChronicCondition, HistoryDisclosure, Lifestyle, PregnancyHistory,
    TransfusionRecord,
};
use super::interval::add_days;
use super::policy::DeferralPolicy;
use chrono::NaiveDate;
use tracing::debug;

/// Run every medical-history check in a fixed order. Each check is independent and
/// skips entries whose dates cannot be read.
pub(crate) fn evaluate_medical_history(
    disclosure: &HistoryDisclosure,
    reference: NaiveDate,
    policy: &DeferralPolicy,
    ledger: &mut DeferralLedger,
) {
    let Some(history) = disclosure.as_supplied() else {
        return;
    };

    chronic_conditions(&history.chronic_conditions, policy, ledger);
    current_medications(&history.current_medications, policy, ledger);
    transfusions(&history.blood_transfusions, reference, policy, ledger);
    if let Some(pregnancies) = &history.pregnancies {
        pregnancy(pregnancies, reference, policy, ledger);
    }
    if let Some(lifestyle) = &history.lifestyle {
        body_modification(lifestyle, ledger);
        travel(lifestyle, reference, policy, ledger);
    }
}

fn chronic_conditions(
    conditions: &[ChronicCondition],
    policy: &DeferralPolicy,
    ledger: &mut DeferralLedger,
) {
    for condition in conditions {
        let Some(matched) = policy.permanent_condition(&condition.name) else {
            continue;
        };

        let diagnosed = condition
            .diagnosed_on
            .as_deref()
            .and_then(parse_history_date)
            .map(|date| format!(", diagnosed {date}"))
            .unwrap_or_default();

        ledger.defer_permanently(PermanentDeferral {
            reason: format!("Permanent deferral due to history of {}", matched.label),
            notes: Some(format!("reported condition '{}'{diagnosed}", condition.name)),
        });
    }
}

fn current_medications(
    medications: &[String],
    policy: &DeferralPolicy,
    ledger: &mut DeferralLedger,
) {
    for medication in medications {
        if !policy.is_deferral_medication(medication) {
            continue;
        }

        ledger.defer_temporarily(TemporaryDeferral {
            reason: format!("Current medication: {}", medication.trim()),
            until: None,
            notes: Some("deferred while the medication is being taken".to_string()),
        });
    }
}

fn transfusions(
    records: &[TransfusionRecord],
    reference: NaiveDate,
    policy: &DeferralPolicy,
    ledger: &mut DeferralLedger,
) {
    for record in records {
        let Some(received) = parse_history_date(&record.date) else {
            debug!(date = %record.date, "skipping transfusion with unreadable date");
            continue;
        };
        let Some(until) = active_window(received, policy.transfusion_deferral_days, reference)
        else {
            continue;
        };

        ledger.defer_temporarily(TemporaryDeferral {
            reason: "Blood transfusion within the last year".to_string(),
            until: Some(until),
            notes: Some(match &record.reason {
                Some(why) => format!("transfusion on {received} ({why})"),
                None => format!("transfusion on {received}"),
            }),
        });
    }
}

fn pregnancy(
    history: &PregnancyHistory,
    reference: NaiveDate,
    policy: &DeferralPolicy,
    ledger: &mut DeferralLedger,
) {
    if !history.has_been_pregnant {
        return;
    }

    let Some(raw) = history.last_pregnancy_date.as_deref() else {
        return;
    };
    let Some(ended) = parse_history_date(raw) else {
        debug!(date = %raw, "skipping pregnancy with unreadable date");
        return;
    };

    if let Some(until) = active_window(ended, policy.pregnancy_deferral_days, reference) {
        ledger.defer_temporarily(TemporaryDeferral {
            reason: "Recent pregnancy".to_string(),
            until: Some(until),
            notes: history
                .number_of_pregnancies
                .map(|count| format!("{count} pregnancies reported")),
        });
    }
}

fn body_modification(lifestyle: &Lifestyle, ledger: &mut DeferralLedger) {
    if lifestyle.recent_tattoos || lifestyle.recent_piercings {
        ledger.defer_temporarily(TemporaryDeferral {
            reason: "Recent tattoo or piercing".to_string(),
            until: None,
            notes: None,
        });
    }
}

fn travel(
    lifestyle: &Lifestyle,
    reference: NaiveDate,
    policy: &DeferralPolicy,
    ledger: &mut DeferralLedger,
) {
    for trip in &lifestyle.recent_travel {
        if !policy.is_risk_region(&trip.country) {
            continue;
        }
        let Some(returned) = parse_history_date(&trip.date_to) else {
            debug!(
                country = %trip.country,
                date = %trip.date_to,
                "skipping trip with unreadable return date"
            );
            continue;
        };
        let Some(until) = active_window(returned, policy.travel_risk_deferral_days, reference)
        else {
            continue;
        };

        let region = trip.country.trim();
        ledger.defer_temporarily(TemporaryDeferral {
            reason: format!("Recent travel to {region}"),
            until: Some(until),
            notes: parse_history_date(&trip.date_from)
                .map(|left| format!("in {region} from {left} to {returned}")),
        });
    }
}

/// End of a deferral window starting at `start`, if it is still open on `reference`.
fn active_window(start: NaiveDate, days: i64, reference: NaiveDate) -> Option<NaiveDate> {
    add_days(start, days).filter(|until| *until > reference)
}
