use crate::infra::{engine_from_config, parse_blood_type, parse_date};
use blood_bank::config::AppConfig;
use blood_bank::error::AppError;
use blood_bank::workflows::eligibility::{
    BloodType, ChronicCondition, DeferralPolicy, DonorId, DonorSnapshot, EligibilityEngine,
    EligibilityResult, EligibilitySummary, Lifestyle, MedicalHistory, PregnancyHistory,
    TransfusionRecord, TravelRecord,
};
use blood_bank::workflows::roster::{DonorRoster, OutreachPlan};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;

const DEMO_RISK_REGION: &str = "demo-risk-region";

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Donor snapshot as JSON
    #[arg(long)]
    pub(crate) donor: PathBuf,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the raw result as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RosterArgs {
    /// Roster CSV with Donor ID, Name, Birth Date, Blood Type, Last Donation columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Only include donors of this blood type (e.g. O-)
    #[arg(long, value_parser = parse_blood_type)]
    pub(crate) blood_type: Option<BloodType>,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date for the scenarios (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_eligibility_check(args: CheckArgs) -> Result<(), AppError> {
    let CheckArgs { donor, today, json } = args;

    let config = AppConfig::load()?;
    let engine = engine_from_config(&config);
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let raw = std::fs::read_to_string(donor)?;
    let snapshot: DonorSnapshot = serde_json::from_str(&raw)?;
    let result = engine.evaluate(&snapshot, today)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render_result(&snapshot, &result, today);
    }

    Ok(())
}

pub(crate) fn run_roster_outreach(args: RosterArgs) -> Result<(), AppError> {
    let RosterArgs {
        csv,
        blood_type,
        today,
    } = args;

    let config = AppConfig::load()?;
    let engine = engine_from_config(&config);
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let roster = DonorRoster::from_path(csv)?;
    let plan = roster.outreach(&engine, today, blood_type);
    render_outreach(&roster, &plan);

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let engine =
        EligibilityEngine::new(DeferralPolicy::default().with_risk_regions([DEMO_RISK_REGION]));

    println!("Donor eligibility demo (evaluated {today})");
    println!(
        "Policy: interval {} days | transfusion {} days | postpartum {} days | travel {} days",
        engine.policy().min_donation_interval_days,
        engine.policy().transfusion_deferral_days,
        engine.policy().pregnancy_deferral_days,
        engine.policy().travel_risk_deferral_days
    );

    for (label, donor) in demo_donors(today) {
        println!("\n== {label}");
        match engine.evaluate(&donor, today) {
            Ok(result) => render_result(&donor, &result, today),
            Err(err) => println!("  Evaluation refused: {err}"),
        }
    }

    Ok(())
}

fn demo_donors(today: NaiveDate) -> Vec<(&'static str, DonorSnapshot)> {
    let years_ago = |years: i64| today - Duration::days(years * 365 + years / 4);
    let days_ago = |days: i64| today - Duration::days(days);

    let regular = DonorSnapshot {
        donor_id: Some(DonorId("demo-001".to_string())),
        blood_type: Some(BloodType::OPositive),
        ..DonorSnapshot::born_on(years_ago(32)).with_last_donation(days_ago(90))
    };

    let recent_donor = DonorSnapshot {
        donor_id: Some(DonorId("demo-002".to_string())),
        ..DonorSnapshot::born_on(years_ago(45)).with_last_donation(days_ago(30))
    };

    let underage = DonorSnapshot {
        donor_id: Some(DonorId("demo-003".to_string())),
        ..DonorSnapshot::born_on(years_ago(15))
    };

    let medicated = DonorSnapshot {
        donor_id: Some(DonorId("demo-004".to_string())),
        ..DonorSnapshot::born_on(years_ago(58)).with_medical_history(MedicalHistory {
            current_medications: vec!["Warfarin".to_string(), "Aspirin".to_string()],
            blood_transfusions: vec![TransfusionRecord {
                date: days_ago(120).to_string(),
                reason: Some("hip replacement".to_string()),
                location: None,
            }],
            ..MedicalHistory::default()
        })
    };

    let postpartum_traveller = DonorSnapshot {
        donor_id: Some(DonorId("demo-005".to_string())),
        ..DonorSnapshot::born_on(years_ago(29)).with_medical_history(MedicalHistory {
            pregnancies: Some(PregnancyHistory {
                has_been_pregnant: true,
                number_of_pregnancies: Some(1),
                last_pregnancy_date: Some(days_ago(14).to_string()),
            }),
            lifestyle: Some(Lifestyle {
                recent_piercings: true,
                recent_travel: vec![TravelRecord {
                    country: DEMO_RISK_REGION.to_string(),
                    date_from: days_ago(230).to_string(),
                    date_to: days_ago(210).to_string(),
                }],
                ..Lifestyle::default()
            }),
            ..MedicalHistory::default()
        })
    };

    let disqualified = DonorSnapshot {
        donor_id: Some(DonorId("demo-006".to_string())),
        ..DonorSnapshot::born_on(years_ago(40)).with_medical_history(MedicalHistory {
            chronic_conditions: vec![ChronicCondition::named("Hepatitis-B (chronic)")],
            blood_transfusions: vec![TransfusionRecord {
                date: "around last winter".to_string(),
                reason: None,
                location: None,
            }],
            ..MedicalHistory::default()
        })
    };

    vec![
        ("Regular donor", regular),
        ("Donated last month", recent_donor),
        ("Under minimum age", underage),
        ("Anticoagulant and recent transfusion", medicated),
        ("Postpartum with recent travel", postpartum_traveller),
        ("Permanent disqualification", disqualified),
        ("Missing birth date", DonorSnapshot::default()),
    ]
}

fn render_result(donor: &DonorSnapshot, result: &EligibilityResult, today: NaiveDate) {
    let donor_label = donor
        .donor_id
        .as_ref()
        .map(|id| id.0.as_str())
        .unwrap_or("anonymous donor");
    let summary = EligibilitySummary::from_result(result);

    println!("- {donor_label} on {today}: {}", summary.status.label());
    println!("  {}", summary.message);

    for reason in &result.reasons {
        println!("  * {reason}");
    }

    for deferral in &result.temporary_deferrals {
        let until = deferral
            .until
            .map(|date| date.to_string())
            .unwrap_or_else(|| "open-ended".to_string());
        println!("  temporary: {} (until {until})", deferral.reason);
    }

    for deferral in &result.permanent_deferrals {
        match &deferral.notes {
            Some(notes) => println!("  permanent: {} [{notes}]", deferral.reason),
            None => println!("  permanent: {}", deferral.reason),
        }
    }
}

fn render_outreach(roster: &DonorRoster, plan: &OutreachPlan) {
    let filter = plan
        .blood_type
        .map(|blood_type| blood_type.label().to_string())
        .unwrap_or_else(|| "any blood type".to_string());
    println!(
        "Urgent outreach for {filter} (evaluated {})",
        plan.reference_date
    );

    if plan.eligible.is_empty() {
        println!("\nEligible donors: none");
    } else {
        println!("\nEligible donors");
        for candidate in &plan.eligible {
            let blood_type = candidate
                .blood_type
                .map(|blood_type| blood_type.label())
                .unwrap_or("unknown");
            println!("- {} ({}) {}", candidate.name, candidate.donor_id.0, blood_type);
        }
    }

    if !plan.deferred.is_empty() {
        println!("\nDeferred donors");
        for donor in &plan.deferred {
            let next = donor
                .next_eligible_date
                .map(|date| format!("eligible again {date}"))
                .unwrap_or_else(|| "no return date".to_string());
            println!("- {} ({}): {next}", donor.name, donor.donor_id.0);
        }
    }

    if !roster.rejected.is_empty() {
        println!("\nRejected roster rows");
        for row in &roster.rejected {
            println!("- line {} ({}): {}", row.line, row.donor_id, row.reason);
        }
    }
}
