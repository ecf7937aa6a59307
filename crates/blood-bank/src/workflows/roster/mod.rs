//! Donor roster import for urgent-request outreach.
//!
//! A roster CSV carries identity and donation dates only, so outreach screening
//! covers the age and interval rules; medical history is confirmed at booking.

mod parser;

use crate::workflows::eligibility::{BloodType, DonorId, DonorSnapshot, EligibilityEngine};
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use parser::RosterRow;

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read donor roster: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid donor roster CSV: {}", err),
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub name: String,
    pub snapshot: DonorSnapshot,
}

/// Row that could not be turned into a donor snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    pub line: u64,
    pub donor_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct DonorRoster {
    pub entries: Vec<RosterEntry>,
    pub rejected: Vec<RejectedRow>,
}

impl DonorRoster {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RosterImportError> {
        let mut roster = DonorRoster::default();

        for row in parser::parse_rows(reader)? {
            match row {
                RosterRow::Valid { name, snapshot } => {
                    roster.entries.push(RosterEntry { name, snapshot })
                }
                RosterRow::Invalid {
                    line,
                    donor_id,
                    reason,
                } => {
                    warn!(line, %donor_id, %reason, "rejecting roster row");
                    roster.rejected.push(RejectedRow {
                        line,
                        donor_id,
                        reason,
                    });
                }
            }
        }

        Ok(roster)
    }

    /// Split the roster into donors who can be contacted today and those who
    /// cannot, optionally restricted to one blood type.
    pub fn outreach(
        &self,
        engine: &EligibilityEngine,
        reference: NaiveDate,
        blood_type: Option<BloodType>,
    ) -> OutreachPlan {
        let mut plan = OutreachPlan {
            reference_date: reference,
            blood_type,
            eligible: Vec::new(),
            deferred: Vec::new(),
        };

        for entry in &self.entries {
            if blood_type.is_some() && entry.snapshot.blood_type != blood_type {
                continue;
            }
            let Some(donor_id) = entry.snapshot.donor_id.clone() else {
                continue;
            };

            match engine.evaluate(&entry.snapshot, reference) {
                Ok(result) if result.is_eligible => plan.eligible.push(OutreachCandidate {
                    donor_id,
                    name: entry.name.clone(),
                    blood_type: entry.snapshot.blood_type,
                }),
                Ok(result) => plan.deferred.push(DeferredDonor {
                    donor_id,
                    name: entry.name.clone(),
                    next_eligible_date: result.next_eligible_date,
                    reasons: result.reasons,
                }),
                Err(error) => debug!(donor = %donor_id.0, %error, "roster entry skipped"),
            }
        }

        plan
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutreachCandidate {
    pub donor_id: DonorId,
    pub name: String,
    pub blood_type: Option<BloodType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeferredDonor {
    pub donor_id: DonorId,
    pub name: String,
    pub next_eligible_date: Option<NaiveDate>,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutreachPlan {
    pub reference_date: NaiveDate,
    pub blood_type: Option<BloodType>,
    pub eligible: Vec<OutreachCandidate>,
    pub deferred: Vec<DeferredDonor>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const ROSTER: &str = "Donor ID,Name,Birth Date,Blood Type,Last Donation\n\
D-1,Avery Stone,1988-02-11,O-,2025-01-10\n\
D-2,Jordan Reyes,1992-07-30,O-,2025-05-20\n\
D-3,Sam Okafor,2011-03-03,A+,\n\
D-4,Riley Chen,,B+,\n\
D-5,Morgan Blake,1979-11-05,AB+,yesterday\n\
D-6,Casey Diaz,1990-09-09,unknown,\n";

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
    }

    #[test]
    fn import_separates_valid_and_rejected_rows() {
        let roster = DonorRoster::from_reader(Cursor::new(ROSTER)).expect("imports");

        assert_eq!(roster.entries.len(), 4);
        assert_eq!(roster.rejected.len(), 2);
        assert_eq!(roster.rejected[0].donor_id, "D-4");
        assert!(roster.rejected[0].reason.contains("birth date"));
        assert_eq!(roster.rejected[1].donor_id, "D-5");
        assert_eq!(roster.rejected[1].line, 6);
        assert_eq!(roster.entries[3].snapshot.blood_type, None);
    }

    #[test]
    fn outreach_filters_by_blood_type_and_eligibility() {
        let roster = DonorRoster::from_reader(Cursor::new(ROSTER)).expect("imports");
        let engine = EligibilityEngine::default();

        let plan = roster.outreach(&engine, reference(), Some(BloodType::ONegative));

        assert_eq!(plan.eligible.len(), 1);
        assert_eq!(plan.eligible[0].donor_id, DonorId("D-1".to_string()));
        assert_eq!(plan.deferred.len(), 1);
        assert_eq!(
            plan.deferred[0].next_eligible_date,
            NaiveDate::from_ymd_opt(2025, 7, 15)
        );
    }

    #[test]
    fn outreach_without_filter_includes_underage_deferrals() {
        let roster = DonorRoster::from_reader(Cursor::new(ROSTER)).expect("imports");

        let plan = roster.outreach(&EligibilityEngine::default(), reference(), None);

        assert_eq!(plan.eligible.len(), 2);
        let underage = plan
            .deferred
            .iter()
            .find(|donor| donor.donor_id.0 == "D-3")
            .expect("underage donor deferred");
        assert_eq!(
            underage.next_eligible_date,
            NaiveDate::from_ymd_opt(2027, 3, 3)
        );
    }

    #[test]
    fn malformed_csv_is_an_import_error() {
        let result = DonorRoster::from_reader(Cursor::new("Name\nonly-a-name\n"));
        assert!(matches!(result, Err(RosterImportError::Csv(_))));
    }
}
