use crate::workflows::eligibility::domain::parse_history_date;
use crate::workflows::eligibility::{BloodType, DonorId, DonorSnapshot};
use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug)]
pub(crate) enum RosterRow {
    Valid { name: String, snapshot: DonorSnapshot },
    Invalid { line: u64, donor_id: String, reason: String },
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<RosterRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|position| position.line()).unwrap_or_default();
        let row: DonorCsvRow = record.deserialize(Some(&headers))?;
        rows.push(row.into_roster_row(line));
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct DonorCsvRow {
    #[serde(rename = "Donor ID")]
    donor_id: String,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Birth Date", default, deserialize_with = "empty_string_as_none")]
    birth_date: Option<String>,
    #[serde(rename = "Blood Type", default, deserialize_with = "empty_string_as_none")]
    blood_type: Option<String>,
    #[serde(
        rename = "Last Donation",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    last_donation: Option<String>,
}

impl DonorCsvRow {
    fn into_roster_row(self, line: u64) -> RosterRow {
        let invalid = |reason: String| RosterRow::Invalid {
            line,
            donor_id: self.donor_id.clone(),
            reason,
        };

        let Some(raw_birth) = self.birth_date.as_deref() else {
            return invalid("missing birth date".to_string());
        };
        let Some(birth_date) = parse_history_date(raw_birth) else {
            return invalid(format!("unreadable birth date '{raw_birth}'"));
        };

        let last_donation_date = match self.last_donation.as_deref() {
            Some(raw) => match parse_history_date(raw) {
                Some(date) => Some(date),
                None => return invalid(format!("unreadable last donation date '{raw}'")),
            },
            None => None,
        };

        let blood_type = self
            .blood_type
            .as_deref()
            .and_then(|raw| raw.parse::<BloodType>().ok());

        RosterRow::Valid {
            name: self.name.clone(),
            snapshot: DonorSnapshot {
                donor_id: Some(DonorId(self.donor_id.clone())),
                birth_date: Some(birth_date),
                blood_type,
                last_donation_date,
                ..DonorSnapshot::default()
            },
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
