use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier wrapper for donors known to the coordination service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DonorId(pub String);

/// ABO/Rh blood group. Carried for matching, never consulted by eligibility rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    pub const fn label(self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized blood type '{0}'")]
pub struct UnknownBloodType(pub String);

impl FromStr for BloodType {
    type Err = UnknownBloodType;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_uppercase().replace(' ', "");
        let blood_type = match normalized.as_str() {
            "A+" | "APOS" => BloodType::APositive,
            "A-" | "ANEG" => BloodType::ANegative,
            "B+" | "BPOS" => BloodType::BPositive,
            "B-" | "BNEG" => BloodType::BNegative,
            "AB+" | "ABPOS" => BloodType::AbPositive,
            "AB-" | "ABNEG" => BloodType::AbNegative,
            "O+" | "OPOS" => BloodType::OPositive,
            "O-" | "ONEG" => BloodType::ONegative,
            _ => return Err(UnknownBloodType(raw.to_string())),
        };
        Ok(blood_type)
    }
}

/// Donor data assembled by the caller for a single eligibility evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DonorSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donor_id: Option<DonorId>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<BloodType>,
    #[serde(default)]
    pub last_donation_date: Option<NaiveDate>,
    #[serde(default)]
    pub medical_history: HistoryDisclosure,
}

impl DonorSnapshot {
    pub fn born_on(birth_date: NaiveDate) -> Self {
        Self {
            birth_date: Some(birth_date),
            ..Self::default()
        }
    }

    pub fn with_medical_history(mut self, history: MedicalHistory) -> Self {
        self.medical_history = HistoryDisclosure::Supplied(history);
        self
    }

    pub fn with_last_donation(mut self, date: NaiveDate) -> Self {
        self.last_donation_date = Some(date);
        self
    }
}

/// Whether the donor disclosed a medical history at all.
///
/// Serialized as the history object itself, or `null` when nothing was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<MedicalHistory>", into = "Option<MedicalHistory>")]
pub enum HistoryDisclosure {
    #[default]
    NotSupplied,
    Supplied(MedicalHistory),
}

impl HistoryDisclosure {
    pub fn as_supplied(&self) -> Option<&MedicalHistory> {
        match self {
            HistoryDisclosure::Supplied(history) => Some(history),
            HistoryDisclosure::NotSupplied => None,
        }
    }
}

impl From<Option<MedicalHistory>> for HistoryDisclosure {
    fn from(value: Option<MedicalHistory>) -> Self {
        match value {
            Some(history) => Self::Supplied(history),
            None => Self::NotSupplied,
        }
    }
}

impl From<HistoryDisclosure> for Option<MedicalHistory> {
    fn from(value: HistoryDisclosure) -> Self {
        match value {
            HistoryDisclosure::Supplied(history) => Some(history),
            HistoryDisclosure::NotSupplied => None,
        }
    }
}

/// Self-reported medical history. Date fields stay raw so a malformed entry
/// can be skipped by the rule that reads it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MedicalHistory {
    #[serde(default)]
    pub chronic_conditions: Vec<ChronicCondition>,
    #[serde(default)]
    pub current_medications: Vec<String>,
    #[serde(default)]
    pub blood_transfusions: Vec<TransfusionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pregnancies: Option<PregnancyHistory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifestyle: Option<Lifestyle>,
}

/// Chronic condition as free text, optionally dated. Accepts a bare string in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ChronicConditionEntry")]
pub struct ChronicCondition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosed_on: Option<String>,
}

impl ChronicCondition {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diagnosed_on: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChronicConditionEntry {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        diagnosed_on: Option<String>,
    },
}

impl From<ChronicConditionEntry> for ChronicCondition {
    fn from(value: ChronicConditionEntry) -> Self {
        match value {
            ChronicConditionEntry::Name(name) => Self::named(name),
            ChronicConditionEntry::Detailed { name, diagnosed_on } => Self { name, diagnosed_on },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransfusionRecord {
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PregnancyHistory {
    pub has_been_pregnant: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_pregnancies: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_pregnancy_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlcoholConsumption {
    #[default]
    None,
    Occasional,
    Moderate,
    Heavy,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lifestyle {
    #[serde(default)]
    pub smoker: bool,
    #[serde(default)]
    pub alcohol_consumption: AlcoholConsumption,
    #[serde(default)]
    pub recent_tattoos: bool,
    #[serde(default)]
    pub recent_piercings: bool,
    #[serde(default)]
    pub recent_travel: Vec<TravelRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelRecord {
    pub country: String,
    #[serde(default)]
    pub date_from: String,
    #[serde(default)]
    pub date_to: String,
}

/// Parse a history date given as `YYYY-MM-DD` or an RFC 3339 timestamp.
pub(crate) fn parse_history_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.naive_utc().date())
}
