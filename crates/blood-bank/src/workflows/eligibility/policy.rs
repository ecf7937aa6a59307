use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const MIN_AGE_YEARS: i32 = 16;
pub const MAX_AGE_YEARS: i32 = 100;
pub const MIN_DONATION_INTERVAL_DAYS: i64 = 56;
pub const TRANSFUSION_DEFERRAL_DAYS: i64 = 365;
/// Postpartum window, six weeks after delivery.
pub const PREGNANCY_DEFERRAL_DAYS: i64 = 42;
/// Counted from the last day spent in a risk region.
pub const TRAVEL_RISK_DEFERRAL_DAYS: i64 = 365;

/// Condition-name substrings (matched case-insensitively) that disqualify permanently,
/// paired with the label echoed into the deferral reason.
const PERMANENT_CONDITION_KEYWORDS: &[(&str, &str)] = &[
    ("hiv", "HIV"),
    ("hepatitis-b", "Hepatitis B"),
    ("hepatitis b", "Hepatitis B"),
    ("hepatitis-c", "Hepatitis C"),
    ("hepatitis c", "Hepatitis C"),
    ("htlv", "HTLV"),
    ("creutzfeldt", "Creutzfeldt-Jakob disease"),
    ("babesiosis", "Babesiosis"),
    ("chagas", "Chagas disease"),
    ("leishmaniasis", "Leishmaniasis"),
];

/// Medications whose presence defers the donor until they are no longer taken.
const DEFERRAL_MEDICATIONS: &[&str] = &[
    "warfarin",
    "coumadin",
    "jantoven",
    "heparin",
    "dabigatran",
    "rivaroxaban",
    "apixaban",
    "edoxaban",
    "clopidogrel",
    "prasugrel",
    "ticagrelor",
    "isotretinoin",
    "accutane",
    "finasteride",
    "dutasteride",
    "acitretin",
    "leflunomide",
    "teriflunomide",
];

/// Keyword entry in the permanent-disqualification table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionKeyword {
    pub keyword: String,
    pub label: String,
}

/// Central table of deferral windows and classification lists.
///
/// `Default` yields the standard policy. Risk regions start empty and are supplied
/// by configuration, since the geographic taxonomy is owned by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PolicyDocument")]
pub struct DeferralPolicy {
    pub min_age_years: i32,
    pub max_age_years: i32,
    pub min_donation_interval_days: i64,
    pub transfusion_deferral_days: i64,
    pub pregnancy_deferral_days: i64,
    pub travel_risk_deferral_days: i64,
    permanent_conditions: Vec<ConditionKeyword>,
    deferral_medications: BTreeSet<String>,
    risk_regions: BTreeSet<String>,
}

impl Default for DeferralPolicy {
    fn default() -> Self {
        Self {
            min_age_years: MIN_AGE_YEARS,
            max_age_years: MAX_AGE_YEARS,
            min_donation_interval_days: MIN_DONATION_INTERVAL_DAYS,
            transfusion_deferral_days: TRANSFUSION_DEFERRAL_DAYS,
            pregnancy_deferral_days: PREGNANCY_DEFERRAL_DAYS,
            travel_risk_deferral_days: TRAVEL_RISK_DEFERRAL_DAYS,
            permanent_conditions: PERMANENT_CONDITION_KEYWORDS
                .iter()
                .map(|(keyword, label)| ConditionKeyword {
                    keyword: keyword.to_string(),
                    label: label.to_string(),
                })
                .collect(),
            deferral_medications: DEFERRAL_MEDICATIONS
                .iter()
                .map(|name| name.to_string())
                .collect(),
            risk_regions: BTreeSet::new(),
        }
    }
}

impl DeferralPolicy {
    /// Override the minimum donation interval; non-positive values keep the standard
    /// interval.
    pub fn with_min_donation_interval_days(mut self, days: i64) -> Self {
        self.min_donation_interval_days = positive_or(days, MIN_DONATION_INTERVAL_DAYS);
        self
    }

    /// Override the transfusion window; non-positive values keep the standard window.
    pub fn with_transfusion_deferral_days(mut self, days: i64) -> Self {
        self.transfusion_deferral_days = positive_or(days, TRANSFUSION_DEFERRAL_DAYS);
        self
    }

    /// Replace the permanent-disqualification table. Keywords are lowercased and
    /// entries with a blank keyword are dropped.
    pub fn with_permanent_conditions<I>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = ConditionKeyword>,
    {
        self.permanent_conditions = conditions
            .into_iter()
            .filter_map(|entry| {
                let keyword = normalize(&entry.keyword);
                (!keyword.is_empty()).then(|| ConditionKeyword {
                    keyword,
                    label: entry.label.trim().to_string(),
                })
            })
            .collect();
        self
    }

    /// Replace the deferral-medication list.
    pub fn with_deferral_medications<I, S>(mut self, medications: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.deferral_medications.clear();
        for medication in medications {
            self = self.with_deferral_medication(medication.as_ref());
        }
        self
    }

    /// Replace the risk-region table. Identifiers are compared case-insensitively.
    pub fn with_risk_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.risk_regions = regions
            .into_iter()
            .map(|region| normalize(region.as_ref()))
            .filter(|region| !region.is_empty())
            .collect();
        self
    }

    /// Override the postpartum window; non-positive values keep the standard window.
    pub fn with_pregnancy_deferral_days(mut self, days: i64) -> Self {
        self.pregnancy_deferral_days = positive_or(days, PREGNANCY_DEFERRAL_DAYS);
        self
    }

    /// Override the travel window; non-positive values keep the standard window.
    pub fn with_travel_risk_deferral_days(mut self, days: i64) -> Self {
        self.travel_risk_deferral_days = positive_or(days, TRAVEL_RISK_DEFERRAL_DAYS);
        self
    }

    pub fn with_deferral_medication(mut self, medication: &str) -> Self {
        let normalized = normalize(medication);
        if !normalized.is_empty() {
            self.deferral_medications.insert(normalized);
        }
        self
    }

    /// First permanent keyword contained in `condition`, if any.
    pub fn permanent_condition(&self, condition: &str) -> Option<&ConditionKeyword> {
        let haystack = condition.to_lowercase();
        self.permanent_conditions
            .iter()
            .find(|entry| haystack.contains(entry.keyword.as_str()))
    }

    pub fn is_deferral_medication(&self, medication: &str) -> bool {
        self.deferral_medications.contains(&normalize(medication))
    }

    pub fn is_risk_region(&self, region: &str) -> bool {
        self.risk_regions.contains(&normalize(region))
    }

    pub fn risk_regions(&self) -> impl Iterator<Item = &str> {
        self.risk_regions.iter().map(String::as_str)
    }
}

/// Age bounds that cannot admit any donor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("minimum donor age {min_age_years} exceeds maximum donor age {max_age_years}")]
pub struct InvalidAgeBounds {
    pub min_age_years: i32,
    pub max_age_years: i32,
}

/// Wire form of a policy. Every field is routed through the builders on the way in.
#[derive(Deserialize)]
#[serde(default)]
struct PolicyDocument {
    min_age_years: i32,
    max_age_years: i32,
    min_donation_interval_days: i64,
    transfusion_deferral_days: i64,
    pregnancy_deferral_days: i64,
    travel_risk_deferral_days: i64,
    permanent_conditions: Vec<ConditionKeyword>,
    deferral_medications: Vec<String>,
    risk_regions: Vec<String>,
}

impl Default for PolicyDocument {
    fn default() -> Self {
        let standard = DeferralPolicy::default();
        Self {
            min_age_years: standard.min_age_years,
            max_age_years: standard.max_age_years,
            min_donation_interval_days: standard.min_donation_interval_days,
            transfusion_deferral_days: standard.transfusion_deferral_days,
            pregnancy_deferral_days: standard.pregnancy_deferral_days,
            travel_risk_deferral_days: standard.travel_risk_deferral_days,
            permanent_conditions: standard.permanent_conditions,
            deferral_medications: standard.deferral_medications.into_iter().collect(),
            risk_regions: Vec::new(),
        }
    }
}

impl TryFrom<PolicyDocument> for DeferralPolicy {
    type Error = InvalidAgeBounds;

    fn try_from(document: PolicyDocument) -> Result<Self, Self::Error> {
        if document.min_age_years < 0 || document.min_age_years > document.max_age_years {
            return Err(InvalidAgeBounds {
                min_age_years: document.min_age_years,
                max_age_years: document.max_age_years,
            });
        }

        let mut policy = DeferralPolicy::default()
            .with_min_donation_interval_days(document.min_donation_interval_days)
            .with_transfusion_deferral_days(document.transfusion_deferral_days)
            .with_pregnancy_deferral_days(document.pregnancy_deferral_days)
            .with_travel_risk_deferral_days(document.travel_risk_deferral_days)
            .with_permanent_conditions(document.permanent_conditions)
            .with_deferral_medications(&document.deferral_medications)
            .with_risk_regions(&document.risk_regions);
        policy.min_age_years = document.min_age_years;
        policy.max_age_years = document.max_age_years;
        Ok(policy)
    }
}

fn positive_or(days: i64, standard: i64) -> i64 {
    if days > 0 {
        days
    } else {
        standard
    }
}

fn normalize(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_carries_standard_windows() {
        let policy = DeferralPolicy::default();
        assert_eq!(policy.min_age_years, 16);
        assert_eq!(policy.max_age_years, 100);
        assert_eq!(policy.min_donation_interval_days, 56);
        assert_eq!(policy.transfusion_deferral_days, 365);
        assert_eq!(policy.pregnancy_deferral_days, PREGNANCY_DEFERRAL_DAYS);
        assert_eq!(policy.risk_regions().count(), 0);
    }

    #[test]
    fn permanent_keywords_match_case_insensitive_substrings() {
        let policy = DeferralPolicy::default();
        let hit = policy
            .permanent_condition("Diagnosed HIV positive in 2012")
            .expect("hiv matches");
        assert_eq!(hit.label, "HIV");

        let hit = policy
            .permanent_condition("chronic Hepatitis-B")
            .expect("hepatitis matches");
        assert_eq!(hit.keyword, "hepatitis-b");

        assert!(policy.permanent_condition("Seasonal asthma").is_none());
    }

    #[test]
    fn medication_membership_ignores_case_and_spacing() {
        let policy = DeferralPolicy::default();
        assert!(policy.is_deferral_medication("Warfarin"));
        assert!(policy.is_deferral_medication("  CLOPIDOGREL "));
        assert!(!policy.is_deferral_medication("Aspirin"));

        let policy = policy.with_deferral_medication("Aspirin");
        assert!(policy.is_deferral_medication("aspirin"));
    }

    #[test]
    fn risk_regions_are_injected_and_normalized() {
        let policy =
            DeferralPolicy::default().with_risk_regions(["Region-Alpha", "  ", "region  beta"]);
        assert!(policy.is_risk_region("region-alpha"));
        assert!(policy.is_risk_region("Region Beta"));
        assert!(!policy.is_risk_region("region-gamma"));
        assert_eq!(policy.risk_regions().count(), 2);
    }

    #[test]
    fn window_overrides_reject_non_positive_values() {
        let policy = DeferralPolicy::default()
            .with_pregnancy_deferral_days(0)
            .with_travel_risk_deferral_days(90);
        assert_eq!(policy.pregnancy_deferral_days, PREGNANCY_DEFERRAL_DAYS);
        assert_eq!(policy.travel_risk_deferral_days, 90);
    }

    #[test]
    fn json_policy_is_normalized_like_the_builders() {
        let policy: DeferralPolicy = serde_json::from_value(serde_json::json!({
            "min_donation_interval_days": -10,
            "transfusion_deferral_days": 0,
            "pregnancy_deferral_days": 84,
            "permanent_conditions": [
                { "keyword": "  Malaria ", "label": "Malaria" },
                { "keyword": "", "label": "Blank" }
            ],
            "deferral_medications": ["Warfarin", "  "],
            "risk_regions": ["Region-Alpha"]
        }))
        .expect("policy deserializes");

        assert!(policy.is_risk_region("Region-Alpha"));
        assert!(policy.is_deferral_medication("Warfarin"));
        assert!(!policy.is_deferral_medication("Clopidogrel"));
        let hit = policy
            .permanent_condition("Treated for MALARIA in 2019")
            .expect("malaria matches");
        assert_eq!(hit.label, "Malaria");
        assert!(policy.permanent_condition("HIV positive").is_none());
        assert_eq!(policy.min_donation_interval_days, MIN_DONATION_INTERVAL_DAYS);
        assert_eq!(policy.transfusion_deferral_days, TRANSFUSION_DEFERRAL_DAYS);
        assert_eq!(policy.pregnancy_deferral_days, 84);
        assert_eq!(policy.min_age_years, MIN_AGE_YEARS);
    }

    #[test]
    fn serialized_policy_reads_back_unchanged() {
        let policy = DeferralPolicy::default()
            .with_risk_regions(["region-alpha"])
            .with_travel_risk_deferral_days(180);

        let json = serde_json::to_value(&policy).expect("serializes");
        let restored: DeferralPolicy = serde_json::from_value(json).expect("deserializes");

        assert_eq!(restored, policy);
    }

    #[test]
    fn inverted_age_bounds_are_rejected() {
        let result = serde_json::from_value::<DeferralPolicy>(serde_json::json!({
            "min_age_years": 70,
            "max_age_years": 65
        }));

        let error = result.expect_err("inverted bounds rejected");
        assert!(error.to_string().contains("exceeds maximum donor age"));
    }
}
