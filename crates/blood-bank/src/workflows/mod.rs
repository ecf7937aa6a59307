pub mod eligibility;
pub mod roster;
