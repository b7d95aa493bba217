//! Core types for the Goalpath engine
//!
//! This module defines the data that flows between the validator, estimator,
//! selector, and orchestrator: the user's biometric profile, candidate
//! timelines, and the server-computed assessment/customization payloads.
//!
//! Server payloads are modeled with explicit `Option` fields rather than
//! dynamic lookups, so missing-field behavior is part of the contract.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Weight entry granularity; two timelines whose targets differ by less than
/// this are considered the same target, and a change smaller than this counts
/// as "maintain".
pub const WEIGHT_EPSILON_LBS: f64 = 0.01;

/// Direction of the user's weight goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightGoal {
    Lose,
    Gain,
    Maintain,
}

impl WeightGoal {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightGoal::Lose => "lose",
            WeightGoal::Gain => "gain",
            WeightGoal::Maintain => "maintain",
        }
    }

    /// Parse a raw form value ("lose"/"gain"/"maintain")
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lose" => Some(WeightGoal::Lose),
            "gain" => Some(WeightGoal::Gain),
            "maintain" => Some(WeightGoal::Maintain),
            _ => None,
        }
    }

    /// Whether this goal is consistent with a signed weight change
    pub fn matches_change(&self, weight_change_lbs: f64) -> bool {
        match self {
            WeightGoal::Lose => weight_change_lbs < -WEIGHT_EPSILON_LBS,
            WeightGoal::Gain => weight_change_lbs > WEIGHT_EPSILON_LBS,
            WeightGoal::Maintain => weight_change_lbs.abs() <= WEIGHT_EPSILON_LBS,
        }
    }
}

/// Named strategy tier of a timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Approach {
    Conservative,
    Moderate,
    Aggressive,
    /// Locally derived plan, not one of the server-offered tiers
    CustomPlan,
}

impl Approach {
    pub fn as_str(&self) -> &'static str {
        match self {
            Approach::Conservative => "conservative",
            Approach::Moderate => "moderate",
            Approach::Aggressive => "aggressive",
            Approach::CustomPlan => "custom_plan",
        }
    }
}

/// Difficulty tier derived from the weekly rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Conservative,
    Moderate,
    Aggressive,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Conservative => "conservative",
            DifficultyLevel::Moderate => "moderate",
            DifficultyLevel::Aggressive => "aggressive",
        }
    }
}

/// One concrete weight-change plan
///
/// The server does not issue stable IDs; `(approach, target_weight_lbs)` is
/// the de-facto identity of a timeline within an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// Strategy tier, or `custom_plan` when locally derived
    pub approach: Approach,
    /// Target weight (lbs)
    pub target_weight_lbs: f64,
    /// Signed change, target minus current (negative = loss)
    pub weight_change_lbs: f64,
    /// Plan length in whole weeks, always >= 1
    pub timeline_weeks: u32,
    /// |weight_change_lbs| / timeline_weeks, rounded to 2 decimals
    pub weekly_rate_lbs: f64,
    /// Direction of the goal
    pub weight_goal: WeightGoal,
    /// Derived difficulty tier
    pub difficulty_level: DifficultyLevel,
    /// Expected completion date, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_end_date: Option<NaiveDate>,
    /// Server-authored descriptive copy, passed through untouched
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub focus_areas: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expected_outcomes: Vec<String>,
}

impl Timeline {
    /// Whether another timeline shares this one's composite
    /// `(approach, target_weight_lbs)` identity
    pub fn same_key(&self, other: &Timeline) -> bool {
        self.approach == other.approach
            && (self.target_weight_lbs - other.target_weight_lbs).abs() <= WEIGHT_EPSILON_LBS
    }

    /// Sign-consistency invariant: the goal direction must agree with the
    /// sign of the weight change. A timeline violating this is rejected
    /// before submission.
    pub fn is_sign_consistent(&self) -> bool {
        self.weight_goal.matches_change(self.weight_change_lbs)
    }
}

/// Biological sex as collected by the health profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiologicalSex {
    Female,
    Male,
}

/// Self-reported activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtremelyActive,
}

/// Health-condition flags forwarded to the assessment endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthConditions {
    #[serde(default)]
    pub diabetes: bool,
    #[serde(default)]
    pub hypertension: bool,
    #[serde(default)]
    pub heart_disease: bool,
    #[serde(default)]
    pub thyroid_disorder: bool,
    #[serde(default)]
    pub food_allergies: Vec<String>,
}

/// Immutable snapshot of the user's health profile, read by the engine on
/// each assessment/customization request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiometricProfile {
    pub current_weight_lbs: f64,
    pub target_weight_lbs: f64,
    pub birth_year: i32,
    pub birth_month: u32,
    pub height_feet: u32,
    pub height_inches: u32,
    pub biological_sex: BiologicalSex,
    pub activity_level: ActivityLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diet_preference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ethnicity: Option<String>,
    #[serde(default)]
    pub health_conditions: HealthConditions,
}

/// Server-computed biometric snapshot plus candidate timelines
///
/// Authoritative and read-only: the engine never recomputes TDEE/BMR/BMI
/// locally, it only reads them back when saving a chosen timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub age: u32,
    pub weight_lbs: f64,
    pub tdee: f64,
    pub bmr: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_timeline: Option<Timeline>,
    #[serde(default)]
    pub available_timelines: Vec<Timeline>,
}

/// Macro targets within a customization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroBreakdown {
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat_pct: Option<f64>,
}

/// Timeline detail echoed back by the customization endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineDetail {
    /// Amount to lose/gain/maintain (lbs, unsigned)
    pub amount_lbs: f64,
    /// Expected change per week (lbs)
    pub weekly_change_lbs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_end_date: Option<NaiveDate>,
}

/// Server-computed nutrition plan for one specific timeline
///
/// Regenerated whenever the selection changes; the engine must never pair a
/// customization with a timeline other than the one it was fetched for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customization {
    pub target_calories: f64,
    pub macros: MacroBreakdown,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub micronutrient_targets: HashMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline_detail: Option<TimelineDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lose_timeline() -> Timeline {
        Timeline {
            approach: Approach::Moderate,
            target_weight_lbs: 165.0,
            weight_change_lbs: -15.0,
            timeline_weeks: 10,
            weekly_rate_lbs: 1.5,
            weight_goal: WeightGoal::Lose,
            difficulty_level: DifficultyLevel::Moderate,
            estimated_end_date: None,
            focus_areas: vec![],
            expected_outcomes: vec![],
        }
    }

    #[test]
    fn test_goal_matches_change() {
        assert!(WeightGoal::Lose.matches_change(-5.0));
        assert!(!WeightGoal::Lose.matches_change(5.0));
        assert!(!WeightGoal::Lose.matches_change(0.0));

        assert!(WeightGoal::Gain.matches_change(5.0));
        assert!(!WeightGoal::Gain.matches_change(-5.0));

        assert!(WeightGoal::Maintain.matches_change(0.0));
        assert!(WeightGoal::Maintain.matches_change(0.005));
        assert!(!WeightGoal::Maintain.matches_change(1.0));
    }

    #[test]
    fn test_sign_consistency() {
        let mut t = lose_timeline();
        assert!(t.is_sign_consistent());

        t.weight_goal = WeightGoal::Gain;
        assert!(!t.is_sign_consistent());
    }

    #[test]
    fn test_same_key_tolerance() {
        let a = lose_timeline();
        let mut b = lose_timeline();
        b.target_weight_lbs = 165.005;
        assert!(a.same_key(&b));

        b.target_weight_lbs = 160.0;
        assert!(!a.same_key(&b));
    }

    #[test]
    fn test_serde_round_trip_names() {
        let json = serde_json::to_value(lose_timeline()).unwrap();
        assert_eq!(json["approach"], "moderate");
        assert_eq!(json["weight_goal"], "lose");
        assert_eq!(json["difficulty_level"], "moderate");
        // Empty descriptive fields stay off the wire
        assert!(json.get("focus_areas").is_none());
    }

    #[test]
    fn test_assessment_tolerates_missing_optional_fields() {
        let json = r#"{
            "age": 34,
            "weight_lbs": 180.0,
            "tdee": 2450.0,
            "bmr": 1700.0
        }"#;
        let assessment: Assessment = serde_json::from_str(json).unwrap();
        assert_eq!(assessment.bmi, None);
        assert!(assessment.available_timelines.is_empty());
        assert_eq!(assessment.recommended_timeline, None);
    }
}
