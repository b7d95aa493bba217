//! Remote goal service boundary
//!
//! The engine talks to three opaque endpoints: goal assessment, goal
//! customization, and timeline save. This module defines the service trait
//! plus the exact wire shapes those endpoints expect; `http` provides the
//! default client.
//!
//! Responses are authoritative: the engine never recomputes any numeric
//! field a response carries.

pub mod http;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::GoalError;
use crate::types::{Assessment, BiometricProfile, Customization, Timeline};

pub use http::HttpGoalService;

/// Flattened biometric profile as the endpoints expect it, with
/// health-condition flags mapped to individual booleans
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfilePayload {
    pub current_weight_lbs: f64,
    pub target_weight_lbs: f64,
    pub birth_year: i32,
    pub birth_month: u32,
    pub height_feet: u32,
    pub height_inches: u32,
    pub biological_sex: &'static str,
    pub activity_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diet_preference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ethnicity: Option<String>,
    pub has_diabetes: bool,
    pub has_hypertension: bool,
    pub has_heart_disease: bool,
    pub has_thyroid_disorder: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub food_allergies: Vec<String>,
}

impl From<&BiometricProfile> for ProfilePayload {
    fn from(profile: &BiometricProfile) -> Self {
        Self {
            current_weight_lbs: profile.current_weight_lbs,
            target_weight_lbs: profile.target_weight_lbs,
            birth_year: profile.birth_year,
            birth_month: profile.birth_month,
            height_feet: profile.height_feet,
            height_inches: profile.height_inches,
            biological_sex: match profile.biological_sex {
                crate::types::BiologicalSex::Female => "female",
                crate::types::BiologicalSex::Male => "male",
            },
            activity_level: serde_plain_name(&profile.activity_level),
            diet_preference: profile.diet_preference.clone(),
            ethnicity: profile.ethnicity.clone(),
            has_diabetes: profile.health_conditions.diabetes,
            has_hypertension: profile.health_conditions.hypertension,
            has_heart_disease: profile.health_conditions.heart_disease,
            has_thyroid_disorder: profile.health_conditions.thyroid_disorder,
            food_allergies: profile.health_conditions.food_allergies.clone(),
        }
    }
}

/// Serde rename of a unit enum variant as a plain string
fn serde_plain_name<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(name)) => name,
        _ => String::new(),
    }
}

/// `POST /goal-assessment` request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentRequest {
    #[serde(flatten)]
    pub profile: ProfilePayload,
}

impl AssessmentRequest {
    pub fn new(profile: &BiometricProfile) -> Self {
        Self {
            profile: profile.into(),
        }
    }
}

/// `POST /goal-customization` request body: the profile plus the chosen
/// timeline's fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomizationRequest {
    #[serde(flatten)]
    pub profile: ProfilePayload,
    pub weight_goal: String,
    pub approach: String,
    pub target_weight_lbs: f64,
    pub target_weeks: u32,
    pub weekly_rate_lbs: f64,
}

impl CustomizationRequest {
    pub fn new(profile: &BiometricProfile, timeline: &Timeline) -> Self {
        Self {
            profile: profile.into(),
            weight_goal: timeline.weight_goal.as_str().to_string(),
            approach: timeline.approach.as_str().to_string(),
            target_weight_lbs: timeline.target_weight_lbs,
            target_weeks: timeline.timeline_weeks,
            weekly_rate_lbs: timeline.weekly_rate_lbs,
        }
    }
}

/// `POST /goal/assessment/{user_id}` request body: the full timeline plus
/// assessment-sourced energy numbers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveTimelineRequest {
    #[serde(flatten)]
    pub timeline: Timeline,
    pub tdee: f64,
    pub bmr: f64,
    pub current_weight_lbs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_calories: Option<f64>,
}

/// The three remote endpoints behind one seam.
///
/// Implementations must treat every call as independent; the engine handles
/// sequencing, staleness, and commit semantics.
#[async_trait]
pub trait GoalService: Send + Sync {
    /// `POST /goal-assessment`
    async fn fetch_assessment(&self, request: &AssessmentRequest)
        -> Result<Assessment, GoalError>;

    /// `POST /goal-customization`
    async fn fetch_customization(
        &self,
        request: &CustomizationRequest,
    ) -> Result<Customization, GoalError>;

    /// `POST /goal/assessment/{user_id}`; any non-error response is success
    async fn save_timeline(
        &self,
        user_id: &str,
        request: &SaveTimelineRequest,
    ) -> Result<(), GoalError>;
}
