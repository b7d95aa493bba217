//! Biometric input validation
//!
//! This module validates raw goal form fields before anything else runs:
//! - weights must parse as finite numbers > 0
//! - an explicit timeline must be a whole number of weeks >= 1
//! - the goal direction must agree with the sign of the requested change
//!
//! Validation is pure; callers surface the rejection reason to the user and
//! no remote call is made for invalid input.

use crate::error::ValidationError;
use crate::types::WeightGoal;

/// Raw goal fields as they arrive from a UI form (everything is a string)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGoalFields {
    pub current_weight: Option<String>,
    pub target_weight: Option<String>,
    /// Optional explicit timeline length, in weeks
    pub weeks: Option<String>,
    pub weight_goal: Option<String>,
}

/// Parsed and cross-checked goal fields, ready for estimation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedGoalFields {
    pub current_weight_lbs: f64,
    pub target_weight_lbs: f64,
    pub weeks_hint: Option<u32>,
    pub weight_goal: WeightGoal,
}

/// Validate raw form fields
pub fn validate(fields: &RawGoalFields) -> Result<ValidatedGoalFields, ValidationError> {
    let current_weight_lbs = parse_weight("current_weight", fields.current_weight.as_deref())?;
    let target_weight_lbs = parse_weight("target_weight", fields.target_weight.as_deref())?;

    let goal_raw = fields
        .weight_goal
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingField("weight_goal"))?;
    let weight_goal = WeightGoal::parse(goal_raw)
        .ok_or_else(|| ValidationError::UnknownGoal(goal_raw.to_string()))?;

    let weeks_hint = parse_weeks(fields.weeks.as_deref())?;

    let delta = target_weight_lbs - current_weight_lbs;
    if !weight_goal.matches_change(delta) {
        return Err(ValidationError::GoalWeightMismatch {
            goal: weight_goal.as_str(),
            current_lbs: current_weight_lbs,
            target_lbs: target_weight_lbs,
        });
    }

    Ok(ValidatedGoalFields {
        current_weight_lbs,
        target_weight_lbs,
        weeks_hint,
        weight_goal,
    })
}

fn parse_weight(field: &'static str, value: Option<&str>) -> Result<f64, ValidationError> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingField(field))?;

    let weight: f64 = raw.parse().map_err(|_| ValidationError::NotANumber {
        field,
        value: raw.to_string(),
    })?;

    if !weight.is_finite() {
        return Err(ValidationError::NotANumber {
            field,
            value: raw.to_string(),
        });
    }
    if weight <= 0.0 {
        return Err(ValidationError::NonPositiveWeight {
            field,
            value: raw.to_string(),
        });
    }

    Ok(weight)
}

fn parse_weeks(value: Option<&str>) -> Result<Option<u32>, ValidationError> {
    let raw = match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw,
        None => return Ok(None),
    };

    // Non-numeric input is a number problem; numeric input below one week
    // is a timeline problem.
    let weeks: i64 = raw.parse().map_err(|_| ValidationError::NotANumber {
        field: "weeks",
        value: raw.to_string(),
    })?;
    if weeks < 1 {
        return Err(ValidationError::TimelineTooShort(raw.to_string()));
    }

    Ok(Some(u32::try_from(weeks).unwrap_or(u32::MAX)))
}
