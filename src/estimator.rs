//! Local timeline estimation
//!
//! This module derives a custom weight-change timeline from validated goal
//! fields: a plan length, a weekly rate, and a difficulty tier. It is the
//! only numeric derivation the client performs itself; everything nutritional
//! (TDEE, BMR, calories) stays server-side.
//!
//! Estimation is a pure function of its inputs plus the rate policy, so the
//! same fields always produce the same timeline.

use chrono::{Duration, NaiveDate, Utc};

use crate::types::{Approach, DifficultyLevel, Timeline};
use crate::validator::ValidatedGoalFields;

/// Rate-of-change policy constants.
///
/// These are product policy, not clinical guidance: the defaults mirror the
/// program's long-standing values (1.5 lbs/week assumed sustainable rate,
/// tier boundaries at 1 and 2 lbs/week).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatePolicy {
    /// Assumed sustainable rate (lbs/week) when the user gives no timeline
    pub default_weekly_rate_lbs: f64,
    /// Rates strictly above this are at least moderate (lbs/week)
    pub moderate_floor_lbs: f64,
    /// Rates strictly above this are aggressive (lbs/week)
    pub aggressive_floor_lbs: f64,
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self {
            default_weekly_rate_lbs: 1.5,
            moderate_floor_lbs: 1.0,
            aggressive_floor_lbs: 2.0,
        }
    }
}

impl RatePolicy {
    /// Classify a weekly rate into a difficulty tier.
    ///
    /// Boundaries are inclusive on the lower tier: exactly 1.0 lbs/week is
    /// conservative, exactly 2.0 lbs/week is moderate.
    pub fn classify(&self, weekly_rate_lbs: f64) -> DifficultyLevel {
        if weekly_rate_lbs > self.aggressive_floor_lbs {
            DifficultyLevel::Aggressive
        } else if weekly_rate_lbs > self.moderate_floor_lbs {
            DifficultyLevel::Moderate
        } else {
            DifficultyLevel::Conservative
        }
    }
}

/// Build a custom timeline from validated goal fields.
///
/// Uses the explicit weeks hint when present, otherwise derives the length
/// from the policy's default sustainable rate. The emitted timeline is
/// sign-consistent by construction: validation already checked the goal
/// against the direction of the change.
pub fn estimate(fields: &ValidatedGoalFields, policy: &RatePolicy) -> Timeline {
    estimate_from(fields, policy, Utc::now().date_naive())
}

/// Like [`estimate`], with an explicit "today" for the completion date
pub fn estimate_from(fields: &ValidatedGoalFields, policy: &RatePolicy, today: NaiveDate) -> Timeline {
    let delta = fields.target_weight_lbs - fields.current_weight_lbs;
    let abs_delta = delta.abs();

    // A maintain plan with no hint would derive zero weeks; the plan length
    // invariant is >= 1.
    let timeline_weeks = fields
        .weeks_hint
        .unwrap_or_else(|| ((abs_delta / policy.default_weekly_rate_lbs).ceil() as u32).max(1));

    let weekly_rate_lbs = round2(abs_delta / f64::from(timeline_weeks));

    Timeline {
        approach: Approach::CustomPlan,
        target_weight_lbs: fields.target_weight_lbs,
        weight_change_lbs: delta,
        timeline_weeks,
        weekly_rate_lbs,
        weight_goal: fields.weight_goal,
        difficulty_level: policy.classify(weekly_rate_lbs),
        estimated_end_date: Some(today + Duration::weeks(i64::from(timeline_weeks))),
        focus_areas: Vec::new(),
        expected_outcomes: Vec::new(),
    }
}

/// Round to 2 decimal places
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WeightGoal;
    use pretty_assertions::assert_eq;

    fn validated(
        current: f64,
        target: f64,
        weeks: Option<u32>,
        goal: WeightGoal,
    ) -> ValidatedGoalFields {
        ValidatedGoalFields {
            current_weight_lbs: current,
            target_weight_lbs: target,
            weeks_hint: weeks,
            weight_goal: goal,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_lose_without_weeks_hint() {
        let fields = validated(180.0, 165.0, None, WeightGoal::Lose);
        let timeline = estimate_from(&fields, &RatePolicy::default(), today());

        assert_eq!(timeline.approach, Approach::CustomPlan);
        assert_eq!(timeline.weight_change_lbs, -15.0);
        // ceil(15 / 1.5) = 10 weeks at exactly 1.50 lbs/week
        assert_eq!(timeline.timeline_weeks, 10);
        assert_eq!(timeline.weekly_rate_lbs, 1.5);
        assert_eq!(timeline.difficulty_level, DifficultyLevel::Moderate);
        assert_eq!(timeline.weight_goal, WeightGoal::Lose);
        assert_eq!(
            timeline.estimated_end_date,
            Some(NaiveDate::from_ymd_opt(2024, 3, 25).unwrap())
        );
        assert!(timeline.is_sign_consistent());
    }

    #[test]
    fn test_gain_with_weeks_hint() {
        let fields = validated(130.0, 150.0, Some(5), WeightGoal::Gain);
        let timeline = estimate_from(&fields, &RatePolicy::default(), today());

        assert_eq!(timeline.weight_change_lbs, 20.0);
        assert_eq!(timeline.timeline_weeks, 5);
        assert_eq!(timeline.weekly_rate_lbs, 4.0);
        assert_eq!(timeline.difficulty_level, DifficultyLevel::Aggressive);
        assert!(timeline.is_sign_consistent());
    }

    #[test]
    fn test_maintain_clamps_to_one_week() {
        let fields = validated(140.0, 140.0, None, WeightGoal::Maintain);
        let timeline = estimate_from(&fields, &RatePolicy::default(), today());

        assert_eq!(timeline.weight_change_lbs, 0.0);
        assert_eq!(timeline.timeline_weeks, 1);
        assert_eq!(timeline.weekly_rate_lbs, 0.0);
        assert_eq!(timeline.difficulty_level, DifficultyLevel::Conservative);
        assert!(timeline.is_sign_consistent());
    }

    #[test]
    fn test_rate_rounding() {
        // 10 lbs over 3 weeks = 3.333... -> 3.33
        let fields = validated(160.0, 150.0, Some(3), WeightGoal::Lose);
        let timeline = estimate_from(&fields, &RatePolicy::default(), today());
        assert_eq!(timeline.weekly_rate_lbs, 3.33);

        // 2 lbs over 3 weeks = 0.666... -> 0.67
        let fields = validated(152.0, 150.0, Some(3), WeightGoal::Lose);
        let timeline = estimate_from(&fields, &RatePolicy::default(), today());
        assert_eq!(timeline.weekly_rate_lbs, 0.67);
    }

    #[test]
    fn test_tier_boundaries() {
        let policy = RatePolicy::default();
        // Boundaries are inclusive on the lower tier
        assert_eq!(policy.classify(1.0), DifficultyLevel::Conservative);
        assert_eq!(policy.classify(1.01), DifficultyLevel::Moderate);
        assert_eq!(policy.classify(2.0), DifficultyLevel::Moderate);
        assert_eq!(policy.classify(2.01), DifficultyLevel::Aggressive);
        assert_eq!(policy.classify(0.0), DifficultyLevel::Conservative);
    }

    #[test]
    fn test_custom_policy() {
        let policy = RatePolicy {
            default_weekly_rate_lbs: 1.0,
            moderate_floor_lbs: 0.5,
            aggressive_floor_lbs: 1.5,
        };
        let fields = validated(180.0, 170.0, None, WeightGoal::Lose);
        let timeline = estimate_from(&fields, &policy, today());

        assert_eq!(timeline.timeline_weeks, 10);
        assert_eq!(timeline.weekly_rate_lbs, 1.0);
        assert_eq!(timeline.difficulty_level, DifficultyLevel::Moderate);
    }

    #[test]
    fn test_estimation_is_deterministic() {
        let fields = validated(180.0, 165.0, None, WeightGoal::Lose);
        let policy = RatePolicy::default();
        let a = estimate_from(&fields, &policy, today());
        let b = estimate_from(&fields, &policy, today());
        assert_eq!(a, b);
    }
}
