//! Timeline reconciliation and selection
//!
//! This module tracks the single currently-selected timeline and its paired
//! customization. Server-offered timelines and a locally derived custom plan
//! go through the same selection path, and every selection change bumps a
//! token so that a customization fetched for an earlier selection can be
//! recognized as stale and discarded instead of merged.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::GoalError;
use crate::types::{Approach, Customization, Timeline, WEIGHT_EPSILON_LBS};

/// Opaque token identifying one selection generation.
///
/// A customization response is only applied if it carries the token of the
/// selection it was fetched for; anything else is a stale writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionToken(Uuid);

impl SelectionToken {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Owner of the selected-timeline/customization pair
#[derive(Debug)]
pub struct TimelineSelector {
    available: Vec<Timeline>,
    selected: Option<Timeline>,
    customization: Option<Customization>,
    token: SelectionToken,
}

impl Default for TimelineSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineSelector {
    pub fn new() -> Self {
        Self {
            available: Vec::new(),
            selected: None,
            customization: None,
            token: SelectionToken::fresh(),
        }
    }

    /// Replace the server-offered timelines, usually after a fresh
    /// assessment. Duplicate `(approach, target)` keys should not occur from
    /// a well-behaved server; the first occurrence wins and the rest are
    /// dropped with a log line.
    pub fn set_available(&mut self, timelines: Vec<Timeline>) {
        let mut deduped: Vec<Timeline> = Vec::with_capacity(timelines.len());
        for timeline in timelines {
            if let Some(existing) = deduped.iter().find(|t| t.same_key(&timeline)) {
                warn!(
                    approach = existing.approach.as_str(),
                    target_lbs = existing.target_weight_lbs,
                    "duplicate timeline key from server, keeping first"
                );
                continue;
            }
            deduped.push(timeline);
        }
        self.available = deduped;
    }

    /// Server-offered timelines for the current assessment
    pub fn available(&self) -> &[Timeline] {
        &self.available
    }

    /// Timelines whose target weight matches the given value, used to narrow
    /// approach choices once a target is chosen
    pub fn filter_by_target(&self, target_weight_lbs: f64) -> Vec<&Timeline> {
        self.available
            .iter()
            .filter(|t| (t.target_weight_lbs - target_weight_lbs).abs() <= WEIGHT_EPSILON_LBS)
            .collect()
    }

    /// Select a server-offered timeline by its composite key.
    ///
    /// Clears any customization from the previous selection; the caller is
    /// expected to refresh it for the returned token.
    pub fn select_from_server(
        &mut self,
        approach: Approach,
        target_weight_lbs: f64,
    ) -> Result<(Timeline, SelectionToken), GoalError> {
        let timeline = self
            .available
            .iter()
            .find(|t| {
                t.approach == approach
                    && (t.target_weight_lbs - target_weight_lbs).abs() <= WEIGHT_EPSILON_LBS
            })
            .cloned()
            .ok_or_else(|| GoalError::UnknownTimeline {
                approach: approach.as_str().to_string(),
                target_lbs: target_weight_lbs,
            })?;

        let token = self.set_selected(timeline.clone());
        Ok((timeline, token))
    }

    /// Select a locally estimated custom timeline directly
    pub fn select_custom(&mut self, timeline: Timeline) -> SelectionToken {
        self.set_selected(timeline)
    }

    fn set_selected(&mut self, timeline: Timeline) -> SelectionToken {
        self.selected = Some(timeline);
        self.customization = None;
        self.token = SelectionToken::fresh();
        self.token
    }

    /// Current selection token
    pub fn token(&self) -> SelectionToken {
        self.token
    }

    /// Pair a customization with the selection it was fetched for.
    ///
    /// Rejects responses carrying a stale token, keeping the pair atomic:
    /// the stored customization always belongs to the stored selection.
    pub fn apply_customization(
        &mut self,
        token: SelectionToken,
        customization: Customization,
    ) -> Result<(), GoalError> {
        if token != self.token {
            debug!("discarding customization for a stale selection");
            return Err(GoalError::StaleSelection);
        }
        self.customization = Some(customization);
        Ok(())
    }

    pub fn selected(&self) -> Option<&Timeline> {
        self.selected.as_ref()
    }

    /// Customization for the currently selected timeline, if it has arrived
    pub fn customization(&self) -> Option<&Customization> {
        self.customization.as_ref()
    }

    /// Drop all selection state, e.g. on logout
    pub fn clear(&mut self) {
        self.available.clear();
        self.selected = None;
        self.customization = None;
        self.token = SelectionToken::fresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DifficultyLevel, MacroBreakdown, WeightGoal};
    use pretty_assertions::assert_eq;

    fn timeline(approach: Approach, target: f64) -> Timeline {
        Timeline {
            approach,
            target_weight_lbs: target,
            weight_change_lbs: -10.0,
            timeline_weeks: 10,
            weekly_rate_lbs: 1.0,
            weight_goal: WeightGoal::Lose,
            difficulty_level: DifficultyLevel::Conservative,
            estimated_end_date: None,
            focus_areas: vec![],
            expected_outcomes: vec![],
        }
    }

    fn customization(calories: f64) -> Customization {
        Customization {
            target_calories: calories,
            macros: MacroBreakdown {
                protein_g: 140.0,
                carbs_g: 180.0,
                fat_g: 60.0,
                protein_pct: None,
                carbs_pct: None,
                fat_pct: None,
            },
            micronutrient_targets: Default::default(),
            timeline_detail: None,
        }
    }

    fn selector_with_defaults() -> TimelineSelector {
        let mut selector = TimelineSelector::new();
        selector.set_available(vec![
            timeline(Approach::Conservative, 165.0),
            timeline(Approach::Moderate, 165.0),
            timeline(Approach::Aggressive, 165.0),
            timeline(Approach::Moderate, 170.0),
        ]);
        selector
    }

    #[test]
    fn test_filter_by_target() {
        let selector = selector_with_defaults();
        let at_165 = selector.filter_by_target(165.0);
        assert_eq!(at_165.len(), 3);
        let at_170 = selector.filter_by_target(170.0);
        assert_eq!(at_170.len(), 1);
        assert!(selector.filter_by_target(150.0).is_empty());
    }

    #[test]
    fn test_select_from_server() {
        let mut selector = selector_with_defaults();
        let (timeline, token) = selector
            .select_from_server(Approach::Moderate, 165.0)
            .unwrap();
        assert_eq!(timeline.approach, Approach::Moderate);
        assert_eq!(selector.selected().unwrap().target_weight_lbs, 165.0);
        assert_eq!(token, selector.token());
        assert_eq!(selector.customization(), None);
    }

    #[test]
    fn test_select_unknown_timeline() {
        let mut selector = selector_with_defaults();
        let result = selector.select_from_server(Approach::Aggressive, 170.0);
        assert!(matches!(result, Err(GoalError::UnknownTimeline { .. })));
        assert_eq!(selector.selected(), None);
    }

    #[test]
    fn test_duplicate_keys_keep_first() {
        let mut first = timeline(Approach::Moderate, 165.0);
        first.timeline_weeks = 8;
        let mut second = timeline(Approach::Moderate, 165.0);
        second.timeline_weeks = 12;

        let mut selector = TimelineSelector::new();
        selector.set_available(vec![first, second]);

        assert_eq!(selector.available().len(), 1);
        assert_eq!(selector.available()[0].timeline_weeks, 8);
    }

    #[test]
    fn test_stale_customization_discarded() {
        let mut selector = selector_with_defaults();

        // Select A and capture its token, then move on to B before A's
        // customization arrives.
        let (_, token_a) = selector
            .select_from_server(Approach::Conservative, 165.0)
            .unwrap();
        let (_, token_b) = selector
            .select_from_server(Approach::Aggressive, 165.0)
            .unwrap();

        let result = selector.apply_customization(token_a, customization(1800.0));
        assert!(matches!(result, Err(GoalError::StaleSelection)));
        assert_eq!(selector.customization(), None);
        assert_eq!(selector.selected().unwrap().approach, Approach::Aggressive);

        // B's own customization still lands
        selector
            .apply_customization(token_b, customization(2100.0))
            .unwrap();
        assert_eq!(selector.customization().unwrap().target_calories, 2100.0);
    }

    #[test]
    fn test_new_selection_clears_customization() {
        let mut selector = selector_with_defaults();
        let (_, token) = selector
            .select_from_server(Approach::Moderate, 165.0)
            .unwrap();
        selector
            .apply_customization(token, customization(2000.0))
            .unwrap();
        assert!(selector.customization().is_some());

        selector
            .select_from_server(Approach::Moderate, 170.0)
            .unwrap();
        assert_eq!(selector.customization(), None);
    }

    #[test]
    fn test_clear() {
        let mut selector = selector_with_defaults();
        let token = selector.select_custom(timeline(Approach::CustomPlan, 160.0));
        selector
            .apply_customization(token, customization(1900.0))
            .unwrap();

        selector.clear();
        assert!(selector.available().is_empty());
        assert_eq!(selector.selected(), None);
        assert_eq!(selector.customization(), None);
        // The old token no longer applies
        assert!(matches!(
            selector.apply_customization(token, customization(1900.0)),
            Err(GoalError::StaleSelection)
        ));
    }
}
