//! Customization orchestration
//!
//! This module sequences one goal-customization attempt end to end:
//! validate the form, estimate the candidate timeline, fetch its
//! customization, save the timeline remotely, then commit the selection and
//! persist it. Every attempt walks an explicit stage machine; a failure at
//! any stage leaves previously committed state untouched, and nothing is
//! written to durable storage before the remote save succeeds.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{GoalError, ValidationError};
use crate::estimator::{estimate, RatePolicy};
use crate::remote::{CustomizationRequest, GoalService, SaveTimelineRequest};
use crate::selector::TimelineSelector;
use crate::store::{SelectionStore, GOAL_ASSESSMENT_COMPLETE_KEY, SELECTED_TIMELINE_KEY};
use crate::types::{Assessment, BiometricProfile, Customization, Timeline};
use crate::validator::{validate, RawGoalFields};

/// Stage of the current (or most recent) customization attempt.
///
/// `Committed` and `Failed` are terminal for an attempt; a new attempt
/// always restarts from `Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttemptStage {
    #[default]
    Idle,
    Validating,
    Estimating,
    FetchingCustomization,
    Saving,
    Committed,
    Failed,
}

impl AttemptStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStage::Idle => "idle",
            AttemptStage::Validating => "validating",
            AttemptStage::Estimating => "estimating",
            AttemptStage::FetchingCustomization => "fetching_customization",
            AttemptStage::Saving => "saving",
            AttemptStage::Committed => "committed",
            AttemptStage::Failed => "failed",
        }
    }
}

/// Result of a committed attempt: the timeline that is now selected and the
/// customization fetched for it
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedPlan {
    pub timeline: Timeline,
    pub customization: Customization,
}

/// Sequences customization attempts against the remote service and the
/// durable store
pub struct GoalOrchestrator {
    service: Arc<dyn GoalService>,
    store: Arc<dyn SelectionStore>,
    policy: RatePolicy,
    user_id: String,
    stage: AttemptStage,
}

impl GoalOrchestrator {
    pub fn new(
        service: Arc<dyn GoalService>,
        store: Arc<dyn SelectionStore>,
        user_id: impl Into<String>,
    ) -> Self {
        Self::with_policy(service, store, user_id, RatePolicy::default())
    }

    pub fn with_policy(
        service: Arc<dyn GoalService>,
        store: Arc<dyn SelectionStore>,
        user_id: impl Into<String>,
        policy: RatePolicy,
    ) -> Self {
        Self {
            service,
            store,
            policy,
            user_id: user_id.into(),
            stage: AttemptStage::Idle,
        }
    }

    /// Stage reached by the current or most recent attempt
    pub fn stage(&self) -> AttemptStage {
        self.stage
    }

    pub fn policy(&self) -> &RatePolicy {
        &self.policy
    }

    /// Run a full custom-plan attempt from raw form fields.
    ///
    /// Validation failures return before any remote call. A remote failure
    /// at either network step discards everything fetched so far: the
    /// selector and durable storage keep their previous state.
    pub async fn apply_custom_plan(
        &mut self,
        profile: &BiometricProfile,
        assessment: &Assessment,
        fields: &RawGoalFields,
        selector: &mut TimelineSelector,
    ) -> Result<CommittedPlan, GoalError> {
        self.advance(AttemptStage::Idle);
        let result = self
            .run_custom_plan(profile, assessment, fields, selector)
            .await;
        if result.is_err() {
            self.advance(AttemptStage::Failed);
        }
        result
    }

    /// Run a customization/save attempt for a server-offered timeline.
    ///
    /// The timeline must satisfy the sign-consistency invariant; one that
    /// contradicts its goal is rejected before submission.
    pub async fn apply_server_timeline(
        &mut self,
        profile: &BiometricProfile,
        assessment: &Assessment,
        timeline: Timeline,
        selector: &mut TimelineSelector,
    ) -> Result<CommittedPlan, GoalError> {
        self.advance(AttemptStage::Idle);
        let result = self
            .run_server_timeline(profile, assessment, timeline, selector)
            .await;
        if result.is_err() {
            self.advance(AttemptStage::Failed);
        }
        result
    }

    async fn run_custom_plan(
        &mut self,
        profile: &BiometricProfile,
        assessment: &Assessment,
        fields: &RawGoalFields,
        selector: &mut TimelineSelector,
    ) -> Result<CommittedPlan, GoalError> {
        self.advance(AttemptStage::Validating);
        let validated = validate(fields)?;

        self.advance(AttemptStage::Estimating);
        let timeline = estimate(&validated, &self.policy);

        self.customize_and_commit(profile, assessment, timeline, selector)
            .await
    }

    async fn run_server_timeline(
        &mut self,
        profile: &BiometricProfile,
        assessment: &Assessment,
        timeline: Timeline,
        selector: &mut TimelineSelector,
    ) -> Result<CommittedPlan, GoalError> {
        self.advance(AttemptStage::Validating);
        if !timeline.is_sign_consistent() {
            return Err(ValidationError::GoalWeightMismatch {
                goal: timeline.weight_goal.as_str(),
                current_lbs: profile.current_weight_lbs,
                target_lbs: timeline.target_weight_lbs,
            }
            .into());
        }

        self.customize_and_commit(profile, assessment, timeline, selector)
            .await
    }

    /// Shared tail: fetch the customization, save the timeline, then commit
    async fn customize_and_commit(
        &mut self,
        profile: &BiometricProfile,
        assessment: &Assessment,
        timeline: Timeline,
        selector: &mut TimelineSelector,
    ) -> Result<CommittedPlan, GoalError> {
        self.advance(AttemptStage::FetchingCustomization);
        let request = CustomizationRequest::new(profile, &timeline);
        let customization = self.service.fetch_customization(&request).await?;

        // TDEE/BMR come from the last assessment; the client never
        // recomputes them.
        self.advance(AttemptStage::Saving);
        let save_request = SaveTimelineRequest {
            timeline: timeline.clone(),
            tdee: assessment.tdee,
            bmr: assessment.bmr,
            current_weight_lbs: profile.current_weight_lbs,
            target_calories: Some(customization.target_calories),
        };
        self.service
            .save_timeline(&self.user_id, &save_request)
            .await?;

        let token = selector.select_custom(timeline.clone());
        selector.apply_customization(token, customization.clone())?;

        // Durable writes follow the in-memory commit. The timeline key must
        // never outlive a failed flag write: a restart would restore a plan
        // that was never fully committed.
        self.store
            .set(SELECTED_TIMELINE_KEY, &serde_json::to_string(&timeline)?)
            .await?;
        if let Err(e) = self.store.set(GOAL_ASSESSMENT_COMPLETE_KEY, "true").await {
            let _ = self.store.remove(SELECTED_TIMELINE_KEY).await;
            return Err(e);
        }

        self.advance(AttemptStage::Committed);
        info!(
            approach = timeline.approach.as_str(),
            target_lbs = timeline.target_weight_lbs,
            weeks = timeline.timeline_weeks,
            "goal timeline committed"
        );

        Ok(CommittedPlan {
            timeline,
            customization,
        })
    }

    fn advance(&mut self, stage: AttemptStage) {
        debug!(stage = stage.as_str(), "attempt stage");
        self.stage = stage;
    }
}
