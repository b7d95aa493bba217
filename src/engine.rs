//! Goal engine controller
//!
//! `GoalEngine` is the single owner of goal state for a session: the loaded
//! assessment, the timeline selector, and the orchestrator. UI layers drive
//! it through a small set of commands and observe it through a watch
//! channel, so the selected-timeline/customization pair is always read as
//! one consistent unit.
//!
//! Selection changes during an in-flight customization fetch are resolved
//! by token: the late response is discarded, never merged.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::debug;

use crate::error::GoalError;
use crate::estimator::RatePolicy;
use crate::orchestrator::{AttemptStage, CommittedPlan, GoalOrchestrator};
use crate::remote::{AssessmentRequest, CustomizationRequest, GoalService};
use crate::selector::TimelineSelector;
use crate::store::{SelectionStore, GOAL_ASSESSMENT_COMPLETE_KEY, SELECTED_TIMELINE_KEY};
use crate::types::{Approach, Assessment, BiometricProfile, Customization, Timeline};
use crate::validator::RawGoalFields;

/// Read-only snapshot of goal state for display layers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalView {
    pub selected: Option<Timeline>,
    /// Customization for `selected`, if it has arrived; `None` while a
    /// refresh is pending
    pub customization: Option<Customization>,
    pub stage: AttemptStage,
    pub assessment_complete: bool,
}

struct EngineState {
    selector: TimelineSelector,
    orchestrator: GoalOrchestrator,
    profile: Option<BiometricProfile>,
    assessment: Option<Assessment>,
    assessment_complete: bool,
}

/// Single controller for goal and timeline state
pub struct GoalEngine {
    service: Arc<dyn GoalService>,
    store: Arc<dyn SelectionStore>,
    state: Mutex<EngineState>,
    view_tx: watch::Sender<GoalView>,
}

impl GoalEngine {
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
        let orchestrator = GoalOrchestrator::with_policy(
            Arc::clone(&service),
            Arc::clone(&store),
            user_id,
            policy,
        );
        let (view_tx, _) = watch::channel(GoalView::default());
        Self {
            service,
            store,
            state: Mutex::new(EngineState {
                selector: TimelineSelector::new(),
                orchestrator,
                profile: None,
                assessment: None,
                assessment_complete: false,
            }),
            view_tx,
        }
    }

    /// Subscribe to view updates; the receiver always starts with the
    /// current view
    pub fn subscribe(&self) -> watch::Receiver<GoalView> {
        self.view_tx.subscribe()
    }

    /// Current view snapshot
    pub fn view(&self) -> GoalView {
        self.view_tx.borrow().clone()
    }

    /// Fetch a fresh assessment for the given profile and adopt its
    /// available timelines
    pub async fn load_assessment(
        &self,
        profile: BiometricProfile,
    ) -> Result<Assessment, GoalError> {
        let request = AssessmentRequest::new(&profile);
        let assessment = self.service.fetch_assessment(&request).await?;

        let mut state = self.state.lock().await;
        state
            .selector
            .set_available(assessment.available_timelines.clone());
        state.profile = Some(profile);
        state.assessment = Some(assessment.clone());
        self.publish(&state);
        Ok(assessment)
    }

    /// Server-offered timelines matching a target weight
    pub async fn timelines_for_target(&self, target_weight_lbs: f64) -> Vec<Timeline> {
        let state = self.state.lock().await;
        state
            .selector
            .filter_by_target(target_weight_lbs)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Select a server-offered timeline and refresh its customization.
    ///
    /// The selection is visible immediately (with the customization
    /// cleared); if the selection changes again before the refresh
    /// resolves, the late response is discarded.
    pub async fn select_timeline(
        &self,
        approach: Approach,
        target_weight_lbs: f64,
    ) -> Result<(), GoalError> {
        let (request, token) = {
            let mut state = self.state.lock().await;
            let profile = state.profile.clone().ok_or(GoalError::MissingAssessment)?;
            let (timeline, token) = state
                .selector
                .select_from_server(approach, target_weight_lbs)?;
            self.publish(&state);
            (CustomizationRequest::new(&profile, &timeline), token)
        };

        // The lock is released while the fetch is in flight so the UI can
        // change the selection; the token decides whose response lands.
        let customization = self.service.fetch_customization(&request).await?;

        let mut state = self.state.lock().await;
        match state.selector.apply_customization(token, customization) {
            Ok(()) => {
                self.publish(&state);
                Ok(())
            }
            Err(GoalError::StaleSelection) => {
                debug!("customization resolved after the selection moved on");
                Ok(())
            }
            Err(other) => Err(other),
        }
    }

    /// Save the currently selected timeline and commit it as the session's
    /// plan
    pub async fn confirm_selection(&self) -> Result<CommittedPlan, GoalError> {
        let mut state = self.state.lock().await;
        let profile = state.profile.clone().ok_or(GoalError::MissingAssessment)?;
        let assessment = state
            .assessment
            .clone()
            .ok_or(GoalError::MissingAssessment)?;
        let timeline = state
            .selector
            .selected()
            .cloned()
            .ok_or(GoalError::NoSelection)?;

        let state = &mut *state;
        let result = state
            .orchestrator
            .apply_server_timeline(&profile, &assessment, timeline, &mut state.selector)
            .await;
        if result.is_ok() {
            state.assessment_complete = true;
        }
        self.publish(state);
        result
    }

    /// Run a full custom-plan attempt from raw form fields
    pub async fn apply_custom_plan(
        &self,
        fields: &RawGoalFields,
    ) -> Result<CommittedPlan, GoalError> {
        let mut state = self.state.lock().await;
        let profile = state.profile.clone().ok_or(GoalError::MissingAssessment)?;
        let assessment = state
            .assessment
            .clone()
            .ok_or(GoalError::MissingAssessment)?;

        let state = &mut *state;
        let result = state
            .orchestrator
            .apply_custom_plan(&profile, &assessment, fields, &mut state.selector)
            .await;
        if result.is_ok() {
            state.assessment_complete = true;
        }
        self.publish(state);
        result
    }

    /// Restore a previously committed selection from durable storage, e.g.
    /// on app start. The customization is not restored; it belongs to a
    /// fresh fetch.
    pub async fn restore_selection(&self) -> Result<Option<Timeline>, GoalError> {
        let serialized = match self.store.get(SELECTED_TIMELINE_KEY).await? {
            Some(serialized) => serialized,
            None => return Ok(None),
        };
        let timeline: Timeline = serde_json::from_str(&serialized)?;
        let complete = self
            .store
            .get(GOAL_ASSESSMENT_COMPLETE_KEY)
            .await?
            .as_deref()
            == Some("true");

        let mut state = self.state.lock().await;
        state.selector.select_custom(timeline.clone());
        state.assessment_complete = complete;
        self.publish(&state);
        Ok(Some(timeline))
    }

    /// Drop all session state and durable selection keys, e.g. on logout
    pub async fn clear_session(&self) -> Result<(), GoalError> {
        self.store.remove(SELECTED_TIMELINE_KEY).await?;
        self.store.remove(GOAL_ASSESSMENT_COMPLETE_KEY).await?;

        let mut state = self.state.lock().await;
        state.selector.clear();
        state.profile = None;
        state.assessment = None;
        state.assessment_complete = false;
        self.publish(&state);
        Ok(())
    }

    fn publish(&self, state: &EngineState) {
        let view = GoalView {
            selected: state.selector.selected().cloned(),
            customization: state.selector.customization().cloned(),
            stage: state.orchestrator.stage(),
            assessment_complete: state.assessment_complete,
        };
        // Receivers may all be gone; that is fine for a fire-and-forget view.
        self.view_tx.send_replace(view);
    }
}
