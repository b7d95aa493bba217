//! Error types for Goalpath

use thiserror::Error;

/// Reasons a set of goal form fields can be rejected before any remote call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field {field} is not a number: {value}")]
    NotANumber { field: &'static str, value: String },

    #[error("Field {field} must be a positive weight: {value}")]
    NonPositiveWeight { field: &'static str, value: String },

    #[error("Unknown weight goal: {0}")]
    UnknownGoal(String),

    #[error("Goal '{goal}' contradicts the weight change from {current_lbs} to {target_lbs} lbs")]
    GoalWeightMismatch {
        goal: &'static str,
        current_lbs: f64,
        target_lbs: f64,
    },

    #[error("Timeline must be at least one week: {0}")]
    TimelineTooShort(String),
}

/// Errors that can occur while customizing or committing a goal plan
#[derive(Debug, Error)]
pub enum GoalError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Remote assessment failed: {0}")]
    RemoteAssessmentFailed(String),

    #[error("Remote customization failed: {0}")]
    RemoteCustomizationFailed(String),

    #[error("Saving the selected timeline failed: {0}")]
    RemoteSaveFailed(String),

    #[error("Durable storage failed: {0}")]
    Storage(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("No timeline found for approach '{approach}' at {target_lbs} lbs")]
    UnknownTimeline { approach: String, target_lbs: f64 },

    #[error("No assessment loaded for the current session")]
    MissingAssessment,

    #[error("No timeline is currently selected")]
    NoSelection,

    #[error("Selection changed while the request was in flight")]
    StaleSelection,
}

impl GoalError {
    /// Whether the user can recover by simply retrying the attempt
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GoalError::RemoteAssessmentFailed(_)
                | GoalError::RemoteCustomizationFailed(_)
                | GoalError::RemoteSaveFailed(_)
                | GoalError::Storage(_)
        )
    }
}
