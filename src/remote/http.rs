//! Default HTTP implementation of the goal service
//!
//! Thin JSON client over the three endpoints. Carries a client-level timeout
//! so a hung endpoint surfaces as the corresponding remote error instead of
//! suspending the UI flow indefinitely.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::GoalError;
use crate::types::{Assessment, Customization};

use super::{AssessmentRequest, CustomizationRequest, GoalService, SaveTimelineRequest};

/// Default client-level timeout for remote calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// `GoalService` backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpGoalService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGoalService {
    /// Create a client for the given API base URL with the default timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// POST a JSON body and return the raw response, folding transport
    /// errors and non-success statuses into one message string
    async fn post_json<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, String> {
        let url = self.endpoint(path);
        debug!(url = url.as_str(), "posting goal request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(format!("{status}: {message}"));
        }
        Ok(response)
    }
}

#[async_trait]
impl GoalService for HttpGoalService {
    async fn fetch_assessment(
        &self,
        request: &AssessmentRequest,
    ) -> Result<Assessment, GoalError> {
        let response = self
            .post_json("goal-assessment", request)
            .await
            .map_err(GoalError::RemoteAssessmentFailed)?;
        response
            .json()
            .await
            .map_err(|e| GoalError::RemoteAssessmentFailed(e.to_string()))
    }

    async fn fetch_customization(
        &self,
        request: &CustomizationRequest,
    ) -> Result<Customization, GoalError> {
        let response = self
            .post_json("goal-customization", request)
            .await
            .map_err(GoalError::RemoteCustomizationFailed)?;
        response
            .json()
            .await
            .map_err(|e| GoalError::RemoteCustomizationFailed(e.to_string()))
    }

    async fn save_timeline(
        &self,
        user_id: &str,
        request: &SaveTimelineRequest,
    ) -> Result<(), GoalError> {
        // Any non-error payload acknowledges the save; the body is not read.
        self.post_json(&format!("goal/assessment/{user_id}"), request)
            .await
            .map_err(GoalError::RemoteSaveFailed)?;
        Ok(())
    }
}
