//! Durable selection storage
//!
//! The engine persists the committed timeline and a completion flag through
//! a small key-value seam; on a device this is backed by secure storage, in
//! tests by the in-memory implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::GoalError;

/// Key for the serialized selected timeline
pub const SELECTED_TIMELINE_KEY: &str = "selected_timeline";

/// Key for the goal-assessment completion flag
pub const GOAL_ASSESSMENT_COMPLETE_KEY: &str = "goal_assessment_complete";

/// Durable key-value store for committed selection state.
///
/// Writes happen only after a successful commit; there are no optimistic
/// writes mid-attempt.
#[async_trait]
pub trait SelectionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, GoalError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), GoalError>;
    async fn remove(&self, key: &str) -> Result<(), GoalError>;
}

/// In-memory store used by tests and as a default backing
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SelectionStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, GoalError> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), GoalError> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), GoalError> {
        self.values.lock().await.remove(key);
        Ok(())
    }
}
