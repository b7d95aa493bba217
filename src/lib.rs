//! Goalpath - On-device goal and timeline customization engine
//!
//! Goalpath is the decision core of a weight-management client. It turns a
//! user's goal form into a self-consistent rate-of-change plan and keeps it
//! reconciled with the timelines the program's service offers:
//! validation → local estimation → remote customization → save → commit.
//!
//! ## Modules
//!
//! - **validator / estimator**: pure local derivation of a custom timeline
//! - **selector**: the single selected timeline and its customization pair
//! - **orchestrator / engine**: attempt sequencing, commit semantics, and
//!   the observable view for UI layers
//! - **remote / store**: the service endpoints and durable storage seams

pub mod engine;
pub mod error;
pub mod estimator;
pub mod orchestrator;
pub mod remote;
pub mod selector;
pub mod store;
pub mod types;
pub mod validator;

pub use engine::{GoalEngine, GoalView};
pub use error::{GoalError, ValidationError};
pub use estimator::{estimate, RatePolicy};
pub use orchestrator::{AttemptStage, CommittedPlan, GoalOrchestrator};
pub use remote::{GoalService, HttpGoalService};
pub use selector::{SelectionToken, TimelineSelector};
pub use store::{MemoryStore, SelectionStore};
pub use types::{
    Approach, Assessment, BiometricProfile, Customization, DifficultyLevel, Timeline, WeightGoal,
};
pub use validator::{validate, RawGoalFields, ValidatedGoalFields};

/// Engine version embedded in diagnostics
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
