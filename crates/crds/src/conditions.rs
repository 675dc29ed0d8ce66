//! Status conditions
//!
//! Typed status records following the Kubernetes condition conventions.
//! The condition `type` is the key of the set: at most one condition per type.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Condition type reporting whether the game server workload is available.
pub const CONDITION_AVAILABLE: &str = "Available";

/// The controller has started reconciling a new GameServer.
pub const REASON_RECONCILING: &str = "Reconciling";
/// The workload for the GameServer was created.
pub const REASON_DEPLOYMENT_CREATED: &str = "DeploymentCreated";
/// The GameServer spec cannot be turned into resources.
pub const REASON_CONFIGURATION_ERROR: &str = "ConfigurationError";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

/// One observation about an aspect of a resource.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Condition type, unique within the set (e.g. "Available")
    #[serde(rename = "type")]
    pub type_: String,

    /// True, False or Unknown
    pub status: ConditionStatus,

    /// Machine-readable CamelCase reason for the last transition
    pub reason: String,

    /// Human-readable details
    #[serde(default)]
    pub message: String,

    /// Last time the status of this condition changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,

    /// Generation of the resource this condition was computed from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

impl Condition {
    pub fn new(
        type_: impl Into<String>,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            type_: type_.into(),
            status,
            reason: reason.into(),
            message: message.into(),
            last_transition_time: None,
            observed_generation: None,
        }
    }

    /// Records the generation the condition was computed from.
    #[must_use]
    pub fn with_observed_generation(mut self, generation: Option<i64>) -> Self {
        self.observed_generation = generation;
        self
    }

    /// `Available=Unknown`, set when a GameServer is first picked up.
    pub fn reconciling() -> Self {
        Self::new(
            CONDITION_AVAILABLE,
            ConditionStatus::Unknown,
            REASON_RECONCILING,
            "Starting reconciliation",
        )
    }

    /// `Available=True`, set once the workload has been created.
    pub fn deployment_created(name: &str) -> Self {
        Self::new(
            CONDITION_AVAILABLE,
            ConditionStatus::True,
            REASON_DEPLOYMENT_CREATED,
            format!("StatefulSet {name} created"),
        )
    }

    /// `Available=False`, set when the spec cannot be realized.
    pub fn configuration_error(message: impl Into<String>) -> Self {
        Self::new(
            CONDITION_AVAILABLE,
            ConditionStatus::False,
            REASON_CONFIGURATION_ERROR,
            message,
        )
    }
}

/// Inserts or replaces the condition with the same type.
///
/// An existing condition keeps its position in the list. `last_transition_time`
/// only moves when the status value changes; otherwise the previous timestamp
/// is kept. Returns `true` if the stored set changed.
pub fn set_condition(conditions: &mut Vec<Condition>, mut condition: Condition) -> bool {
    let Some(existing) = conditions.iter_mut().find(|c| c.type_ == condition.type_) else {
        condition.last_transition_time.get_or_insert_with(Utc::now);
        conditions.push(condition);
        return true;
    };

    if existing.status == condition.status {
        condition.last_transition_time = existing.last_transition_time;
    } else {
        condition.last_transition_time.get_or_insert_with(Utc::now);
    }

    if *existing == condition {
        return false;
    }
    *existing = condition;
    true
}
