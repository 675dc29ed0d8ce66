//! Controller-specific error types.
//!
//! Spec problems and cluster failures are kept apart so the error policy can
//! treat them differently.

use cluster_client::ClusterError;
use gameserver_specs::SpecError;
use thiserror::Error;

/// Errors that can occur in the GameServer Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The GameServer spec cannot be turned into resources
    #[error("Configuration error: {0}")]
    Configuration(#[from] SpecError),

    /// A guarded write lost a race with another writer
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Kubernetes API error
    #[error("Cluster error: {0}")]
    Cluster(#[source] ClusterError),

    /// Invalid process configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}

impl From<ClusterError> for ControllerError {
    fn from(error: ClusterError) -> Self {
        match error {
            ClusterError::Conflict(message) => Self::Conflict(message),
            other => Self::Cluster(other),
        }
    }
}
