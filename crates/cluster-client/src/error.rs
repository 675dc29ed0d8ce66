//! Cluster client errors

use thiserror::Error;

/// Errors that can occur when talking to the Kubernetes API
#[derive(Debug, Error)]
pub enum ClusterError {
    /// The object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The write lost an optimistic concurrency race (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other API server or transport failure
    #[error("Kubernetes API error: {0}")]
    Api(#[source] kube::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The object is missing a field the request needs
    #[error("Missing field: {0}")]
    MissingField(&'static str),
}

impl From<kube::Error> for ClusterError {
    fn from(error: kube::Error) -> Self {
        match error {
            kube::Error::Api(response) if response.code == 404 => Self::NotFound(response.message),
            kube::Error::Api(response) if response.code == 409 => Self::Conflict(response.message),
            other => Self::Api(other),
        }
    }
}

impl ClusterError {
    /// True if the error means the object was not there.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
