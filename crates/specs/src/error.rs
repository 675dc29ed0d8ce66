//! Errors raised while computing desired state.
//!
//! Every variant is a configuration problem in the GameServer spec: re-running
//! the builder on the same input yields the same error.

use thiserror::Error;

/// Errors that prevent a GameServer spec from being turned into resources.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// The GameServer has no `metadata.name`
    #[error("GameServer is missing metadata.name")]
    MissingName,

    /// No image can be resolved for the manager
    #[error("spec.gameName is required to resolve the {manager} image")]
    MissingGameName {
        /// Manager the image was being resolved for
        manager: &'static str,
    },

    /// `spec.storage.size` is not a valid quantity
    #[error("invalid storage size {0:?}: expected a quantity such as \"10Gi\"")]
    InvalidStorageSize(String),

    /// A resource request or limit is not a valid quantity
    #[error("invalid quantity {value:?} for resource {resource:?}")]
    InvalidQuantity {
        /// Resource name, e.g. "memory"
        resource: String,
        /// Offending value
        value: String,
    },
}
