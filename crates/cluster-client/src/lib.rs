//! GameServer cluster client
//!
//! The Kubernetes API surface the GameServer controller consumes, behind
//! [`ClusterClientTrait`] so reconciliation can be unit tested against
//! [`MockClusterClient`] (feature `test-util`).
//!
//! Lookups return `Ok(None)` for objects that do not exist. HTTP 409 maps to
//! [`ClusterError::Conflict`].

pub mod client;
pub mod error;
#[path = "trait.rs"]
pub mod cluster_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::KubeClusterClient;
pub use cluster_trait::ClusterClientTrait;
pub use error::ClusterError;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockClusterClient;
