//! ClusterClient trait for mocking
//!
//! The controller only sees this trait. `KubeClusterClient` implements it over
//! `kube::Api`; tests use the in-memory `MockClusterClient`.

use crate::error::ClusterError;
use crds::GameServer;
use k8s_openapi::api::{apps::v1::StatefulSet, core::v1::Service};

/// Kubernetes operations the GameServer controller needs
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait ClusterClientTrait: Send + Sync {
    /// Fetch a GameServer, `None` if it does not exist
    async fn get_gameserver(&self, namespace: &str, name: &str)
        -> Result<Option<GameServer>, ClusterError>;

    /// Write `gs.status` back, guarded by `gs.metadata.resourceVersion`
    ///
    /// Returns the object as stored after the write. A stale resource version
    /// yields `ClusterError::Conflict`.
    async fn update_gameserver_status(&self, gs: &GameServer) -> Result<GameServer, ClusterError>;

    /// Fetch a StatefulSet, `None` if it does not exist
    async fn get_stateful_set(&self, namespace: &str, name: &str)
        -> Result<Option<StatefulSet>, ClusterError>;

    /// Server-side apply a StatefulSet with forced field ownership
    async fn apply_stateful_set(&self, sts: &StatefulSet) -> Result<StatefulSet, ClusterError>;

    /// Server-side apply a Service with forced field ownership
    async fn apply_service(&self, svc: &Service) -> Result<Service, ClusterError>;
}
