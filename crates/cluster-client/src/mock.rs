//! Mock ClusterClient for unit testing
//!
//! Keeps objects in memory and mimics the API server closely enough for the
//! controller: resource versions move on every write, stale status writes
//! conflict, and applies replace the stored object.

use crate::cluster_trait::ClusterClientTrait;
use crate::error::ClusterError;
use crds::{GameServer, GameServerStatus};
use k8s_openapi::api::{apps::v1::StatefulSet, core::v1::Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type ObjectKey = (String, String);

/// Mock ClusterClient for testing
#[derive(Clone, Default)]
pub struct MockClusterClient {
    // In-memory storage keyed by (namespace, name)
    gameservers: Arc<Mutex<HashMap<ObjectKey, GameServer>>>,
    stateful_sets: Arc<Mutex<HashMap<ObjectKey, StatefulSet>>>,
    services: Arc<Mutex<HashMap<ObjectKey, Service>>>,
    // Every status successfully written, in order
    status_updates: Arc<Mutex<Vec<GameServerStatus>>>,
    stateful_set_applies: Arc<Mutex<usize>>,
    service_applies: Arc<Mutex<usize>>,
    // Failure injection
    pending_status_conflicts: Arc<Mutex<u32>>,
    fail_applies: Arc<Mutex<bool>>,
    fail_service_applies: Arc<Mutex<bool>>,
    resource_version: Arc<Mutex<u64>>,
}

impl std::fmt::Debug for MockClusterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockClusterClient").finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn key_of(meta: &ObjectMeta) -> Result<ObjectKey, ClusterError> {
    let namespace = meta
        .namespace
        .clone()
        .ok_or(ClusterError::MissingField("metadata.namespace"))?;
    let name = meta
        .name
        .clone()
        .ok_or(ClusterError::MissingField("metadata.name"))?;
    Ok((namespace, name))
}

fn key(namespace: &str, name: &str) -> ObjectKey {
    (namespace.to_string(), name.to_string())
}

impl MockClusterClient {
    /// Create an empty mock cluster
    pub fn new() -> Self {
        Self::default()
    }

    fn next_resource_version(&self) -> String {
        let mut version = lock(&self.resource_version);
        *version += 1;
        version.to_string()
    }

    /// Add a GameServer to the mock store (for test setup)
    ///
    /// A uid and resource version are assigned unless already set.
    pub fn add_gameserver(&self, mut gs: GameServer) {
        if gs.metadata.resource_version.is_none() {
            gs.metadata.resource_version = Some(self.next_resource_version());
        }
        if gs.metadata.uid.is_none() {
            let name = gs.metadata.name.clone().unwrap_or_default();
            gs.metadata.uid = Some(format!("uid-{name}"));
        }
        if let Ok(key) = key_of(&gs.metadata) {
            lock(&self.gameservers).insert(key, gs);
        }
    }

    /// Add a StatefulSet to the mock store (for test setup)
    pub fn add_stateful_set(&self, sts: StatefulSet) {
        if let Ok(key) = key_of(&sts.metadata) {
            lock(&self.stateful_sets).insert(key, sts);
        }
    }

    /// Stored GameServer, if any
    pub fn gameserver(&self, namespace: &str, name: &str) -> Option<GameServer> {
        lock(&self.gameservers).get(&key(namespace, name)).cloned()
    }

    /// Stored StatefulSet, if any
    pub fn stateful_set(&self, namespace: &str, name: &str) -> Option<StatefulSet> {
        lock(&self.stateful_sets).get(&key(namespace, name)).cloned()
    }

    /// Stored Service, if any
    pub fn service(&self, namespace: &str, name: &str) -> Option<Service> {
        lock(&self.services).get(&key(namespace, name)).cloned()
    }

    /// Statuses written so far, oldest first
    pub fn status_updates(&self) -> Vec<GameServerStatus> {
        lock(&self.status_updates).clone()
    }

    /// Number of StatefulSet applies
    pub fn stateful_set_applies(&self) -> usize {
        *lock(&self.stateful_set_applies)
    }

    /// Number of Service applies
    pub fn service_applies(&self) -> usize {
        *lock(&self.service_applies)
    }

    /// Reject the next `count` status writes with a conflict
    pub fn inject_status_conflicts(&self, count: u32) {
        *lock(&self.pending_status_conflicts) = count;
    }

    /// Make every apply fail as if the namespace did not exist
    pub fn fail_applies(&self, fail: bool) {
        *lock(&self.fail_applies) = fail;
    }

    /// Make Service applies fail while StatefulSet applies go through
    pub fn fail_service_applies(&self, fail: bool) {
        *lock(&self.fail_service_applies) = fail;
    }

    /// Simulate an external writer bumping the stored object's resource version
    pub fn touch_gameserver(&self, namespace: &str, name: &str) {
        let version = self.next_resource_version();
        if let Some(gs) = lock(&self.gameservers).get_mut(&key(namespace, name)) {
            gs.metadata.resource_version = Some(version);
        }
    }

    fn check_apply(&self, namespace: &str) -> Result<(), ClusterError> {
        if *lock(&self.fail_applies) {
            return Err(ClusterError::NotFound(format!(
                "namespaces \"{namespace}\" not found"
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ClusterClientTrait for MockClusterClient {
    async fn get_gameserver(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<GameServer>, ClusterError> {
        Ok(self.gameserver(namespace, name))
    }

    async fn update_gameserver_status(&self, gs: &GameServer) -> Result<GameServer, ClusterError> {
        let key = key_of(&gs.metadata)?;
        let requested_version = gs
            .metadata
            .resource_version
            .clone()
            .ok_or(ClusterError::MissingField("metadata.resourceVersion"))?;

        {
            let mut pending = lock(&self.pending_status_conflicts);
            if *pending > 0 {
                *pending -= 1;
                return Err(ClusterError::Conflict(format!(
                    "the object {} has been modified",
                    key.1
                )));
            }
        }

        let version = self.next_resource_version();
        let mut gameservers = lock(&self.gameservers);
        let stored = gameservers
            .get_mut(&key)
            .ok_or_else(|| ClusterError::NotFound(format!("gameservers \"{}\" not found", key.1)))?;

        if stored.metadata.resource_version.as_deref() != Some(requested_version.as_str()) {
            return Err(ClusterError::Conflict(format!(
                "the object {} has been modified",
                key.1
            )));
        }

        stored.status.clone_from(&gs.status);
        stored.metadata.resource_version = Some(version);
        lock(&self.status_updates).push(stored.status.clone().unwrap_or_default());
        Ok(stored.clone())
    }

    async fn get_stateful_set(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<StatefulSet>, ClusterError> {
        Ok(self.stateful_set(namespace, name))
    }

    async fn apply_stateful_set(&self, sts: &StatefulSet) -> Result<StatefulSet, ClusterError> {
        let key = key_of(&sts.metadata)?;
        self.check_apply(&key.0)?;

        let mut applied = sts.clone();
        applied.metadata.resource_version = Some(self.next_resource_version());
        lock(&self.stateful_sets).insert(key, applied.clone());
        *lock(&self.stateful_set_applies) += 1;
        Ok(applied)
    }

    async fn apply_service(&self, svc: &Service) -> Result<Service, ClusterError> {
        let key = key_of(&svc.metadata)?;
        self.check_apply(&key.0)?;
        if *lock(&self.fail_service_applies) {
            return Err(ClusterError::NotFound(format!(
                "services \"{}\" could not be applied",
                key.1
            )));
        }

        let mut applied = svc.clone();
        applied.metadata.resource_version = Some(self.next_resource_version());
        lock(&self.services).insert(key, applied.clone());
        *lock(&self.service_applies) += 1;
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crds::{Condition, GameServerSpec};

    fn game_server() -> GameServer {
        let mut gs = GameServer::new(
            "valheim-1",
            GameServerSpec {
                game_name: "valheim".to_string(),
                ..Default::default()
            },
        );
        gs.metadata.namespace = Some("games".to_string());
        gs
    }

    #[tokio::test]
    async fn test_status_update_bumps_resource_version() {
        let client = MockClusterClient::new();
        client.add_gameserver(game_server());

        let mut gs = client.get_gameserver("games", "valheim-1").await.unwrap().unwrap();
        let before = gs.metadata.resource_version.clone();
        gs.status
            .get_or_insert_with(GameServerStatus::default)
            .set_condition(Condition::reconciling());

        let updated = client.update_gameserver_status(&gs).await.unwrap();

        assert_ne!(updated.metadata.resource_version, before);
        assert!(updated.has_conditions());
        assert_eq!(client.status_updates().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_status_update_conflicts() {
        let client = MockClusterClient::new();
        client.add_gameserver(game_server());

        let gs = client.get_gameserver("games", "valheim-1").await.unwrap().unwrap();
        client.touch_gameserver("games", "valheim-1");

        let result = client.update_gameserver_status(&gs).await;
        assert!(matches!(result, Err(ClusterError::Conflict(_))));
        assert!(client.status_updates().is_empty());
    }

    #[tokio::test]
    async fn test_service_only_apply_failure() {
        let client = MockClusterClient::new();
        client.fail_service_applies(true);

        let mut sts = StatefulSet::default();
        sts.metadata.namespace = Some("games".to_string());
        sts.metadata.name = Some("valheim-1".to_string());
        let mut svc = Service::default();
        svc.metadata = sts.metadata.clone();

        assert!(client.apply_stateful_set(&sts).await.is_ok());
        assert!(client.apply_service(&svc).await.is_err());
        assert_eq!(client.stateful_set_applies(), 1);
        assert_eq!(client.service_applies(), 0);

        client.fail_service_applies(false);
        assert!(client.apply_service(&svc).await.is_ok());
        assert!(client.service("games", "valheim-1").is_some());
    }

    #[tokio::test]
    async fn test_missing_objects_are_none() {
        let client = MockClusterClient::new();

        assert!(client.get_gameserver("games", "nope").await.unwrap().is_none());
        assert!(client.get_stateful_set("games", "nope").await.unwrap().is_none());
    }
}
