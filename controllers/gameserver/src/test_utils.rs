//! Test utilities for unit testing the reconciler
//!
//! Helpers for building GameServers and wiring a reconciler to the mock cluster.

#[cfg(test)]
use crate::reconciler::Reconciler;
#[cfg(test)]
use cluster_client::MockClusterClient;
#[cfg(test)]
use crds::{GameServer, GameServerSpec};
#[cfg(test)]
use kube_runtime::reflector::ObjectRef;
#[cfg(test)]
use std::sync::Arc;

/// Namespace every test GameServer lives in
#[cfg(test)]
pub const TEST_NAMESPACE: &str = "games";

/// Helper to create a test GameServer for `game_name`
#[cfg(test)]
pub fn create_test_gameserver(name: &str, game_name: &str) -> GameServer {
    let mut gs = GameServer::new(
        name,
        GameServerSpec {
            game_name: game_name.to_string(),
            ..Default::default()
        },
    );
    gs.metadata.namespace = Some(TEST_NAMESPACE.to_string());
    gs.metadata.generation = Some(1);
    gs
}

/// Reference to a GameServer in the test namespace
#[cfg(test)]
pub fn object_ref(name: &str) -> ObjectRef<GameServer> {
    ObjectRef::new(name).within(TEST_NAMESPACE)
}

/// Helper to create a reconciler backed by a mock cluster holding `gameservers`
#[cfg(test)]
pub fn create_test_reconciler(gameservers: Vec<GameServer>) -> (Reconciler, MockClusterClient) {
    let cluster = MockClusterClient::new();
    for gs in gameservers {
        cluster.add_gameserver(gs);
    }
    (Reconciler::new(Arc::new(cluster.clone())), cluster)
}
