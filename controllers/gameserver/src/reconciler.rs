//! Reconciliation logic for GameServer resources.
//!
//! One pass: fetch the GameServer, initialise its status on first sight,
//! build the desired resources, apply them, then report. Every pass is safe to
//! repeat; the API server is the only state.

use crate::backoff::ExponentialBackoff;
use crate::error::ControllerError;
use cluster_client::{ClusterClientTrait, ClusterError};
use crds::{Condition, GameServer, GameServerStatus};
use gameserver_specs::build_desired_state;
use kube::Resource;
use kube_runtime::controller::Action;
use kube_runtime::reflector::ObjectRef;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Follow-up after the workload was first created, to observe it settle
pub const CREATED_REQUEUE: Duration = Duration::from_secs(60);
/// Retry delay after losing an optimistic concurrency race
pub const CONFLICT_REQUEUE: Duration = Duration::from_secs(1);

/// Reconciles GameServer resources.
pub struct Reconciler {
    client: Arc<dyn ClusterClientTrait>,
    /// Backoff per GameServer (namespace/name -> backoff)
    backoff_states: Arc<Mutex<HashMap<String, ExponentialBackoff>>>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}

/// Key used for per-object bookkeeping.
pub fn resource_key(object: &ObjectRef<GameServer>) -> String {
    match object.namespace.as_deref() {
        Some(namespace) => format!("{namespace}/{}", object.name),
        None => object.name.clone(),
    }
}

impl Reconciler {
    pub fn new(client: Arc<dyn ClusterClientTrait>) -> Self {
        Self {
            client,
            backoff_states: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Runs one reconciliation pass for the GameServer identified by `object`.
    ///
    /// A GameServer that no longer exists is a successful no-op. Spec errors
    /// are reported on the status and not retried; cluster errors abort the
    /// pass and are returned to the caller.
    pub async fn reconcile(&self, object: &ObjectRef<GameServer>) -> Result<Action, ControllerError> {
        let name = object.name.as_str();
        let namespace = object
            .namespace
            .as_deref()
            .ok_or(ClusterError::MissingField("metadata.namespace"))?;

        let Some(mut gs) = self.client.get_gameserver(namespace, name).await? else {
            debug!(namespace, name, "GameServer not found, nothing to do");
            self.reset_backoff(object);
            return Ok(Action::await_change());
        };

        if !gs.has_conditions() {
            info!(namespace, name, "Initialising GameServer status");
            self.write_condition(&mut gs, Condition::reconciling()).await?;
            let Some(fresh) = self.client.get_gameserver(namespace, name).await? else {
                debug!(namespace, name, "GameServer deleted during reconciliation");
                self.reset_backoff(object);
                return Ok(Action::await_change());
            };
            gs = fresh;
        }

        let desired = match build_desired_state(&gs) {
            Ok(desired) => desired,
            Err(error) => {
                warn!(namespace, name, %error, "GameServer spec cannot be realized");
                self.write_condition(&mut gs, Condition::configuration_error(error.to_string()))
                    .await?;
                return Ok(Action::await_change());
            }
        };

        let owner = gs
            .controller_owner_ref(&())
            .ok_or(ClusterError::MissingField("metadata.uid"))?;
        let desired = desired.with_owner(&owner);

        let existed = self.client.get_stateful_set(namespace, name).await?.is_some();
        self.client.apply_stateful_set(&desired.stateful_set).await?;
        if let Some(service) = &desired.service {
            self.client.apply_service(service).await?;
        }

        // Availability follows the stored condition, not `existed`
        let reported = self
            .write_condition(&mut gs, Condition::deployment_created(name))
            .await?;
        if reported {
            info!(namespace, name, "GameServer workload is available");
        }

        if existed {
            debug!(namespace, name, "GameServer is up to date");
            return Ok(Action::await_change());
        }

        info!(namespace, name, "Created StatefulSet for GameServer");
        Ok(Action::requeue(CREATED_REQUEUE))
    }

    /// Sets `condition` on the status and persists it, guarded by the
    /// resource version `gs` was read at. Skips the write if nothing changed.
    /// Returns whether a write happened.
    async fn write_condition(
        &self,
        gs: &mut GameServer,
        condition: Condition,
    ) -> Result<bool, ControllerError> {
        let condition = condition.with_observed_generation(gs.metadata.generation);
        let changed = gs
            .status
            .get_or_insert_with(GameServerStatus::default)
            .set_condition(condition);
        if !changed {
            return Ok(false);
        }

        *gs = self.client.update_gameserver_status(gs).await?;
        Ok(true)
    }

    /// Delay before retrying a failed GameServer.
    ///
    /// Conflicts retry quickly; everything else backs off per object.
    pub fn retry_after(&self, object: &ObjectRef<GameServer>, error: &ControllerError) -> Action {
        match error {
            ControllerError::Conflict(_) => Action::requeue(CONFLICT_REQUEUE),
            ControllerError::Configuration(_) => Action::await_change(),
            _ => Action::requeue(self.next_backoff(&resource_key(object))),
        }
    }

    fn next_backoff(&self, key: &str) -> Duration {
        match self.backoff_states.lock() {
            Ok(mut states) => states.entry(key.to_string()).or_default().next_backoff(),
            Err(e) => {
                warn!("Failed to lock backoff_states: {}, using default backoff", e);
                ExponentialBackoff::default().next_backoff()
            }
        }
    }

    /// Forget the failure history of a GameServer after a successful pass or
    /// once it is gone.
    pub fn reset_backoff(&self, object: &ObjectRef<GameServer>) {
        if let Ok(mut states) = self.backoff_states.lock() {
            states.remove(&resource_key(object));
        }
    }
}
