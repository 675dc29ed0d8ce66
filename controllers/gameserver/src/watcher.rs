//! Kubernetes resource watchers.
//!
//! Drives reconciliation with `kube_runtime::Controller`: GameServers are the
//! primary resource, and changes to the StatefulSets and Services they own map
//! back to the owning GameServer.

use crate::config::Settings;
use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crds::GameServer;
use futures::StreamExt;
use k8s_openapi::api::{apps::v1::StatefulSet, core::v1::Service};
use kube::Api;
use kube_runtime::reflector::ObjectRef;
use kube_runtime::{Controller, controller::{Action, Config as ControllerConfig}, watcher};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Watches GameServers and the resources they own.
pub struct Watcher {
    reconciler: Arc<Reconciler>,
    gameserver_api: Api<GameServer>,
    stateful_set_api: Api<StatefulSet>,
    service_api: Api<Service>,
    controller_config: ControllerConfig,
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher").finish_non_exhaustive()
    }
}

async fn reconcile(gs: Arc<GameServer>, ctx: Arc<Reconciler>) -> Result<Action, ControllerError> {
    let object = ObjectRef::from_obj(gs.as_ref());
    debug!(gameserver = %object, "Reconciling GameServer");

    let action = ctx.reconcile(&object).await?;
    ctx.reset_backoff(&object);
    Ok(action)
}

fn error_policy(gs: Arc<GameServer>, error: &ControllerError, ctx: Arc<Reconciler>) -> Action {
    let object = ObjectRef::from_obj(gs.as_ref());
    let action = ctx.retry_after(&object, error);
    match error {
        ControllerError::Conflict(_) => {
            debug!(gameserver = %object, %error, "Status write conflicted, retrying");
        }
        _ => warn!(gameserver = %object, %error, ?action, "Reconciliation failed"),
    }
    action
}

impl Watcher {
    pub fn new(
        reconciler: Arc<Reconciler>,
        gameserver_api: Api<GameServer>,
        stateful_set_api: Api<StatefulSet>,
        service_api: Api<Service>,
        settings: &Settings,
    ) -> Self {
        let controller_config = ControllerConfig::default()
            .debounce(settings.debounce)
            .concurrency(settings.concurrency);
        Self {
            reconciler,
            gameserver_api,
            stateful_set_api,
            service_api,
            controller_config,
        }
    }

    /// Runs the GameServer controller until SIGINT/SIGTERM.
    pub async fn watch_gameservers(&self) -> Result<(), ControllerError> {
        info!("Starting GameServer watcher");

        Controller::new(self.gameserver_api.clone(), watcher::Config::default())
            .owns(self.stateful_set_api.clone(), watcher::Config::default())
            .owns(self.service_api.clone(), watcher::Config::default())
            .with_config(self.controller_config.clone())
            .shutdown_on_signal()
            .run(reconcile, error_policy, Arc::clone(&self.reconciler))
            .for_each(|res| async move {
                match res {
                    Ok((object, _)) => debug!(gameserver = %object, "Reconciled GameServer"),
                    Err(e) => error!("Controller error for GameServer: {}", e),
                }
            })
            .await;

        info!("GameServer watcher stopped");
        Ok(())
    }
}
