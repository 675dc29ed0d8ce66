//! Main controller implementation.
//!
//! Wires the Kubernetes client, the reconciler and the watcher together for
//! the GameServer Controller.

use crate::config::Settings;
use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crate::watcher::Watcher;
use cluster_client::{ClusterError, KubeClusterClient};
use crds::GameServer;
use k8s_openapi::api::{apps::v1::StatefulSet, core::v1::Service};
use kube::{Api, Client};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Main controller for GameServer resources.
#[derive(Debug)]
pub struct Controller {
    gameserver_watcher: JoinHandle<Result<(), ControllerError>>,
}

/// Api scoped to the watched namespace, or cluster-wide.
fn scoped_api<K>(client: &Client, namespace: Option<&str>) -> Api<K>
where
    K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
    K::DynamicType: Default,
{
    match namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    }
}

impl Controller {
    /// Creates a new controller instance and starts watching.
    pub async fn new(settings: &Settings) -> Result<Self, ControllerError> {
        info!("Initializing GameServer Controller");

        let kube_client = Client::try_default()
            .await
            .map_err(ClusterError::from)?;

        let namespace = settings.namespace.as_deref();
        let gameserver_api: Api<GameServer> = scoped_api(&kube_client, namespace);
        let stateful_set_api: Api<StatefulSet> = scoped_api(&kube_client, namespace);
        let service_api: Api<Service> = scoped_api(&kube_client, namespace);

        let cluster_client = Arc::new(KubeClusterClient::new(kube_client));
        let reconciler = Arc::new(Reconciler::new(cluster_client));

        let watcher = Watcher::new(
            reconciler,
            gameserver_api,
            stateful_set_api,
            service_api,
            settings,
        );
        let gameserver_watcher = tokio::spawn(async move { watcher.watch_gameservers().await });

        Ok(Self { gameserver_watcher })
    }

    /// Runs until the watcher stops.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("GameServer Controller running");

        self.gameserver_watcher
            .await
            .map_err(|e| ControllerError::Watch(format!("GameServer watcher panicked: {e}")))?
            .map_err(|e| ControllerError::Watch(format!("GameServer watcher error: {e}")))
    }
}
