//! Cluster client over `kube::Api`
//!
//! Children are written with server-side apply under the controller's field
//! manager; status goes through the status subresource as a merge patch.

use crate::cluster_trait::ClusterClientTrait;
use crate::error::ClusterError;
use crds::GameServer;
use gameserver_specs::CONTROLLER_NAME;
use k8s_openapi::api::{apps::v1::StatefulSet, core::v1::Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client};
use serde_json::json;
use tracing::debug;

/// Cluster client backed by a live API server
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    /// Create a new cluster client from a kube client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn apply_params() -> PatchParams {
        PatchParams::apply(CONTROLLER_NAME).force()
    }
}

/// Namespace and name of an object about to be written.
fn object_key(meta: &ObjectMeta) -> Result<(&str, &str), ClusterError> {
    let namespace = meta
        .namespace
        .as_deref()
        .ok_or(ClusterError::MissingField("metadata.namespace"))?;
    let name = meta
        .name
        .as_deref()
        .ok_or(ClusterError::MissingField("metadata.name"))?;
    Ok((namespace, name))
}

#[async_trait::async_trait]
impl ClusterClientTrait for KubeClusterClient {
    async fn get_gameserver(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<GameServer>, ClusterError> {
        let api: Api<GameServer> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get_opt(name).await?)
    }

    async fn update_gameserver_status(&self, gs: &GameServer) -> Result<GameServer, ClusterError> {
        let (namespace, name) = object_key(&gs.metadata)?;
        let resource_version = gs
            .metadata
            .resource_version
            .as_deref()
            .ok_or(ClusterError::MissingField("metadata.resourceVersion"))?;

        // resourceVersion in a merge patch is a precondition: stale writes get 409
        let status = serde_json::to_value(&gs.status)?;
        let status_patch = json!({
            "metadata": { "resourceVersion": resource_version },
            "status": status,
        });

        debug!(namespace, name, resource_version, "Patching GameServer status");
        let api: Api<GameServer> = Api::namespaced(self.client.clone(), namespace);
        let updated = api
            .patch_status(name, &PatchParams::default(), &Patch::Merge(&status_patch))
            .await?;
        Ok(updated)
    }

    async fn get_stateful_set(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<StatefulSet>, ClusterError> {
        let api: Api<StatefulSet> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get_opt(name).await?)
    }

    async fn apply_stateful_set(&self, sts: &StatefulSet) -> Result<StatefulSet, ClusterError> {
        let (namespace, name) = object_key(&sts.metadata)?;
        debug!(namespace, name, "Applying StatefulSet");
        let api: Api<StatefulSet> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.patch(name, &Self::apply_params(), &Patch::Apply(sts)).await?)
    }

    async fn apply_service(&self, svc: &Service) -> Result<Service, ClusterError> {
        let (namespace, name) = object_key(&svc.metadata)?;
        debug!(namespace, name, "Applying Service");
        let api: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.patch(name, &Self::apply_params(), &Patch::Apply(svc)).await?)
    }
}
