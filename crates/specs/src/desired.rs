//! The full set of resources one GameServer reconciles to.

use crds::GameServer;
use k8s_openapi::{
    api::{apps::v1::StatefulSet, core::v1::{PersistentVolumeClaim, Service}},
    apimachinery::pkg::apis::meta::v1::OwnerReference,
};

use crate::{error::SpecError, manager::ManagerExt, service::build_service};

/// Desired resources for a GameServer, rebuilt on every reconcile.
///
/// The storage claim is not a separate object: it lives in the StatefulSet's
/// `volumeClaimTemplates` and the StatefulSet controller materializes it.
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredState {
    pub stateful_set: StatefulSet,
    pub service: Option<Service>,
}

impl DesiredState {
    /// The data claim template, if storage is enabled.
    pub fn storage_claim(&self) -> Option<&PersistentVolumeClaim> {
        self.stateful_set
            .spec
            .as_ref()
            .and_then(|spec| spec.volume_claim_templates.as_ref())
            .and_then(|templates| templates.first())
    }

    /// Points every resource back at the owning GameServer.
    ///
    /// `owner` is expected to be a controller reference. The StatefulSet and
    /// Service get it as is; claim templates get a non-controller copy since
    /// the StatefulSet controller owns the claims it stamps out.
    #[must_use]
    pub fn with_owner(mut self, owner: &OwnerReference) -> Self {
        self.stateful_set
            .metadata
            .owner_references
            .get_or_insert_with(Vec::new)
            .push(owner.clone());

        if let Some(templates) = self
            .stateful_set
            .spec
            .as_mut()
            .and_then(|spec| spec.volume_claim_templates.as_mut())
        {
            let back_reference = OwnerReference {
                controller: Some(false),
                block_owner_deletion: Some(true),
                ..owner.clone()
            };
            for claim in templates {
                claim
                    .metadata
                    .owner_references
                    .get_or_insert_with(Vec::new)
                    .push(back_reference.clone());
            }
        }

        if let Some(service) = self.service.as_mut() {
            service
                .metadata
                .owner_references
                .get_or_insert_with(Vec::new)
                .push(owner.clone());
        }
        self
    }
}

/// Builds every resource the GameServer needs. Fails without partial output.
pub fn build_desired_state(gs: &GameServer) -> Result<DesiredState, SpecError> {
    let build_workload = gs.spec.manager.workload_builder();
    Ok(DesiredState {
        stateful_set: build_workload(gs)?,
        service: build_service(gs)?,
    })
}
