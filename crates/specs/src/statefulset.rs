//! LinuxGSM StatefulSet builder.
//!
//! One GameServer maps to one single-replica StatefulSet named after it. The
//! selector never changes across builds; the API server rejects selector
//! changes on a live StatefulSet.

use std::collections::BTreeMap;

use crds::{GameServer, Manager, ResourceRequirementsSpec, ServiceSpec, TargetPort};
use k8s_openapi::{
    api::{
        apps::v1::{StatefulSet, StatefulSetSpec},
        core::v1::{Container, ContainerPort, PodSpec, PodTemplateSpec, ResourceRequirements},
    },
    apimachinery::pkg::{
        api::resource::Quantity,
        apis::meta::v1::{LabelSelector, ObjectMeta},
    },
};

use crate::{
    error::SpecError,
    labels::selector_labels,
    security::{restricted_container_security_context, restricted_pod_security_context},
    sidecar::{build_ssh_sidecar, enabled_sidecar, env_var, shared_volume, shared_volume_mount},
    storage::{build_storage_claim, data_volume_mount, parse_quantity},
};

pub const GAMESERVER_CONTAINER_NAME: &str = "gameserver";
pub const LINUXGSM_IMAGE_REPOSITORY: &str = "gameservermanagers/gameserver";
const LINUXGSM_ENTRYPOINT: &str = "/app/entrypoint-user.sh";

/// Resolves the LinuxGSM image for the game, e.g. `gameservermanagers/gameserver:valheim`.
pub fn linuxgsm_image(game_name: &str) -> Result<String, SpecError> {
    let game_name = game_name.trim();
    if game_name.is_empty() {
        return Err(SpecError::MissingGameName {
            manager: Manager::LinuxGsm.as_str(),
        });
    }
    Ok(format!("{LINUXGSM_IMAGE_REPOSITORY}:{game_name}"))
}

/// Only 0 and 1 replicas exist for a game server; anything else means 1.
pub fn replica_count(requested: Option<i32>) -> i32 {
    match requested {
        Some(0) => 0,
        _ => 1,
    }
}

/// Container ports for the game server container derived from the service ports.
///
/// Numeric targets win over the service port number. Named targets are
/// skipped: they refer to a port some container already declares by name.
pub fn project_container_ports(service: Option<&ServiceSpec>) -> Vec<ContainerPort> {
    let Some(service) = service else {
        return Vec::new();
    };

    service
        .ports
        .iter()
        .filter_map(|port| {
            let container_port = match &port.target_port {
                Some(TargetPort::Number(target)) if *target != 0 => *target,
                Some(TargetPort::Name(name)) if !name.is_empty() => return None,
                _ => port.port,
            };
            Some(ContainerPort {
                name: Some(port.name.clone()),
                container_port,
                protocol: Some(port.protocol.as_str().to_string()),
                ..Default::default()
            })
        })
        .collect()
}

/// Builds the LinuxGSM StatefulSet for a GameServer.
pub fn build_stateful_set(gs: &GameServer) -> Result<StatefulSet, SpecError> {
    let name = gs.metadata.name.clone().ok_or(SpecError::MissingName)?;
    let image = linuxgsm_image(&gs.spec.game_name)?;
    let claim = build_storage_claim(gs)?;
    let sidecar = enabled_sidecar(&gs.spec);

    let mut volume_mounts = Vec::new();
    if claim.is_some() {
        volume_mounts.push(data_volume_mount());
    }
    if sidecar.is_some() {
        volume_mounts.push(shared_volume_mount());
    }

    let ports = project_container_ports(gs.spec.service.as_ref());
    let resources = gs
        .spec
        .resources
        .as_ref()
        .map(build_resource_requirements)
        .transpose()?;

    let game_container = Container {
        name: GAMESERVER_CONTAINER_NAME.to_string(),
        image: Some(image),
        image_pull_policy: Some("IfNotPresent".to_string()),
        command: Some(vec![LINUXGSM_ENTRYPOINT.to_string()]),
        env: Some(vec![env_var("UPDATE_CHECK", "0")]),
        ports: (!ports.is_empty()).then_some(ports),
        resources,
        volume_mounts: (!volume_mounts.is_empty()).then_some(volume_mounts),
        security_context: Some(restricted_container_security_context()),
        ..Default::default()
    };

    let mut containers = vec![game_container];
    let mut volumes = Vec::new();
    if let Some(sidecar) = sidecar {
        containers.push(build_ssh_sidecar(sidecar));
        volumes.push(shared_volume());
    }

    let labels = selector_labels(&name);

    Ok(StatefulSet {
        metadata: ObjectMeta {
            name: Some(name),
            namespace: gs.metadata.namespace.clone(),
            labels: Some(labels.clone()),
            ..Default::default()
        },
        spec: Some(StatefulSetSpec {
            replicas: Some(replica_count(gs.spec.replicas)),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    automount_service_account_token: Some(false),
                    security_context: Some(restricted_pod_security_context()),
                    containers,
                    volumes: (!volumes.is_empty()).then_some(volumes),
                    ..Default::default()
                }),
            },
            volume_claim_templates: claim.map(|claim| vec![claim]),
            ..Default::default()
        }),
        ..Default::default()
    })
}

fn build_resource_requirements(
    spec: &ResourceRequirementsSpec,
) -> Result<ResourceRequirements, SpecError> {
    let quantities = |values: &BTreeMap<String, String>| {
        values
            .iter()
            .map(|(resource, value)| {
                parse_quantity(value)
                    .map(|quantity| (resource.clone(), quantity))
                    .ok_or_else(|| SpecError::InvalidQuantity {
                        resource: resource.clone(),
                        value: value.clone(),
                    })
            })
            .collect::<Result<BTreeMap<String, Quantity>, SpecError>>()
    };

    let requests = quantities(&spec.requests)?;
    let limits = quantities(&spec.limits)?;

    Ok(ResourceRequirements {
        requests: (!requests.is_empty()).then_some(requests),
        limits: (!limits.is_empty()).then_some(limits),
        ..Default::default()
    })
}
