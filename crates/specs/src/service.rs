//! Service builder.
//!
//! A GameServer without a `service` block is headless: no Service is built.

use crds::{GameServer, TargetPort};
use k8s_openapi::{
    api::core::v1::{Service, ServicePort, ServiceSpec},
    apimachinery::pkg::{apis::meta::v1::ObjectMeta, util::intstr::IntOrString},
};

use crate::{error::SpecError, labels::selector_labels};

/// Builds the Service exposing the game server, if one is requested.
///
/// Target ports default to the service port. Traffic policies are only set
/// when the spec sets them, leaving the API server defaults alone otherwise.
pub fn build_service(gs: &GameServer) -> Result<Option<Service>, SpecError> {
    let Some(service) = gs.spec.service.as_ref() else {
        return Ok(None);
    };
    let name = gs.metadata.name.clone().ok_or(SpecError::MissingName)?;

    let ports = service
        .ports
        .iter()
        .map(|port| {
            let target_port = match &port.target_port {
                Some(TargetPort::Number(target)) if *target != 0 => IntOrString::Int(*target),
                Some(TargetPort::Name(target)) if !target.is_empty() => {
                    IntOrString::String(target.clone())
                }
                _ => IntOrString::Int(port.port),
            };
            ServicePort {
                name: Some(port.name.clone()),
                protocol: Some(port.protocol.as_str().to_string()),
                port: port.port,
                target_port: Some(target_port),
                node_port: port.node_port.filter(|node_port| *node_port != 0),
                ..Default::default()
            }
        })
        .collect();

    let labels = selector_labels(&name);

    Ok(Some(Service {
        metadata: ObjectMeta {
            name: Some(name),
            namespace: gs.metadata.namespace.clone(),
            labels: Some(labels.clone()),
            annotations: (!service.annotations.is_empty()).then(|| service.annotations.clone()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            type_: service.type_.map(|type_| type_.as_str().to_string()),
            selector: Some(labels),
            ports: Some(ports),
            external_traffic_policy: service
                .external_traffic_policy
                .map(|policy| policy.as_str().to_string()),
            internal_traffic_policy: service
                .internal_traffic_policy
                .map(|policy| policy.as_str().to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }))
}
