//! GameServer CRD
//!
//! Declarative description of one game-server instance and the infrastructure
//! (workload, optional service, optional storage) that should exist for it.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::conditions::{Condition, set_condition};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[kube(
    group = "games.idebeijer.github.io",
    version = "v1alpha1",
    kind = "GameServer",
    namespaced,
    status = "GameServerStatus",
    shortname = "gs",
    printcolumn = r#"{"name":"Game","type":"string","jsonPath":".spec.gameName"}"#,
    printcolumn = r#"{"name":"Available","type":"string","jsonPath":".status.conditions[?(@.type==\"Available\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct GameServerSpec {
    /// LinuxGSM short name of the game (e.g. "valheim", "mc", "rust")
    pub game_name: String,

    /// Installation and management tool for the game server
    #[serde(default)]
    pub manager: Manager,

    /// Version of the game server; recorded on the resource, not used for the image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_version: Option<String>,

    /// Game-specific configuration, carried for tooling that reads the resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_configs: Option<GameConfigs>,

    /// Number of instances; only 0 (stopped) and 1 are realized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 0))]
    pub replicas: Option<i32>,

    /// Persistent storage; enabled with 10Gi when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageSpec>,

    /// Network exposure; no Service is created when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceSpec>,

    /// Compute resources for the game server container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirementsSpec>,

    /// Optional SSH sidecar for file access
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_sidecar: Option<SshSidecarSpec>,
}

/// Supported installation/management tools.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq, Hash)]
pub enum Manager {
    /// LinuxGSM (https://linuxgsm.com)
    #[default]
    #[serde(rename = "LinuxGSM")]
    LinuxGsm,
}

impl Manager {
    /// Identifier as it appears in the resource spec
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LinuxGsm => "LinuxGSM",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameConfigs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minecraft: Option<MinecraftConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MinecraftConfig {
    /// Minecraft server version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Mods to install on the server
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mods: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageSpec {
    /// Whether persistent storage is enabled (default true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Requested size of the data volume, e.g. "20Gi" (default "10Gi")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// StorageClass for the claim; the cluster default is used when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    /// Service type (ClusterIP, NodePort, LoadBalancer)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<ServiceType>,

    /// Ports exposed by the Service
    #[serde(default)]
    pub ports: Vec<ServicePort>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_traffic_policy: Option<TrafficPolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_traffic_policy: Option<TrafficPolicy>,

    /// Annotations copied onto the Service (load balancer tuning etc.)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServicePort {
    pub name: String,

    #[serde(default)]
    pub protocol: Protocol,

    pub port: i32,

    /// Number or name of the port on the pod (defaults to `port`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "int_or_string_schema")]
    pub target_port: Option<TargetPort>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_port: Option<i32>,
}

/// Target of a service port: a container port number or a named container port.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(untagged)]
pub enum TargetPort {
    Number(i32),
    Name(String),
}

fn int_or_string_schema(_: &mut schemars::SchemaGenerator) -> schemars::Schema {
    schemars::json_schema!({ "x-kubernetes-int-or-string": true })
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
pub enum Protocol {
    #[default]
    #[serde(rename = "TCP")]
    Tcp,
    #[serde(rename = "UDP")]
    Udp,
    #[serde(rename = "SCTP")]
    Sctp,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "TCP",
            Self::Udp => "UDP",
            Self::Sctp => "SCTP",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub enum ServiceType {
    ClusterIP,
    NodePort,
    LoadBalancer,
}

impl ServiceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClusterIP => "ClusterIP",
            Self::NodePort => "NodePort",
            Self::LoadBalancer => "LoadBalancer",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub enum TrafficPolicy {
    Cluster,
    Local,
}

impl TrafficPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cluster => "Cluster",
            Self::Local => "Local",
        }
    }
}

/// Resource requests/limits as quantity strings keyed by resource name ("cpu", "memory").
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequirementsSpec {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub requests: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub limits: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SshSidecarSpec {
    #[serde(default)]
    pub enabled: bool,

    /// Sidecar image (default "linuxserver/openssh-server:latest")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// SSH listen port (default 2222)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,

    /// Trusted public keys; takes precedence over password access
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub public_keys: Vec<String>,

    /// Secret holding the password used when no public keys are given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_secret_ref: Option<SecretKeyRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeyRef {
    /// Name of the Secret in the GameServer's namespace
    pub name: String,
    /// Key within the Secret
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameServerStatus {
    /// Latest observations, one entry per condition type
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl GameServerStatus {
    /// Sets a condition, replacing any existing condition of the same type.
    ///
    /// Returns `true` if the stored set changed.
    pub fn set_condition(&mut self, condition: Condition) -> bool {
        set_condition(&mut self.conditions, condition)
    }

    /// Looks up a condition by type.
    pub fn condition(&self, type_: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.type_ == type_)
    }
}

impl GameServer {
    /// True once at least one status condition has been recorded.
    pub fn has_conditions(&self) -> bool {
        self.status
            .as_ref()
            .is_some_and(|status| !status.conditions.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_deserializes_with_defaults() {
        let spec: GameServerSpec = serde_json::from_value(serde_json::json!({
            "gameName": "valheim"
        }))
        .unwrap();

        assert_eq!(spec.game_name, "valheim");
        assert_eq!(spec.manager, Manager::LinuxGsm);
        assert_eq!(spec.replicas, None);
        assert!(spec.storage.is_none());
        assert!(spec.service.is_none());
    }

    #[test]
    fn test_target_port_accepts_number_and_name() {
        let ports: Vec<ServicePort> = serde_json::from_value(serde_json::json!([
            { "name": "game", "port": 27015, "targetPort": 28015, "protocol": "UDP" },
            { "name": "metrics", "port": 8080, "targetPort": "metrics" },
        ]))
        .unwrap();

        assert_eq!(ports[0].target_port, Some(TargetPort::Number(28015)));
        assert_eq!(ports[0].protocol, Protocol::Udp);
        assert_eq!(ports[1].target_port, Some(TargetPort::Name("metrics".to_string())));
        assert_eq!(ports[1].protocol, Protocol::Tcp);
    }

    #[test]
    fn test_game_version_and_configs_round_trip_the_wire_names() {
        let value = serde_json::json!({
            "gameName": "mcserver",
            "gameVersion": "1.21",
            "gameConfigs": { "minecraft": { "version": "1.21.1", "mods": ["fabric-api"] } }
        });

        let spec: GameServerSpec = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(spec.game_version.as_deref(), Some("1.21"));
        let minecraft = spec.game_configs.as_ref().and_then(|c| c.minecraft.as_ref()).unwrap();
        assert_eq!(minecraft.version.as_deref(), Some("1.21.1"));
        assert_eq!(minecraft.mods, vec!["fabric-api".to_string()]);

        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["gameVersion"], value["gameVersion"]);
        assert_eq!(json["gameConfigs"], value["gameConfigs"]);
    }

    #[test]
    fn test_manager_wire_name() {
        let json = serde_json::to_value(Manager::LinuxGsm).unwrap();
        assert_eq!(json, serde_json::json!("LinuxGSM"));
        assert_eq!(Manager::LinuxGsm.as_str(), "LinuxGSM");
    }

    #[test]
    fn test_has_conditions() {
        let mut gs = GameServer::new("valheim-1", GameServerSpec::default());
        assert!(!gs.has_conditions());

        gs.status = Some(GameServerStatus::default());
        assert!(!gs.has_conditions());

        gs.status
            .as_mut()
            .unwrap()
            .set_condition(Condition::reconciling());
        assert!(gs.has_conditions());
    }
}
