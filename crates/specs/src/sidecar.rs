//! SSH sidecar for remote file access to the game server.
//!
//! The sidecar shares an emptyDir volume (`shared`) with the game server
//! container. Access is either by public keys or, when none are given, by
//! password; never both.

use crds::{GameServerSpec, SshSidecarSpec};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EmptyDirVolumeSource, EnvVar, EnvVarSource, SecretKeySelector,
    Volume, VolumeMount,
};

use crate::security::{GAMESERVER_UID, restricted_container_security_context};

pub const SSH_SIDECAR_NAME: &str = "ssh-sidecar";
pub const DEFAULT_SSH_IMAGE: &str = "linuxserver/openssh-server:latest";
pub const DEFAULT_SSH_PORT: i32 = 2222;
pub const SSH_PORT_NAME: &str = "ssh";

pub const SHARED_VOLUME_NAME: &str = "shared";
pub const SHARED_MOUNT_PATH: &str = "/shared";

/// Password used when neither public keys nor a password secret are configured.
pub const FALLBACK_SSH_PASSWORD: &str = "changeme";

const SSH_USER_NAME: &str = "gameserver";
const SSH_TIMEZONE: &str = "Etc/UTC";

/// Returns the sidecar spec if the sidecar is enabled.
pub fn enabled_sidecar(spec: &GameServerSpec) -> Option<&SshSidecarSpec> {
    spec.ssh_sidecar.as_ref().filter(|sidecar| sidecar.enabled)
}

/// Builds the SSH sidecar container.
pub fn build_ssh_sidecar(sidecar: &SshSidecarSpec) -> Container {
    let image = sidecar
        .image
        .clone()
        .filter(|image| !image.is_empty())
        .unwrap_or_else(|| DEFAULT_SSH_IMAGE.to_string());
    let port = sidecar
        .port
        .filter(|port| *port != 0)
        .unwrap_or(DEFAULT_SSH_PORT);

    let uid = GAMESERVER_UID.to_string();
    let mut env = vec![
        env_var("PUID", &uid),
        env_var("PGID", &uid),
        env_var("TZ", SSH_TIMEZONE),
        env_var("USER_NAME", SSH_USER_NAME),
    ];
    env.extend(access_env(sidecar));

    Container {
        name: SSH_SIDECAR_NAME.to_string(),
        image: Some(image),
        image_pull_policy: Some("IfNotPresent".to_string()),
        ports: Some(vec![ContainerPort {
            name: Some(SSH_PORT_NAME.to_string()),
            container_port: port,
            protocol: Some("TCP".to_string()),
            ..Default::default()
        }]),
        volume_mounts: Some(vec![shared_volume_mount()]),
        env: Some(env),
        security_context: Some(restricted_container_security_context()),
        ..Default::default()
    }
}

/// Public keys win over password access.
fn access_env(sidecar: &SshSidecarSpec) -> Vec<EnvVar> {
    if !sidecar.public_keys.is_empty() {
        let keys: String = sidecar
            .public_keys
            .iter()
            .map(|key| format!("{key}\n"))
            .collect();
        return vec![env_var("PUBLIC_KEY", &keys)];
    }

    let password = match &sidecar.password_secret_ref {
        Some(secret) => EnvVar {
            name: "USER_PASSWORD".to_string(),
            value_from: Some(EnvVarSource {
                secret_key_ref: Some(SecretKeySelector {
                    name: secret.name.clone(),
                    key: secret.key.clone(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        },
        None => env_var("USER_PASSWORD", FALLBACK_SSH_PASSWORD),
    };
    vec![env_var("PASSWORD_ACCESS", "true"), password]
}

/// emptyDir volume shared between the game server and the sidecar.
pub fn shared_volume() -> Volume {
    Volume {
        name: SHARED_VOLUME_NAME.to_string(),
        empty_dir: Some(EmptyDirVolumeSource::default()),
        ..Default::default()
    }
}

pub fn shared_volume_mount() -> VolumeMount {
    VolumeMount {
        name: SHARED_VOLUME_NAME.to_string(),
        mount_path: SHARED_MOUNT_PATH.to_string(),
        ..Default::default()
    }
}

pub(crate) fn env_var(name: &str, value: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: Some(value.to_string()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crds::SecretKeyRef;

    fn env_names(container: &Container) -> Vec<&str> {
        container
            .env
            .as_ref()
            .unwrap()
            .iter()
            .map(|e| e.name.as_str())
            .collect()
    }

    fn env_value<'a>(container: &'a Container, name: &str) -> Option<&'a EnvVar> {
        container.env.as_ref().unwrap().iter().find(|e| e.name == name)
    }

    #[test]
    fn test_sidecar_defaults() {
        let container = build_ssh_sidecar(&SshSidecarSpec {
            enabled: true,
            ..Default::default()
        });

        assert_eq!(container.name, "ssh-sidecar");
        assert_eq!(container.image.as_deref(), Some(DEFAULT_SSH_IMAGE));
        let port = &container.ports.as_ref().unwrap()[0];
        assert_eq!(port.name.as_deref(), Some("ssh"));
        assert_eq!(port.container_port, 2222);
        assert_eq!(container.volume_mounts, Some(vec![shared_volume_mount()]));
        assert_eq!(
            container.security_context,
            Some(restricted_container_security_context())
        );
    }

    #[test]
    fn test_public_keys_take_precedence_over_password() {
        let container = build_ssh_sidecar(&SshSidecarSpec {
            enabled: true,
            public_keys: vec!["ssh-ed25519 AAAA one".to_string(), "ssh-rsa BBBB two".to_string()],
            password_secret_ref: Some(SecretKeyRef {
                name: "ssh".to_string(),
                key: "password".to_string(),
            }),
            ..Default::default()
        });

        let names = env_names(&container);
        assert!(names.contains(&"PUBLIC_KEY"));
        assert!(!names.contains(&"PASSWORD_ACCESS"));
        assert!(!names.contains(&"USER_PASSWORD"));
        assert_eq!(
            env_value(&container, "PUBLIC_KEY").unwrap().value.as_deref(),
            Some("ssh-ed25519 AAAA one\nssh-rsa BBBB two\n")
        );
    }

    #[test]
    fn test_password_from_secret() {
        let container = build_ssh_sidecar(&SshSidecarSpec {
            enabled: true,
            password_secret_ref: Some(SecretKeyRef {
                name: "ssh".to_string(),
                key: "password".to_string(),
            }),
            ..Default::default()
        });

        assert_eq!(
            env_value(&container, "PASSWORD_ACCESS").unwrap().value.as_deref(),
            Some("true")
        );
        let password = env_value(&container, "USER_PASSWORD").unwrap();
        assert_eq!(password.value, None);
        let selector = password
            .value_from
            .as_ref()
            .unwrap()
            .secret_key_ref
            .as_ref()
            .unwrap();
        assert_eq!(selector.name, "ssh");
        assert_eq!(selector.key, "password");
        assert!(!env_names(&container).contains(&"PUBLIC_KEY"));
    }

    #[test]
    fn test_password_fallback() {
        let container = build_ssh_sidecar(&SshSidecarSpec {
            enabled: true,
            image: Some("example/sshd:1.0".to_string()),
            port: Some(2022),
            ..Default::default()
        });

        assert_eq!(container.image.as_deref(), Some("example/sshd:1.0"));
        assert_eq!(container.ports.as_ref().unwrap()[0].container_port, 2022);
        assert_eq!(
            env_value(&container, "USER_PASSWORD").unwrap().value.as_deref(),
            Some(FALLBACK_SSH_PASSWORD)
        );
    }

    #[test]
    fn test_disabled_sidecar_is_ignored() {
        let spec = GameServerSpec {
            ssh_sidecar: Some(SshSidecarSpec::default()),
            ..Default::default()
        };
        assert!(enabled_sidecar(&spec).is_none());
    }
}
