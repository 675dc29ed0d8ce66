//! Least-privilege security contexts applied to every game server pod.

use k8s_openapi::api::core::v1::{
    Capabilities, PodSecurityContext, SeccompProfile, SecurityContext,
};

/// UID and GID the game server runs as; LinuxGSM images create this user.
pub const GAMESERVER_UID: i64 = 1000;

/// Pod-level defaults: fixed non-root user, runtime default seccomp, and
/// volume ownership only fixed up when the root of the volume mismatches.
pub fn restricted_pod_security_context() -> PodSecurityContext {
    PodSecurityContext {
        run_as_non_root: Some(true),
        run_as_user: Some(GAMESERVER_UID),
        run_as_group: Some(GAMESERVER_UID),
        fs_group: Some(GAMESERVER_UID),
        fs_group_change_policy: Some("OnRootMismatch".to_string()),
        seccomp_profile: Some(SeccompProfile {
            type_: "RuntimeDefault".to_string(),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Container-level defaults: no privilege escalation, all capabilities dropped.
pub fn restricted_container_security_context() -> SecurityContext {
    SecurityContext {
        allow_privilege_escalation: Some(false),
        capabilities: Some(Capabilities {
            drop: Some(vec!["ALL".to_string()]),
            ..Default::default()
        }),
        ..Default::default()
    }
}
