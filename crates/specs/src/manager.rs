//! Dispatch from the game server manager to its workload builder.

use crds::{GameServer, Manager};
use k8s_openapi::api::apps::v1::StatefulSet;

use crate::{error::SpecError, statefulset::build_stateful_set};

/// Builds the workload for one manager flavour.
pub type WorkloadBuilder = fn(&GameServer) -> Result<StatefulSet, SpecError>;

/// Maps a [`Manager`] to the builder of its workload.
///
/// New managers extend the match; the compiler flags every missing arm.
pub trait ManagerExt {
    fn workload_builder(self) -> WorkloadBuilder;
}

impl ManagerExt for Manager {
    fn workload_builder(self) -> WorkloadBuilder {
        match self {
            Manager::LinuxGsm => build_stateful_set,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::new_game_server;

    #[test]
    fn test_linuxgsm_builds_stateful_set() {
        let gs = new_game_server(|_| {});
        let builder = gs.spec.manager.workload_builder();

        let sts = builder(&gs).unwrap();
        let container = &sts.spec.unwrap().template.spec.unwrap().containers[0];
        assert_eq!(
            container.image.as_deref(),
            Some("gameservermanagers/gameserver:valheim")
        );
    }
}
