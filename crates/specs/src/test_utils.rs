//! Test fixtures for the builders.

use crds::{GameServer, GameServerSpec};

/// A `valheim` GameServer named "example" in "default", adjusted by `customize`.
pub fn new_game_server(customize: impl FnOnce(&mut GameServer)) -> GameServer {
    let mut gs = GameServer::new(
        "example",
        GameServerSpec {
            game_name: "valheim".to_string(),
            replicas: Some(1),
            ..Default::default()
        },
    );
    gs.metadata.namespace = Some("default".to_string());
    customize(&mut gs);
    gs
}
