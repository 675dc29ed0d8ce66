//! Prints the GameServer CustomResourceDefinition as YAML.
//!
//! Usage: `cargo run -p crds --bin crdgen > config/crd/gameserver.yaml`

use anyhow::Result;
use crds::GameServer;
use kube::CustomResourceExt;

fn main() -> Result<()> {
    print!("{}", serde_yaml::to_string(&GameServer::crd())?);
    Ok(())
}
