//! GameServer desired-state builders
//!
//! Pure functions turning a [`crds::GameServer`] into the Kubernetes resources
//! it should own. Nothing here talks to the API server; building the same
//! GameServer twice yields identical resources.
//!
//! # Example
//!
//! ```no_run
//! use crds::{GameServer, GameServerSpec};
//! use gameserver_specs::build_desired_state;
//!
//! # fn example() -> Result<(), gameserver_specs::SpecError> {
//! let gs = GameServer::new(
//!     "valheim-1",
//!     GameServerSpec {
//!         game_name: "valheim".to_string(),
//!         ..Default::default()
//!     },
//! );
//!
//! let desired = build_desired_state(&gs)?;
//! assert!(desired.service.is_none());
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **LinuxGSM workload**: single-replica StatefulSet with restricted security defaults
//! - **Persistent storage**: `data` claim template mounted at `/data`
//! - **Service exposure**: optional Service, container ports projected from it
//! - **SSH sidecar**: optional file access container sharing `/shared`

pub mod desired;
pub mod error;
pub mod labels;
pub mod manager;
pub mod security;
pub mod service;
pub mod sidecar;
pub mod statefulset;
pub mod storage;

#[cfg(test)]
mod test_utils;

pub use desired::{DesiredState, build_desired_state};
pub use error::SpecError;
pub use labels::{CONTROLLER_NAME, OPERATOR_NAME, selector_labels};
pub use manager::{ManagerExt, WorkloadBuilder};
pub use service::build_service;
pub use statefulset::build_stateful_set;
pub use storage::build_storage_claim;
