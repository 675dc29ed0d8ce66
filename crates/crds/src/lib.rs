//! GameServer Operator CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the GameServer controller.

pub mod conditions;
pub mod gameserver;

pub use conditions::*;
pub use gameserver::*;
