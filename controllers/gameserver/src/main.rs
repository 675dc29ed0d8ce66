//! GameServer Controller
//!
//! Reconciles `GameServer` resources (games.idebeijer.github.io/v1alpha1)
//! into a LinuxGSM StatefulSet, an optional Service, and persistent storage
//! for the game data.

mod backoff;
mod config;
mod controller;
mod error;
mod reconciler;
mod version;
mod watcher;

#[cfg(test)]
mod test_utils;

use crate::config::Settings;
use crate::controller::Controller;
use crate::error::ControllerError;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if rustls::crypto::ring::default_provider().install_default().is_err() {
        debug!("rustls crypto provider already installed");
    }

    version::log_build_info();

    // Load configuration from environment variables
    let settings = Settings::from_env()?;

    info!("Configuration:");
    info!("  Namespace: {}", settings.namespace.as_deref().unwrap_or("all namespaces"));
    info!("  Concurrency: {}", settings.concurrency);
    info!("  Debounce: {:?}", settings.debounce);

    // Initialize and run controller
    let controller = Controller::new(&settings).await?;
    controller.run().await?;

    Ok(())
}
