//! Weather station daemon
//!
//! Wires together:
//! - Station configuration (elevation, latitude, display units)
//! - A record source standing in for the hardware I/O layer
//! - The observation dispatcher and its accumulators

mod config;
mod scheduler;
mod simulator;

use anyhow::{Context, Result};
use tracing::{error, info};

use wfs_config::AppConfig;
use wfs_core::Source;
use wfs_dispatch::StationDispatcher;

use crate::config::DaemonConfig;
use crate::scheduler::Scheduler;
use crate::simulator::{SimulatorSource, SIMULATOR_SERIAL};

#[tokio::main]
async fn main() -> Result<()> {
    wfs_obs::init("wfsd");

    info!("Starting weather station daemon");

    let daemon_config = DaemonConfig::from_env()?;
    info!("Loaded daemon configuration: {:?}", daemon_config);

    let app_config = AppConfig::load().context("Failed to load station configuration")?;
    let context = app_config.station_context();
    info!(
        elevation = context.elevation,
        latitude = context.latitude,
        "Station context ready"
    );

    let mut dispatcher = StationDispatcher::new(context);
    for serial in app_config.eto_devices() {
        dispatcher.register_eto_device(&serial);
    }
    dispatcher.register_eto_device(SIMULATOR_SERIAL);

    let source = Box::new(SimulatorSource::new(daemon_config.report_interval)) as Box<dyn Source>;

    let mut scheduler = Scheduler::new(source, dispatcher, daemon_config.poll_interval);

    info!("Daemon running - press Ctrl+C to stop");

    tokio::select! {
        result = scheduler.run() => {
            if let Err(e) = result {
                error!("Scheduler error: {}", e);
                return Err(e);
            }
        }
        _ = setup_shutdown_handler() => {
            info!("Shutdown signal received");
            scheduler.stop();
        }
    }

    info!("Weather station daemon stopped");
    Ok(())
}

/// Wait for Ctrl+C
async fn setup_shutdown_handler() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to setup signal handler: {}", e);
    }
}
