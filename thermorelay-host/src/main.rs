//! Thermorelay - Thermistor threshold controller
//!
//! Reads thermistors through the analog pins of a bridged board, maps the
//! divider readings through a calibration curve, and switches heating and
//! cooling relays with a minimum dwell time between toggles.
//!
//! ```text
//! board callback ─► ThermistorReader ─► ReadingCell
//!                                           │ (polled)
//! interval tick ─► ThresholdLoop ◄──────────┘
//!                        │
//!                        └─► RelayOutput ─► LinkHandle ─► board
//! ```
//!
//! Usage: `thermorelay [--config <path>]` (default `thermorelay.toml`).
//! Ctrl-C stops the loop, forces every relay off and closes the link.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use log::{info, warn};

use thermorelay_drivers::link::LinkManager;

mod components;
mod config;
mod sim;
mod tasks;

use crate::config::loader::DEFAULT_CONFIG_PATH;
use crate::sim::{SimulatedBoard, SimulationConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = config_path_from_args(std::env::args().skip(1))?;
    info!("Thermorelay starting...");

    let config = config::load_config(&config_path)?;
    let model = Arc::new(config::load_calibration(&config_path, &config.calibration)?);

    let simulation = SimulationConfig::from_controller(&config, model.clone())
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;
    let manager = LinkManager::new(Box::new(move || SimulatedBoard::open(&simulation)));

    let mut controller = components::build(&config, model, &manager)?;
    info!("All components initialized, controller running");

    tasks::control_task(
        &mut controller.control,
        Duration::from_millis(config.poll_interval_ms()),
        shutdown_signal(),
    )
    .await;

    drop(controller);
    if manager.is_open() {
        warn!("Hardware link still held by {} holder(s)", manager.holders());
    }
    info!("Thermorelay stopped");
    Ok(())
}

/// Resolve `--config <path>` from the command line
fn config_path_from_args(args: impl Iterator<Item = String>) -> Result<PathBuf> {
    let args: Vec<String> = args.collect();

    match args.iter().position(|a| a == "--config" || a == "-c") {
        Some(idx) => match args.get(idx + 1) {
            Some(path) => Ok(PathBuf::from(path)),
            None => bail!("--config requires a path"),
        },
        None => Ok(PathBuf::from(DEFAULT_CONFIG_PATH)),
    }
}

/// Resolves on Ctrl-C
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Interrupt received"),
        Err(e) => {
            warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
