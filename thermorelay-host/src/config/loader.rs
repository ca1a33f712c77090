//! Controller configuration loader
//!
//! Parses `thermorelay.toml` into a [`ControllerConfig`] and validates it
//! before any hardware is touched.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::{debug, info};

use thermorelay_core::config::ControllerConfig;

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "thermorelay.toml";

/// Load and validate the configuration file at `path`
pub fn load_config(path: &Path) -> Result<ControllerConfig> {
    info!("Loading configuration from {}", path.display());

    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read config file {}", path.display()))?;

    let config =
        parse_config(&content).with_context(|| format!("invalid config file {}", path.display()))?;

    log_config_summary(&config);
    Ok(config)
}

/// Parse and validate configuration text
pub fn parse_config(content: &str) -> Result<ControllerConfig> {
    let config: ControllerConfig = toml::from_str(content).context("TOML parse error")?;
    config
        .validate()
        .map_err(|e| anyhow!("invalid configuration: {}", e))?;
    Ok(config)
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &ControllerConfig) {
    info!(
        "Configuration loaded: {} loop(s), poll {}s, dwell {}s",
        config.loops.len(),
        config.control.poll_interval_s,
        config.control.min_dwell_s
    );
    debug!(
        "  board: {}V supply, {}V reference, {} bits",
        config.board.supply_voltage, config.board.adc_reference_voltage, config.board.adc_bits
    );
    debug!(
        "  calibration: {} [{}] x {}Ω",
        config.calibration.table, config.calibration.column, config.calibration.reference_ohms
    );
    for (name, l) in config.resolved_names().iter().zip(config.loops.iter()) {
        debug!(
            "  {}: {:?} at {}°C, A{} -> D{} ({:?}, {:?}, {}Ω, window {})",
            name,
            l.mode,
            l.threshold_c,
            l.sensor_pin,
            l.actuator_pin,
            l.polarity,
            l.topology,
            l.series_ohms,
            l.window
        );
    }
}
