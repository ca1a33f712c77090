//! Calibration table loading
//!
//! The table path in the configuration is relative to the configuration
//! file, so a config directory can be moved as a whole.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::info;

use thermorelay_core::calibration::CalibrationModel;
use thermorelay_core::config::CalibrationConfig;

/// Resolve the table path against the config file's directory
pub fn table_path(config_path: &Path, calibration: &CalibrationConfig) -> PathBuf {
    let table = Path::new(calibration.table.as_str());
    match config_path.parent() {
        Some(dir) if table.is_relative() => dir.join(table),
        _ => table.to_path_buf(),
    }
}

/// Load the calibration model selected by the configuration
pub fn load_calibration(config_path: &Path, calibration: &CalibrationConfig) -> Result<CalibrationModel> {
    let path = table_path(config_path, calibration);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("cannot read calibration table {}", path.display()))?;

    let model = CalibrationModel::from_tsv(
        &content,
        calibration.column.as_str(),
        calibration.reference_ohms,
    )
    .map_err(|e| anyhow!("calibration table {}: {}", path.display(), e))?;

    let (t_min, t_max) = model.temperature_bounds();
    let (r_min, r_max) = model.resistance_bounds();
    info!(
        "Calibration [{}] loaded: {:.1}..{:.1}°C, {:.0}..{:.0}Ω",
        calibration.column, t_min, t_max, r_min, r_max
    );

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::String;

    fn calibration(table: &str) -> CalibrationConfig {
        CalibrationConfig {
            table: String::try_from(table).unwrap(),
            column: String::try_from("Type 8016").unwrap(),
            reference_ohms: 10_000.0,
        }
    }

    #[test]
    fn test_relative_table_path() {
        let path = table_path(Path::new("/etc/thermorelay/thermorelay.toml"), &calibration("curves.tsv"));
        assert_eq!(path, Path::new("/etc/thermorelay/curves.tsv"));
    }

    #[test]
    fn test_absolute_table_path() {
        let path = table_path(Path::new("/etc/thermorelay.toml"), &calibration("/data/curves.tsv"));
        assert_eq!(path, Path::new("/data/curves.tsv"));
    }

    #[test]
    fn test_bundled_table_loads() {
        let config = Path::new(env!("CARGO_MANIFEST_DIR")).join("thermorelay.toml");
        let model = load_calibration(&config, &calibration("thermistor_curves.tsv")).unwrap();

        let t = model.temperature_from_resistance(10_000.0).unwrap();
        assert!((t - 25.0).abs() < 1e-3);
        assert_eq!(model.temperature_bounds(), (-40.0, 125.0));
    }

    #[test]
    fn test_unknown_column() {
        let config = Path::new(env!("CARGO_MANIFEST_DIR")).join("thermorelay.toml");
        let mut selection = calibration("thermistor_curves.tsv");
        selection.column = String::try_from("Type 9999").unwrap();
        assert!(load_calibration(&config, &selection).is_err());
    }
}
