//! Configuration type definitions
//!
//! Every physical value is explicit: there are no defaults for voltages,
//! resistors, pins or thresholds. The application deserializes these from
//! its configuration file and calls [`ControllerConfig::validate`] before
//! touching any hardware.

use core::fmt::Write;

use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::control::ControlMode;
use crate::divider::{DividerTopology, ResistanceEstimator};
use crate::smoothing::MAX_WINDOW;

/// Maximum label length (loop names, calibration column labels)
pub const MAX_LABEL_LEN: usize = 24;

/// Maximum calibration file path length
pub const MAX_PATH_LEN: usize = 128;

/// Maximum control loops per config
pub const MAX_LOOPS: usize = 8;

/// Loop name
pub type Label = String<MAX_LABEL_LEN>;

/// Board electrical parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardConfig {
    /// Divider supply voltage (V)
    pub supply_voltage: f32,
    /// Analog pin full-scale voltage (V)
    pub adc_reference_voltage: f32,
    /// Analog pin resolution in bits
    pub adc_bits: u8,
}

/// Calibration table selection
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationConfig {
    /// Path of the tab-separated table, relative to the config file
    pub table: String<MAX_PATH_LEN>,
    /// Probe column to use (e.g. "Type 8016")
    pub column: Label,
    /// Probe resistance at 25°C (Ω), scales the ratio column
    pub reference_ohms: f32,
}

/// Polling cadence and debounce
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControlConfig {
    /// Control loop period (s)
    pub poll_interval_s: f32,
    /// Minimum time between two toggles of one actuator (s)
    pub min_dwell_s: f32,
}

/// Actuator wiring polarity
///
/// Relay boards are often driven low: pin LOW energises the coil.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Polarity {
    /// Pin HIGH = actuator on
    ActiveHigh,
    /// Pin LOW = actuator on
    ActiveLow,
}

impl Polarity {
    /// Pin level that puts the actuator in the given state
    pub fn level(&self, on: bool) -> bool {
        match self {
            Polarity::ActiveHigh => on,
            Polarity::ActiveLow => !on,
        }
    }
}

/// One sensor/actuator/threshold triple
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoopConfig {
    /// Name used in logs; derived from the mode when omitted
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<Label>,
    /// Heating or cooling
    pub mode: ControlMode,
    /// Switching threshold (°C)
    pub threshold_c: f32,
    /// Analog pin of the thermistor divider
    pub sensor_pin: u8,
    /// Digital pin of the relay
    pub actuator_pin: u8,
    /// Relay wiring polarity
    pub polarity: Polarity,
    /// Thermistor position in the divider
    pub topology: DividerTopology,
    /// Divider series resistor (Ω)
    pub series_ohms: f32,
    /// Number of samples averaged
    pub window: usize,
}

/// Complete controller configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControllerConfig {
    pub board: BoardConfig,
    pub calibration: CalibrationConfig,
    pub control: ControlConfig,
    pub loops: Vec<LoopConfig, MAX_LOOPS>,
}

impl ControllerConfig {
    /// Create a config with no loops
    pub fn new(board: BoardConfig, calibration: CalibrationConfig, control: ControlConfig) -> Self {
        Self {
            board,
            calibration,
            control,
            loops: Vec::new(),
        }
    }

    /// Append a loop
    pub fn add_loop(&mut self, config: LoopConfig) -> Result<(), ConfigError> {
        self.loops.push(config).map_err(|_| ConfigError::TooManyLoops)
    }

    /// Check every value before any hardware is touched
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.calibration.reference_ohms > 0.0 && self.calibration.reference_ohms.is_finite()) {
            return Err(ConfigError::InvalidReference);
        }

        let control = &self.control;
        if !(control.poll_interval_s > 0.0 && control.poll_interval_s.is_finite())
            || !(control.min_dwell_s >= 0.0 && control.min_dwell_s.is_finite())
        {
            return Err(ConfigError::InvalidInterval);
        }
        // Sub-millisecond periods round to a zero tick
        if seconds_to_ms(control.poll_interval_s) == 0 {
            return Err(ConfigError::InvalidInterval);
        }

        if self.loops.is_empty() {
            return Err(ConfigError::NoLoops);
        }

        for (idx, config) in self.loops.iter().enumerate() {
            if !config.threshold_c.is_finite() {
                return Err(ConfigError::InvalidThreshold);
            }
            if config.window == 0 || config.window > MAX_WINDOW {
                return Err(ConfigError::InvalidWindow {
                    size: config.window,
                });
            }
            self.estimator_for(config)?;

            for other in &self.loops[..idx] {
                if other.actuator_pin == config.actuator_pin {
                    return Err(ConfigError::DuplicateActuatorPin {
                        pin: config.actuator_pin,
                    });
                }
                if other.sensor_pin == config.sensor_pin
                    && (other.topology != config.topology
                        || other.series_ohms != config.series_ohms
                        || other.window != config.window)
                {
                    return Err(ConfigError::ConflictingSensor {
                        pin: config.sensor_pin,
                    });
                }
            }
        }

        Ok(())
    }

    /// Divider estimator for one loop's sensor
    pub fn estimator_for(&self, config: &LoopConfig) -> Result<ResistanceEstimator, ConfigError> {
        ResistanceEstimator::new(
            self.board.supply_voltage,
            self.board.adc_reference_voltage,
            self.board.adc_bits,
            config.series_ohms,
            config.topology,
        )
    }

    /// Control loop period in milliseconds
    pub fn poll_interval_ms(&self) -> u64 {
        seconds_to_ms(self.control.poll_interval_s)
    }

    /// Dwell time in milliseconds
    pub fn min_dwell_ms(&self) -> u64 {
        seconds_to_ms(self.control.min_dwell_s)
    }

    /// Loop names in loop order
    ///
    /// Unnamed loops get `heater1`, `heater2`, `cooler1`, ... counted per
    /// mode.
    pub fn resolved_names(&self) -> Vec<Label, MAX_LOOPS> {
        let mut heaters = 0u8;
        let mut coolers = 0u8;
        let mut names = Vec::new();

        for config in &self.loops {
            let name = match &config.name {
                Some(name) => name.clone(),
                None => {
                    let (prefix, counter) = match config.mode {
                        ControlMode::Heating => ("heater", &mut heaters),
                        ControlMode::Cooling => ("cooler", &mut coolers),
                    };
                    *counter += 1;
                    let mut name = Label::new();
                    // Fits: prefix + at most 3 digits
                    let _ = write!(name, "{}{}", prefix, counter);
                    name
                }
            };
            // Same capacity as self.loops
            let _ = names.push(name);
        }

        names
    }
}

fn seconds_to_ms(seconds: f32) -> u64 {
    (seconds * 1000.0 + 0.5) as u64
}
