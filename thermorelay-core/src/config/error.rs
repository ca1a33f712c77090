//! Startup configuration errors
//!
//! These are the only errors allowed to stop the controller: they are
//! raised while loading the calibration table or validating the
//! configuration, before any actuator is driven.

use core::fmt;

/// Configuration or calibration-table error
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Calibration table has no header row
    EmptyTable,
    /// Header has no temperature column
    MissingTemperatureColumn,
    /// Header has no column with the requested probe label
    MissingColumn,
    /// Row is missing a cell
    RaggedRow { line: usize },
    /// Cell is not a finite number
    InvalidNumber { line: usize },
    /// Fewer than two calibration points
    TooFewPoints { found: usize },
    /// More points than the model can hold
    TooManyPoints,
    /// A calibration point is NaN or infinite
    NonFinitePoint,
    /// Two points share a temperature
    DuplicateTemperature { temperature_c: f32 },
    /// Two points share a resistance
    DuplicateResistance { resistance_ohms: f32 },
    /// Resistance is not strictly monotonic in temperature
    NotMonotonic,
    /// Reference resistance for ratio columns is not positive
    InvalidReference,
    /// Supply or ADC reference voltage is not positive
    InvalidVoltage,
    /// ADC resolution outside 1..=16 bits
    InvalidAdcBits { bits: u8 },
    /// Series resistor is not positive
    InvalidSeriesResistor,
    /// Sample window outside 1..=MAX_WINDOW
    InvalidWindow { size: usize },
    /// Poll interval under 1 ms, or dwell time negative
    InvalidInterval,
    /// Threshold is not a finite temperature
    InvalidThreshold,
    /// No control loops configured
    NoLoops,
    /// More control loops than supported
    TooManyLoops,
    /// A digital pin is driven by more than one loop
    DuplicateActuatorPin { pin: u8 },
    /// Loops sharing an analog pin disagree on divider settings
    ConflictingSensor { pin: u8 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyTable => f.write_str("calibration table is empty"),
            ConfigError::MissingTemperatureColumn => {
                f.write_str("calibration table has no temperature column")
            }
            ConfigError::MissingColumn => f.write_str("calibration column not found"),
            ConfigError::RaggedRow { line } => write!(f, "line {}: missing cell", line),
            ConfigError::InvalidNumber { line } => write!(f, "line {}: invalid number", line),
            ConfigError::TooFewPoints { found } => {
                write!(f, "calibration needs at least 2 points, found {}", found)
            }
            ConfigError::TooManyPoints => f.write_str("too many calibration points"),
            ConfigError::NonFinitePoint => f.write_str("calibration point is not finite"),
            ConfigError::DuplicateTemperature { temperature_c } => {
                write!(f, "duplicate calibration temperature {:.2}°C", temperature_c)
            }
            ConfigError::DuplicateResistance { resistance_ohms } => {
                write!(f, "duplicate calibration resistance {:.2e}Ω", resistance_ohms)
            }
            ConfigError::NotMonotonic => {
                f.write_str("calibration resistance is not monotonic in temperature")
            }
            ConfigError::InvalidReference => f.write_str("reference resistance must be positive"),
            ConfigError::InvalidVoltage => f.write_str("voltages must be positive"),
            ConfigError::InvalidAdcBits { bits } => {
                write!(f, "ADC resolution of {} bits is not supported", bits)
            }
            ConfigError::InvalidSeriesResistor => f.write_str("series resistor must be positive"),
            ConfigError::InvalidWindow { size } => write!(f, "invalid sample window {}", size),
            ConfigError::InvalidInterval => {
                f.write_str("poll interval must be at least 1 ms and dwell time non-negative")
            }
            ConfigError::InvalidThreshold => f.write_str("threshold must be a finite temperature"),
            ConfigError::NoLoops => f.write_str("no control loops configured"),
            ConfigError::TooManyLoops => f.write_str("too many control loops"),
            ConfigError::DuplicateActuatorPin { pin } => {
                write!(f, "digital pin {} is driven by more than one loop", pin)
            }
            ConfigError::ConflictingSensor { pin } => {
                write!(f, "loops sharing analog pin {} disagree on divider settings", pin)
            }
        }
    }
}
