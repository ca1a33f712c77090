//! Thermistor calibration model
//!
//! Maps resistance to temperature and back through the empirical
//! calibration table. Both directions are piecewise-linear between table
//! points, so they are exact inverses of each other on the calibrated
//! range. Values outside the table range are rejected rather than
//! extrapolated.

mod curve;
pub mod table;

use core::fmt;

use heapless::Vec;

use crate::config::ConfigError;
use curve::Curve;

pub use table::{
    parse_table, CalibrationPoint, CalibrationTable, MAX_CALIBRATION_POINTS, TEMPERATURE_COLUMN,
};

/// Calibration lookup errors
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// Input outside the calibrated range `[min, max]`
    OutOfDomain { value: f32, min: f32, max: f32 },
    /// Output buffer length differs from input length
    ShapeMismatch { input: usize, output: usize },
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationError::OutOfDomain { value, min, max } => write!(
                f,
                "{:.2e} is out of bounds, valid domain [{:.2e}:{:.2e}]",
                value, min, max
            ),
            CalibrationError::ShapeMismatch { input, output } => write!(
                f,
                "{} inputs cannot be written to {} outputs",
                input, output
            ),
        }
    }
}

/// Bidirectional resistance/temperature model
///
/// Immutable once loaded; share it between readers by reference or `Arc`.
#[derive(Debug, Clone)]
pub struct CalibrationModel {
    /// Temperature as a function of resistance
    temperature: Curve,
    /// Resistance as a function of temperature
    resistance: Curve,
}

impl CalibrationModel {
    /// Build the model from calibration points in any order
    ///
    /// Fails if there are fewer than two points, if any temperature or
    /// resistance appears twice, or if resistance is not strictly
    /// monotonic in temperature.
    pub fn load(points: &[CalibrationPoint]) -> Result<Self, ConfigError> {
        if points.len() < 2 {
            return Err(ConfigError::TooFewPoints {
                found: points.len(),
            });
        }
        table::check_finite(points)?;

        let mut by_temperature: Vec<CalibrationPoint, MAX_CALIBRATION_POINTS> =
            Vec::from_slice(points).map_err(|_| ConfigError::TooManyPoints)?;
        by_temperature.sort_unstable_by(|a, b| a.temperature_c.total_cmp(&b.temperature_c));

        if let Some(pair) = by_temperature
            .windows(2)
            .find(|pair| pair[0].temperature_c == pair[1].temperature_c)
        {
            return Err(ConfigError::DuplicateTemperature {
                temperature_c: pair[0].temperature_c,
            });
        }

        let mut by_resistance = by_temperature.clone();
        by_resistance.sort_unstable_by(|a, b| a.resistance_ohms.total_cmp(&b.resistance_ohms));

        if let Some(pair) = by_resistance
            .windows(2)
            .find(|pair| pair[0].resistance_ohms == pair[1].resistance_ohms)
        {
            return Err(ConfigError::DuplicateResistance {
                resistance_ohms: pair[0].resistance_ohms,
            });
        }

        let rising = by_temperature[1].resistance_ohms > by_temperature[0].resistance_ohms;
        if by_temperature
            .windows(2)
            .any(|pair| (pair[1].resistance_ohms > pair[0].resistance_ohms) != rising)
        {
            return Err(ConfigError::NotMonotonic);
        }

        Ok(Self {
            temperature: Curve::from_sorted(
                by_resistance
                    .iter()
                    .map(|p| (p.resistance_ohms, p.temperature_c)),
            ),
            resistance: Curve::from_sorted(
                by_temperature
                    .iter()
                    .map(|p| (p.temperature_c, p.resistance_ohms)),
            ),
        })
    }

    /// Parse a tab-separated table and build the model from one column
    pub fn from_tsv(input: &str, column: &str, reference_ohms: f32) -> Result<Self, ConfigError> {
        let table = parse_table(input, column, reference_ohms)?;
        Self::load(&table)
    }

    /// Temperature (°C) for a resistance (Ω)
    pub fn temperature_from_resistance(&self, resistance_ohms: f32) -> Result<f32, CalibrationError> {
        self.temperature.eval(resistance_ohms)
    }

    /// Resistance (Ω) for a temperature (°C)
    pub fn resistance_from_temperature(&self, temperature_c: f32) -> Result<f32, CalibrationError> {
        self.resistance.eval(temperature_c)
    }

    /// Element-wise [`Self::temperature_from_resistance`]
    ///
    /// All inputs are bounds-checked before anything is written; on error
    /// `temperatures` is left untouched.
    pub fn temperatures_from_resistances(
        &self,
        resistances: &[f32],
        temperatures: &mut [f32],
    ) -> Result<(), CalibrationError> {
        eval_all(&self.temperature, resistances, temperatures)
    }

    /// Element-wise [`Self::resistance_from_temperature`]
    pub fn resistances_from_temperatures(
        &self,
        temperatures: &[f32],
        resistances: &mut [f32],
    ) -> Result<(), CalibrationError> {
        eval_all(&self.resistance, temperatures, resistances)
    }

    /// Valid resistance domain `(min, max)` in ohms
    pub fn resistance_bounds(&self) -> (f32, f32) {
        (self.temperature.min(), self.temperature.max())
    }

    /// Valid temperature domain `(min, max)` in °C
    pub fn temperature_bounds(&self) -> (f32, f32) {
        (self.resistance.min(), self.resistance.max())
    }
}

fn eval_all(curve: &Curve, input: &[f32], output: &mut [f32]) -> Result<(), CalibrationError> {
    if input.len() != output.len() {
        return Err(CalibrationError::ShapeMismatch {
            input: input.len(),
            output: output.len(),
        });
    }

    for &x in input {
        curve.check(x)?;
    }

    for (y, &x) in output.iter_mut().zip(input) {
        *y = curve.eval(x)?;
    }

    Ok(())
}
