//! Voltage divider resistance estimation
//!
//! The thermistor forms a divider with a fixed series resistor across the
//! supply. The ADC measures the node between them:
//!
//! ```text
//! SensorTop:    VCC -- R_sensor -- node -- R_series -- GND
//! SensorBottom: VCC -- R_series -- node -- R_sensor -- GND
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Highest supported ADC resolution
pub const MAX_ADC_BITS: u8 = 16;

/// Position of the sensor in the divider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DividerTopology {
    /// Sensor between supply and the measured node
    SensorTop,
    /// Sensor between the measured node and ground
    SensorBottom,
}

/// Converts averaged ADC counts into sensor resistance
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResistanceEstimator {
    /// Divider supply voltage (V)
    supply_v: f32,
    /// ADC full-scale voltage (V)
    reference_v: f32,
    /// Highest ADC count, 2^bits - 1
    full_scale: u32,
    /// Fixed series resistor (Ω)
    series_ohms: f32,
    topology: DividerTopology,
}

impl ResistanceEstimator {
    /// Create an estimator
    ///
    /// # Arguments
    /// - `supply_v`: Divider supply voltage (5.0 on a 5V board)
    /// - `reference_v`: ADC full-scale voltage
    /// - `adc_bits`: ADC resolution (10 on most AVR boards)
    /// - `series_ohms`: Fixed resistor value
    /// - `topology`: Where the sensor sits in the divider
    pub fn new(
        supply_v: f32,
        reference_v: f32,
        adc_bits: u8,
        series_ohms: f32,
        topology: DividerTopology,
    ) -> Result<Self, ConfigError> {
        if !(supply_v > 0.0 && supply_v.is_finite() && reference_v > 0.0 && reference_v.is_finite())
        {
            return Err(ConfigError::InvalidVoltage);
        }
        if adc_bits == 0 || adc_bits > MAX_ADC_BITS {
            return Err(ConfigError::InvalidAdcBits { bits: adc_bits });
        }
        if !(series_ohms > 0.0 && series_ohms.is_finite()) {
            return Err(ConfigError::InvalidSeriesResistor);
        }

        Ok(Self {
            supply_v,
            reference_v,
            full_scale: (1u32 << adc_bits) - 1,
            series_ohms,
            topology,
        })
    }

    /// Highest ADC count
    pub fn full_scale(&self) -> u32 {
        self.full_scale
    }

    pub fn topology(&self) -> DividerTopology {
        self.topology
    }

    /// Node voltage for an (averaged) ADC count
    pub fn voltage(&self, adc_count: f32) -> f32 {
        adc_count * self.reference_v / self.full_scale as f32
    }

    /// Sensor resistance (Ω) for an averaged ADC count
    ///
    /// A node voltage at 0 V or at the supply voltage means an open or
    /// shorted sensor. Both return `f32::INFINITY`, which the calibration
    /// model then reports as out of domain.
    pub fn resistance(&self, adc_count: f32) -> f32 {
        let voltage = self.voltage(adc_count);
        if !(voltage > 0.0 && voltage < self.supply_v) {
            return f32::INFINITY;
        }

        match self.topology {
            DividerTopology::SensorTop => self.series_ohms * (self.supply_v - voltage) / voltage,
            DividerTopology::SensorBottom => {
                self.series_ohms * voltage / (self.supply_v - voltage)
            }
        }
    }

    /// ADC count a sensor of the given resistance would produce
    ///
    /// Inverse of [`Self::resistance`], rounded to the nearest count and
    /// clamped to the ADC range. Infinite resistance maps to the open
    /// sensor end of the range.
    pub fn count_from_resistance(&self, resistance_ohms: f32) -> u16 {
        let fraction = if resistance_ohms.is_infinite() {
            match self.topology {
                DividerTopology::SensorTop => 0.0,
                DividerTopology::SensorBottom => 1.0,
            }
        } else {
            let total = resistance_ohms + self.series_ohms;
            match self.topology {
                DividerTopology::SensorTop => self.series_ohms / total,
                DividerTopology::SensorBottom => resistance_ohms / total,
            }
        };

        let voltage = self.supply_v * fraction;
        let count = voltage * self.full_scale as f32 / self.reference_v + 0.5;
        if count <= 0.0 {
            0
        } else if count >= self.full_scale as f32 {
            self.full_scale as u16
        } else {
            count as u16
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arduino(topology: DividerTopology) -> ResistanceEstimator {
        ResistanceEstimator::new(5.0, 5.0, 10, 10_000.0, topology).unwrap()
    }

    #[test]
    fn test_half_scale_sensor_top() {
        let est = arduino(DividerTopology::SensorTop);
        assert!((est.voltage(512.0) - 2.5).abs() < 0.01);
        let r = est.resistance(512.0);
        assert!((r - 10_000.0).abs() < 50.0, "r = {}", r);
    }

    #[test]
    fn test_topologies_are_reciprocal() {
        let top = arduino(DividerTopology::SensorTop);
        let bottom = arduino(DividerTopology::SensorBottom);

        // Node at 1/5 of supply: sensor carries 4/5 (top) or 1/5 (bottom)
        let count = 1023.0 / 5.0;
        assert!((top.resistance(count) - 40_000.0).abs() < 1.0);
        assert!((bottom.resistance(count) - 2_500.0).abs() < 1.0);
    }

    #[test]
    fn test_rails_are_infinite() {
        for topology in [DividerTopology::SensorTop, DividerTopology::SensorBottom] {
            let est = arduino(topology);
            assert_eq!(est.resistance(0.0), f32::INFINITY);
            assert_eq!(est.resistance(1023.0), f32::INFINITY);
        }
    }

    #[test]
    fn test_reference_below_supply() {
        // 3.3V ADC reference on a 5V divider: full scale never reaches supply
        let est =
            ResistanceEstimator::new(5.0, 3.3, 12, 4_700.0, DividerTopology::SensorBottom).unwrap();
        assert_eq!(est.full_scale(), 4095);
        assert!(est.resistance(4095.0).is_finite());
    }

    #[test]
    fn test_count_from_resistance_inverts() {
        for topology in [DividerTopology::SensorTop, DividerTopology::SensorBottom] {
            let est = arduino(topology);
            for r in [1_000.0, 10_000.0, 33_000.0] {
                let count = est.count_from_resistance(r);
                let back = est.resistance(count as f32);
                // One count of quantisation
                assert!((back - r).abs() / r < 0.05, "{:?} {} -> {} -> {}", topology, r, count, back);
            }
        }

        assert_eq!(arduino(DividerTopology::SensorTop).count_from_resistance(f32::INFINITY), 0);
        assert_eq!(
            arduino(DividerTopology::SensorBottom).count_from_resistance(f32::INFINITY),
            1023
        );
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(
            ResistanceEstimator::new(0.0, 5.0, 10, 1.0, DividerTopology::SensorTop),
            Err(ConfigError::InvalidVoltage)
        );
        assert_eq!(
            ResistanceEstimator::new(5.0, 5.0, 17, 1.0, DividerTopology::SensorTop),
            Err(ConfigError::InvalidAdcBits { bits: 17 })
        );
        assert_eq!(
            ResistanceEstimator::new(5.0, 5.0, 10, -1.0, DividerTopology::SensorTop),
            Err(ConfigError::InvalidSeriesResistor)
        );
    }
}
