//! Callback-driven thermistor reader
//!
//! Each raw sample delivered by the bridge goes through the same chain:
//! smoothing window -> divider estimate -> calibration curve. The result
//! is published to a [`ReadingCell`]; lookup failures publish
//! "unavailable" and are logged instead of being raised, so a transient
//! out-of-range sample never reaches the control loop as an error.

use alloc::boxed::Box;
use alloc::sync::Arc;

use log::{debug, warn};
use thermorelay_core::calibration::CalibrationModel;
use thermorelay_core::divider::ResistanceEstimator;
use thermorelay_core::smoothing::SampleSmoother;
use thermorelay_core::traits::TemperatureSource;
use thermorelay_hal::{AnalogPin, AnalogSource, LinkError};

use super::reading::{ReadingCell, ReadingHandle};

/// Thermistor on one analog channel
pub struct ThermistorReader {
    channel: AnalogPin,
    smoother: SampleSmoother,
    estimator: ResistanceEstimator,
    model: Arc<CalibrationModel>,
    cell: Arc<ReadingCell>,
}

impl ThermistorReader {
    /// Create a reader
    ///
    /// # Arguments
    /// - `channel`: Analog pin the divider node is wired to
    /// - `model`: Calibration curve of the probe, shareable between readers
    /// - `estimator`: Divider parameters
    /// - `smoother`: Sample window
    pub fn new(
        channel: AnalogPin,
        model: Arc<CalibrationModel>,
        estimator: ResistanceEstimator,
        smoother: SampleSmoother,
    ) -> Self {
        Self {
            channel,
            smoother,
            estimator,
            model,
            cell: Arc::new(ReadingCell::new()),
        }
    }

    pub fn channel(&self) -> AnalogPin {
        self.channel
    }

    /// Read side of this sensor's reading
    pub fn handle(&self) -> ReadingHandle {
        ReadingHandle::new(self.cell.clone())
    }

    /// Register this reader as the channel's value-change callback
    ///
    /// The reader moves into the callback; the returned handle is how the
    /// control loop sees its readings from then on.
    pub fn attach<A: AnalogSource + ?Sized>(self, source: &mut A) -> Result<ReadingHandle, LinkError> {
        let handle = self.handle();
        let channel = self.channel;
        let mut reader = self;

        source.configure_analog_input(channel, Box::new(move |raw| reader.ingest(raw)))?;
        debug!("A{}: thermistor reader attached", channel);

        Ok(handle)
    }

    /// Ingest one raw ADC count and publish the updated temperature
    pub fn ingest(&mut self, raw: u16) {
        debug!("A{}: raw sample {}", self.channel, raw);
        self.smoother.push(raw);

        let temperature = self.compute();
        self.cell.store(temperature);
    }

    /// Last computed temperature in °C, `None` while unavailable
    pub fn get_temperature(&self) -> Option<f32> {
        self.cell.load()
    }

    fn compute(&self) -> Option<f32> {
        let average = match self.smoother.average() {
            Ok(average) => average,
            Err(e) => {
                warn!("A{}: {}", self.channel, e);
                return None;
            }
        };

        let resistance = self.estimator.resistance(average);
        match self.model.temperature_from_resistance(resistance) {
            Ok(temperature) => {
                debug!(
                    "A{}: avg {:.1}, {:.2}V, {:.0}Ω, {:.2}°C",
                    self.channel,
                    average,
                    self.estimator.voltage(average),
                    resistance,
                    temperature
                );
                Some(temperature)
            }
            Err(e) => {
                warn!("A{}: temperature unavailable: {}", self.channel, e);
                None
            }
        }
    }
}

impl TemperatureSource for ThermistorReader {
    fn temperature(&self) -> Option<f32> {
        self.get_temperature()
    }
}
