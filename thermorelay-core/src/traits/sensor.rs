//! Temperature source trait

/// Last known temperature of one sensor
///
/// Reading never blocks and never triggers a new sample: samples arrive
/// on their own schedule and the source only reports the latest derived
/// value.
pub trait TemperatureSource {
    /// Last computed temperature in °C, or `None` while unavailable
    fn temperature(&self) -> Option<f32>;
}

impl<T: TemperatureSource + ?Sized> TemperatureSource for &T {
    fn temperature(&self) -> Option<f32> {
        (**self).temperature()
    }
}
