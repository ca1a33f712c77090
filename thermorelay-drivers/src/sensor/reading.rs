//! Last-value temperature cell
//!
//! The ingestion path (hardware callbacks) is the only writer and the
//! control loop only reads, so the latest reading is published through a
//! single atomic word holding the `f32` bit pattern. NaN marks an
//! unavailable reading.

use alloc::sync::Arc;

use portable_atomic::{AtomicU32, Ordering};
use thermorelay_core::traits::TemperatureSource;

const UNAVAILABLE: u32 = 0x7fc0_0000; // f32::NAN

/// Atomically swapped last temperature
#[derive(Debug)]
pub struct ReadingCell {
    bits: AtomicU32,
}

impl Default for ReadingCell {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingCell {
    /// Create a cell with no reading
    pub const fn new() -> Self {
        Self {
            bits: AtomicU32::new(UNAVAILABLE),
        }
    }

    /// Publish a reading, `None` marks it unavailable
    pub fn store(&self, temperature_c: Option<f32>) {
        let bits = match temperature_c {
            Some(t) if !t.is_nan() => t.to_bits(),
            _ => UNAVAILABLE,
        };
        self.bits.store(bits, Ordering::Release);
    }

    /// Latest published reading
    pub fn load(&self) -> Option<f32> {
        let value = f32::from_bits(self.bits.load(Ordering::Acquire));
        if value.is_nan() {
            None
        } else {
            Some(value)
        }
    }
}

/// Read side of a sensor's reading cell
///
/// Cheap to clone; several control entries may watch one sensor.
#[derive(Debug, Clone)]
pub struct ReadingHandle {
    cell: Arc<ReadingCell>,
}

impl ReadingHandle {
    pub(crate) fn new(cell: Arc<ReadingCell>) -> Self {
        Self { cell }
    }

    /// Last computed temperature in °C, `None` while unavailable
    pub fn get_temperature(&self) -> Option<f32> {
        self.cell.load()
    }
}

impl TemperatureSource for ReadingHandle {
    fn temperature(&self) -> Option<f32> {
        self.get_temperature()
    }
}
