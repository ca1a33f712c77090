//! Temperature sensor implementations

pub mod reading;
pub mod thermistor;

pub use reading::{ReadingCell, ReadingHandle};
pub use thermistor::ThermistorReader;
