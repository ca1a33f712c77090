//! Control-side abstractions
//!
//! These traits define the interface between the threshold control loop
//! and the sensor/actuator implementations.

pub mod actuator;
pub mod sensor;

pub use actuator::Actuator;
pub use sensor::TemperatureSource;
