//! Configuration loading
//!
//! Reads the controller configuration from a TOML file and the
//! calibration table it points to.

pub mod calibration;
pub mod loader;

pub use calibration::load_calibration;
pub use loader::load_config;
