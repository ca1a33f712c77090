//! Board-agnostic core logic for the thermistor threshold controller
//!
//! This crate contains all logic that does not depend on a specific
//! hardware link:
//!
//! - Calibration model (resistance <-> temperature interpolation)
//! - Sample smoothing over a bounded window
//! - Voltage divider resistance estimation
//! - Threshold rule with minimum dwell time
//! - Control-side traits (temperature source, actuator)
//! - Configuration type definitions and validation

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod calibration;
pub mod config;
pub mod control;
pub mod divider;
pub mod smoothing;
pub mod traits;
