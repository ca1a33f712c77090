//! Hardware-facing implementations
//!
//! This crate implements the traits defined in thermorelay-core on top of
//! the capabilities defined in thermorelay-hal:
//!
//! - Thermistor reader (callback-driven sampling, last-value cell)
//! - Relay output (polarity-aware, fail-soft digital output)
//! - Reference-counted hardware link manager
//! - Threshold control loop with dwell-time debounce

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod actuator;
pub mod control;
pub mod link;
pub mod sensor;
