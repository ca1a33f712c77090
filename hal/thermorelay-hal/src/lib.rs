//! Thermorelay Hardware Abstraction Layer
//!
//! This crate defines the capabilities the controller consumes from the
//! microcontroller I/O bridge. The transport behind them (serial link,
//! network link, pin-mode configuration, callback delivery) lives in the
//! implementing crate.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (thermorelay-host, etc.)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  thermorelay-hal (this crate - traits)  │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ serial bridge │       │  simulated    │
//! │    link       │       │    board      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`analog::AnalogSource`] - Analog inputs with value-change callbacks
//! - [`gpio::PinWriter`] - Digital outputs
//! - [`link::HardwareLink`] - A whole board link, with idempotent shutdown

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod analog;
pub mod gpio;
pub mod link;

// Re-export key traits at crate root for convenience
pub use analog::{AnalogCallback, AnalogPin, AnalogSource};
pub use gpio::{DigitalPin, PinWriter};
pub use link::{HardwareLink, LinkError};
