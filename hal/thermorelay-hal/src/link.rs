//! Board link abstraction

use core::fmt;

use crate::analog::AnalogSource;
use crate::gpio::PinWriter;

/// Errors reported by the hardware link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Link is not open (never opened, shut down, or dropped by the board)
    Unavailable,
    /// Transport failure while talking to the board
    Io,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::Unavailable => f.write_str("hardware link unavailable"),
            LinkError::Io => f.write_str("hardware link I/O error"),
        }
    }
}

/// A complete link to one bridged board
///
/// Calls are only meaningful while the link is open. `shutdown` must be
/// idempotent: the second and later calls do nothing.
pub trait HardwareLink: PinWriter + AnalogSource {
    /// Close the link and release the transport
    fn shutdown(&mut self);
}
