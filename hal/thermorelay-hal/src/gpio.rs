//! Digital output abstractions
//!
//! The bridge exposes digital pins by number; a pin has to be configured
//! as an output before levels can be written to it.

use crate::link::LinkError;

/// Digital pin number on the bridged board
pub type DigitalPin = u8;

/// Digital output capability
///
/// There is no read-back: callers track the level they last commanded.
pub trait PinWriter {
    /// Configure a pin as a digital output
    fn configure_digital_output(&mut self, pin: DigitalPin) -> Result<(), LinkError>;

    /// Write a logic level to a configured output pin
    fn write_digital(&mut self, pin: DigitalPin, level: bool) -> Result<(), LinkError>;

    /// Drive the pin high (logic 1)
    fn set_high(&mut self, pin: DigitalPin) -> Result<(), LinkError> {
        self.write_digital(pin, true)
    }

    /// Drive the pin low (logic 0)
    fn set_low(&mut self, pin: DigitalPin) -> Result<(), LinkError> {
        self.write_digital(pin, false)
    }
}

impl<T: PinWriter + ?Sized> PinWriter for &mut T {
    fn configure_digital_output(&mut self, pin: DigitalPin) -> Result<(), LinkError> {
        (**self).configure_digital_output(pin)
    }

    fn write_digital(&mut self, pin: DigitalPin, level: bool) -> Result<(), LinkError> {
        (**self).write_digital(pin, level)
    }
}
