//! Analog input abstractions
//!
//! Analog samples are pushed by the bridge: configuring an input registers
//! a callback that receives every new raw ADC count, in arrival order, from
//! whatever context the transport delivers it on.

use alloc::boxed::Box;

use crate::link::LinkError;

/// Analog pin number on the bridged board (A0 = 0)
pub type AnalogPin = u8;

/// Value-change callback receiving a raw ADC count
pub type AnalogCallback = Box<dyn FnMut(u16) + Send>;

/// Analog input capability
pub trait AnalogSource {
    /// Configure a pin as analog input and register its change callback
    ///
    /// Configuring the same pin again replaces the previous callback.
    fn configure_analog_input(
        &mut self,
        pin: AnalogPin,
        on_change: AnalogCallback,
    ) -> Result<(), LinkError>;
}
