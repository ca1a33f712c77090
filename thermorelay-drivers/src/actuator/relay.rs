//! Relay output
//!
//! Drives a relay (or SSR/MOSFET) from one digital pin of the bridged
//! board. The relay can be wired active-high or active-low; callers only
//! ever see the logical on/off state.

use log::{debug, warn};
use thermorelay_core::config::Polarity;
use thermorelay_core::traits::Actuator;
use thermorelay_hal::{DigitalPin, LinkError, PinWriter};

/// Relay on a digital output pin
///
/// Writes are fail-soft: if the link rejects a write, a warning is logged
/// and the commanded state stays what it was.
pub struct RelayOutput<W> {
    writer: W,
    pin: DigitalPin,
    polarity: Polarity,
    /// Current logical state (true = actuator on)
    on: bool,
}

impl<W: PinWriter> RelayOutput<W> {
    /// Create a relay output
    ///
    /// Configures the pin as an output and drives it to OFF once.
    ///
    /// # Arguments
    /// - `writer`: Digital output capability (usually a link handle)
    /// - `pin`: Digital pin the relay input is wired to
    /// - `polarity`: Which pin level switches the relay on
    pub fn new(writer: W, pin: DigitalPin, polarity: Polarity) -> Self {
        let mut relay = Self {
            writer,
            pin,
            polarity,
            on: false,
        };

        if let Err(e) = relay.writer.configure_digital_output(pin) {
            warn!("D{}: cannot configure output: {}", pin, e);
        }
        // Ensure relay starts off
        if let Err(e) = relay.write(false) {
            warn!("D{}: initial OFF failed: {}", pin, e);
        }
        relay
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Access the underlying writer
    pub fn writer(&self) -> &W {
        &self.writer
    }

    fn write(&mut self, on: bool) -> Result<(), LinkError> {
        let level = self.polarity.level(on);
        debug!("D{}: write {}", self.pin, if level { "HIGH" } else { "LOW" });
        self.writer.write_digital(self.pin, level)
    }

    fn command(&mut self, on: bool) {
        match self.write(on) {
            Ok(()) => self.on = on,
            Err(e) => warn!(
                "D{}: turn {} ignored: {}",
                self.pin,
                if on { "on" } else { "off" },
                e
            ),
        }
    }
}

impl<W: PinWriter> Actuator for RelayOutput<W> {
    fn turn_on(&mut self) {
        self.command(true);
    }

    fn turn_off(&mut self) {
        self.command(false);
    }

    fn is_on(&self) -> bool {
        self.on
    }

    fn pin(&self) -> u8 {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    /// Mock pin writer recording every write
    #[derive(Default)]
    struct MockWriter {
        configured: Vec<DigitalPin>,
        writes: Vec<(DigitalPin, bool)>,
        offline: bool,
    }

    impl PinWriter for MockWriter {
        fn configure_digital_output(&mut self, pin: DigitalPin) -> Result<(), LinkError> {
            if self.offline {
                return Err(LinkError::Unavailable);
            }
            self.configured.push(pin);
            Ok(())
        }

        fn write_digital(&mut self, pin: DigitalPin, level: bool) -> Result<(), LinkError> {
            if self.offline {
                return Err(LinkError::Unavailable);
            }
            self.writes.push((pin, level));
            Ok(())
        }
    }

    #[test]
    fn test_new_configures_and_drives_off() {
        let relay = RelayOutput::new(MockWriter::default(), 7, Polarity::ActiveHigh);
        assert!(!relay.is_on());
        assert_eq!(relay.writer().configured, [7]);
        assert_eq!(relay.writer().writes, [(7, false)]);
    }

    #[test]
    fn test_active_high_levels() {
        let mut relay = RelayOutput::new(MockWriter::default(), 7, Polarity::ActiveHigh);

        relay.turn_on();
        assert!(relay.is_on());
        relay.turn_off();
        assert!(!relay.is_on());

        assert_eq!(relay.writer().writes, [(7, false), (7, true), (7, false)]);
    }

    #[test]
    fn test_active_low_levels() {
        let mut relay = RelayOutput::new(MockWriter::default(), 4, Polarity::ActiveLow);

        // Initially off (pin is high for active-low)
        assert_eq!(relay.writer().writes, [(4, true)]);

        relay.turn_on();
        assert!(relay.is_on());
        assert_eq!(relay.writer().writes.last(), Some(&(4, false)));
    }

    #[test]
    fn test_turn_on_twice_is_idempotent() {
        let mut relay = RelayOutput::new(MockWriter::default(), 7, Polarity::ActiveHigh);

        relay.turn_on();
        relay.turn_on();
        assert!(relay.is_on());
        // The write is re-issued, state unchanged
        assert_eq!(relay.writer().writes, [(7, false), (7, true), (7, true)]);
    }

    #[test]
    fn test_unavailable_link_leaves_state() {
        let mut relay = RelayOutput::new(MockWriter::default(), 7, Polarity::ActiveHigh);
        relay.turn_on();
        assert!(relay.is_on());

        relay.writer.offline = true;
        relay.turn_off();
        assert!(relay.is_on());

        relay.writer.offline = false;
        relay.turn_off();
        assert!(!relay.is_on());
    }

    #[test]
    fn test_offline_at_construction_does_not_panic() {
        let writer = MockWriter {
            offline: true,
            ..Default::default()
        };
        let mut relay = RelayOutput::new(writer, 2, Polarity::ActiveHigh);
        assert!(!relay.is_on());

        relay.turn_on();
        assert!(!relay.is_on());
    }

    #[test]
    fn test_set_on_through_trait() {
        fn drive<A: Actuator>(a: &mut A) {
            assert!(!a.is_on());
            a.set_on(true);
            assert!(a.is_on());
        }

        let mut relay = RelayOutput::new(MockWriter::default(), 3, Polarity::ActiveHigh);
        drive(&mut relay);
    }
}
