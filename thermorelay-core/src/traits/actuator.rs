//! On/off actuator trait

/// A relay-like output with a commanded on/off state
///
/// `turn_on` and `turn_off` are idempotent with respect to `is_on`.
/// Implementations may re-issue the hardware write. They must not panic
/// or return errors when the hardware is unreachable; the commanded
/// state then simply stays as it was.
pub trait Actuator {
    /// Switch the actuator on
    fn turn_on(&mut self);

    /// Switch the actuator off (the safe state)
    fn turn_off(&mut self);

    /// Most recently commanded state, not a hardware read-back
    fn is_on(&self) -> bool;

    /// Digital pin identifying the physical output
    ///
    /// Entries sharing a pin share the physical actuator.
    fn pin(&self) -> u8;

    /// Set the state from a boolean
    fn set_on(&mut self, on: bool) {
        if on {
            self.turn_on();
        } else {
            self.turn_off();
        }
    }
}
