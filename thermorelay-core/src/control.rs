//! Threshold rule with minimum dwell time
//!
//! Each control entry switches its actuator on one side of a threshold
//! and off on the other. A toggle is only allowed once `min_dwell_ms`
//! has passed since the previous toggle, which keeps relays from
//! chattering while the reading hovers around the threshold.
//!
//! | Mode    | OFF -> ON            | ON -> OFF             |
//! |---------|----------------------|-----------------------|
//! | Heating | `t < threshold`      | `t >= threshold`      |
//! | Cooling | `t > threshold`      | `t <= threshold`      |

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which side of the threshold the actuator works on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ControlMode {
    /// Actuator raises temperature; on below threshold
    Heating,
    /// Actuator lowers temperature; on above threshold
    Cooling,
}

impl ControlMode {
    /// Whether the actuator should be on at this temperature
    pub fn wants_on(&self, temperature_c: f32, threshold_c: f32) -> bool {
        match self {
            ControlMode::Heating => temperature_c < threshold_c,
            ControlMode::Cooling => temperature_c > threshold_c,
        }
    }

    /// Actuator label used in logs
    pub fn label(&self) -> &'static str {
        match self {
            ControlMode::Heating => "Heater",
            ControlMode::Cooling => "Cooler",
        }
    }
}

/// Outcome of evaluating a rule for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// Keep the current state
    Hold,
    /// Switch the actuator on
    TurnOn,
    /// Switch the actuator off
    TurnOff,
}

/// Per-entry threshold rule and debounce state
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThresholdRule {
    mode: ControlMode,
    threshold_c: f32,
    min_dwell_ms: u64,
    /// Tick time of the last toggle, None until the first one
    last_toggle_ms: Option<u64>,
}

impl ThresholdRule {
    pub fn new(mode: ControlMode, threshold_c: f32, min_dwell_ms: u64) -> Self {
        Self {
            mode,
            threshold_c,
            min_dwell_ms,
            last_toggle_ms: None,
        }
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn threshold_c(&self) -> f32 {
        self.threshold_c
    }

    pub fn last_toggle_ms(&self) -> Option<u64> {
        self.last_toggle_ms
    }

    /// Whether the dwell time since the last toggle has elapsed
    pub fn guard_holds(&self, now_ms: u64) -> bool {
        match self.last_toggle_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.min_dwell_ms,
        }
    }

    /// Decide what to do with the actuator at `now_ms`
    ///
    /// Does not record anything; call [`Self::mark_toggled`] once the
    /// actuator has actually changed state.
    pub fn decide(&self, temperature_c: f32, is_on: bool, now_ms: u64) -> Transition {
        if !self.guard_holds(now_ms) {
            return Transition::Hold;
        }

        match (is_on, self.mode.wants_on(temperature_c, self.threshold_c)) {
            (false, true) => Transition::TurnOn,
            (true, false) => Transition::TurnOff,
            _ => Transition::Hold,
        }
    }

    /// Record a toggle at `now_ms`, starting a new dwell period
    pub fn mark_toggled(&mut self, now_ms: u64) {
        self.last_toggle_ms = Some(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heating_rule() {
        let rule = ThresholdRule::new(ControlMode::Heating, 25.0, 0);
        assert_eq!(rule.decide(24.9, false, 0), Transition::TurnOn);
        assert_eq!(rule.decide(24.9, true, 0), Transition::Hold);
        assert_eq!(rule.decide(25.0, true, 0), Transition::TurnOff);
        assert_eq!(rule.decide(25.0, false, 0), Transition::Hold);
    }

    #[test]
    fn test_cooling_rule() {
        let rule = ThresholdRule::new(ControlMode::Cooling, 26.0, 0);
        assert_eq!(rule.decide(26.1, false, 0), Transition::TurnOn);
        assert_eq!(rule.decide(26.0, false, 0), Transition::Hold);
        assert_eq!(rule.decide(26.0, true, 0), Transition::TurnOff);
        assert_eq!(rule.decide(30.0, true, 0), Transition::Hold);
    }

    #[test]
    fn test_first_toggle_is_not_debounced() {
        let rule = ThresholdRule::new(ControlMode::Heating, 25.0, 5_000);
        assert!(rule.guard_holds(0));
        assert_eq!(rule.decide(20.0, false, 0), Transition::TurnOn);
    }

    #[test]
    fn test_dwell_suppresses_second_crossing() {
        let mut rule = ThresholdRule::new(ControlMode::Heating, 25.0, 5_000);

        assert_eq!(rule.decide(24.0, false, 10_000), Transition::TurnOn);
        rule.mark_toggled(10_000);

        // Reading crosses back 1s later: suppressed
        assert_eq!(rule.decide(26.0, true, 11_000), Transition::Hold);
        assert_eq!(rule.decide(26.0, true, 14_999), Transition::Hold);

        // Allowed once 5s have elapsed since the toggle
        assert_eq!(rule.decide(26.0, true, 15_000), Transition::TurnOff);
    }

    #[test]
    fn test_clock_going_backwards_holds() {
        let mut rule = ThresholdRule::new(ControlMode::Cooling, 20.0, 1_000);
        rule.mark_toggled(5_000);
        assert!(!rule.guard_holds(4_000));
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(ControlMode::Heating.label(), "Heater");
        assert_eq!(ControlMode::Cooling.label(), "Cooler");
    }
}
