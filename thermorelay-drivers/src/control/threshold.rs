//! Threshold control loop
//!
//! Polls every entry's sensor on the caller's cadence and switches its
//! actuator according to the entry's [`ThresholdRule`]. Entries are
//! independent: an unavailable reading on one entry only skips that entry
//! for the tick.

use heapless::Vec;
use log::{debug, info, warn};
use thermorelay_core::config::{ConfigError, Label, MAX_LOOPS};
use thermorelay_core::control::{ThresholdRule, Transition};
use thermorelay_core::traits::{Actuator, TemperatureSource};

/// One sensor / actuator / rule triple
pub struct ControlEntry<S, A> {
    name: Label,
    sensor: S,
    actuator: A,
    rule: ThresholdRule,
}

impl<S: TemperatureSource, A: Actuator> ControlEntry<S, A> {
    pub fn new(name: Label, sensor: S, actuator: A, rule: ThresholdRule) -> Self {
        Self {
            name,
            sensor,
            actuator,
            rule,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn rule(&self) -> &ThresholdRule {
        &self.rule
    }

    fn tick(&mut self, now_ms: u64) {
        let Some(temperature) = self.sensor.temperature() else {
            warn!("{} - Temperature unavailable, skipping", self.name);
            return;
        };
        info!("{} - Temperature: {:.2}°C", self.name, temperature);

        let was_on = self.actuator.is_on();
        match self.rule.decide(temperature, was_on, now_ms) {
            Transition::Hold => return,
            Transition::TurnOn => self.actuator.turn_on(),
            Transition::TurnOff => self.actuator.turn_off(),
        }

        let is_on = self.actuator.is_on();
        if is_on != was_on {
            self.rule.mark_toggled(now_ms);
            info!(
                "{} - {} {}",
                self.name,
                self.rule.mode().label(),
                if is_on { "ON" } else { "OFF" }
            );
        }
    }
}

/// Polling loop over a fixed set of control entries
///
/// Dropping the loop runs [`ThresholdLoop::shutdown`] if it has not run yet.
pub struct ThresholdLoop<S: TemperatureSource, A: Actuator> {
    entries: Vec<ControlEntry<S, A>, MAX_LOOPS>,
    shut_down: bool,
}

impl<S: TemperatureSource, A: Actuator> ThresholdLoop<S, A> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            shut_down: false,
        }
    }

    /// Add an entry
    pub fn add(&mut self, entry: ControlEntry<S, A>) -> Result<(), ConfigError> {
        debug!("Control entry {} on D{}", entry.name, entry.actuator.pin());
        self.entries
            .push(entry)
            .map_err(|_| ConfigError::TooManyLoops)
    }

    pub fn entries(&self) -> &[ControlEntry<S, A>] {
        &self.entries
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Evaluate every entry once at tick time `now_ms`
    ///
    /// Does nothing after shutdown.
    pub fn tick(&mut self, now_ms: u64) {
        if self.shut_down {
            return;
        }
        for entry in self.entries.iter_mut() {
            entry.tick(now_ms);
        }
    }

    /// Force every actuator OFF
    ///
    /// Each distinct pin is commanded once, even when several entries
    /// share it. Later calls do nothing.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        let mut done: Vec<u8, MAX_LOOPS> = Vec::new();
        for entry in self.entries.iter_mut() {
            let pin = entry.actuator.pin();
            if done.contains(&pin) {
                continue;
            }
            // Capacity matches the entry list
            let _ = done.push(pin);

            entry.actuator.turn_off();
            info!("{} - {} OFF (shutdown)", entry.name, entry.rule.mode().label());
        }
    }
}

impl<S: TemperatureSource, A: Actuator> Default for ThresholdLoop<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TemperatureSource, A: Actuator> Drop for ThresholdLoop<S, A> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
