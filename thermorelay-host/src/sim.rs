//! Simulated bridge board
//!
//! Stands in for a real board link. Each configured analog pin sits on a
//! first-order thermal plant: it relaxes toward ambient and is pushed up
//! or down by the relays wired to it. A worker thread advances the plants
//! and emits ADC samples through the registered analog callbacks, the same
//! way a real bridge delivers them from its reader thread.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use thermorelay_core::calibration::CalibrationModel;
use thermorelay_core::config::{ControllerConfig, Polarity};
use thermorelay_core::control::ControlMode;
use thermorelay_core::divider::ResistanceEstimator;
use thermorelay_core::config::ConfigError;
use thermorelay_hal::{
    AnalogCallback, AnalogPin, AnalogSource, DigitalPin, HardwareLink, LinkError, PinWriter,
};

/// Time between two emitted samples
const SAMPLE_PERIOD: Duration = Duration::from_millis(50);

/// Room temperature the plants start at and relax toward (°C)
const AMBIENT_C: f32 = 20.0;

/// Heating or cooling rate of one active relay (°C/s)
const DRIVE_RATE_C_PER_S: f32 = 0.5;

/// Relaxation toward ambient (1/s)
const LEAK_PER_S: f32 = 0.02;

/// A relay acting on a plant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drive {
    pub pin: DigitalPin,
    pub polarity: Polarity,
    pub mode: ControlMode,
}

/// One thermistor and the relays acting on its temperature
#[derive(Debug, Clone)]
pub struct PlantConfig {
    pub sensor_pin: AnalogPin,
    pub estimator: ResistanceEstimator,
    pub drives: Vec<Drive>,
}

/// Everything the simulated board needs to open
#[derive(Clone)]
pub struct SimulationConfig {
    pub plants: Vec<PlantConfig>,
    pub model: Arc<CalibrationModel>,
    pub ambient_c: f32,
}

impl SimulationConfig {
    /// One plant per distinct analog pin of the controller config
    pub fn from_controller(
        config: &ControllerConfig,
        model: Arc<CalibrationModel>,
    ) -> Result<Self, ConfigError> {
        let mut plants: Vec<PlantConfig> = Vec::new();

        for l in &config.loops {
            let drive = Drive {
                pin: l.actuator_pin,
                polarity: l.polarity,
                mode: l.mode,
            };
            match plants.iter_mut().find(|p| p.sensor_pin == l.sensor_pin) {
                Some(plant) => plant.drives.push(drive),
                None => plants.push(PlantConfig {
                    sensor_pin: l.sensor_pin,
                    estimator: config.estimator_for(l)?,
                    drives: vec![drive],
                }),
            }
        }

        Ok(Self {
            plants,
            model,
            ambient_c: AMBIENT_C,
        })
    }
}

struct Plant {
    config: PlantConfig,
    temperature_c: f32,
}

struct BoardState {
    open: bool,
    plants: Vec<Plant>,
    model: Arc<CalibrationModel>,
    ambient_c: f32,
    /// Configured digital outputs and their current level
    outputs: HashMap<DigitalPin, bool>,
    callbacks: HashMap<AnalogPin, AnalogCallback>,
}

impl BoardState {
    fn new(config: &SimulationConfig) -> Self {
        Self {
            open: true,
            plants: config
                .plants
                .iter()
                .map(|p| Plant {
                    config: p.clone(),
                    temperature_c: config.ambient_c,
                })
                .collect(),
            model: config.model.clone(),
            ambient_c: config.ambient_c,
            outputs: HashMap::new(),
            callbacks: HashMap::new(),
        }
    }

    fn drive_active(&self, drive: &Drive) -> bool {
        self.outputs.get(&drive.pin) == Some(&drive.polarity.level(true))
    }

    /// Advance every plant by `dt_s` seconds
    fn step(&mut self, dt_s: f32) {
        for idx in 0..self.plants.len() {
            let power: f32 = self.plants[idx]
                .config
                .drives
                .iter()
                .filter(|d| self.drive_active(d))
                .map(|d| match d.mode {
                    ControlMode::Heating => DRIVE_RATE_C_PER_S,
                    ControlMode::Cooling => -DRIVE_RATE_C_PER_S,
                })
                .sum();

            let plant = &mut self.plants[idx];
            let leak = LEAK_PER_S * (plant.temperature_c - self.ambient_c);
            plant.temperature_c += (power - leak) * dt_s;
        }
    }

    /// ADC count currently seen on an analog pin
    fn sample(&self, pin: AnalogPin) -> Option<u16> {
        let plant = self.plants.iter().find(|p| p.config.sensor_pin == pin)?;
        let (t_min, t_max) = self.model.temperature_bounds();
        let t = plant.temperature_c.clamp(t_min, t_max);
        let resistance = self.model.resistance_from_temperature(t).ok()?;
        Some(plant.config.estimator.count_from_resistance(resistance))
    }

    /// Deliver one sample to every registered callback
    fn emit(&mut self) {
        let samples: Vec<(AnalogPin, u16)> = self
            .callbacks
            .keys()
            .filter_map(|&pin| self.sample(pin).map(|count| (pin, count)))
            .collect();

        for (pin, count) in samples {
            if let Some(callback) = self.callbacks.get_mut(&pin) {
                callback(count);
            }
        }
    }
}

/// In-process board implementing the full hardware link
pub struct SimulatedBoard {
    state: Arc<Mutex<BoardState>>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl SimulatedBoard {
    /// Power up the board and start emitting samples
    pub fn open(config: &SimulationConfig) -> Result<Self, LinkError> {
        let state = Arc::new(Mutex::new(BoardState::new(config)));
        let stop = Arc::new(AtomicBool::new(false));

        let worker = {
            let state = state.clone();
            let stop = stop.clone();
            thread::Builder::new()
                .name("sim-board".into())
                .spawn(move || run(state, stop))
                .map_err(|e| {
                    warn!("Cannot start simulated board: {}", e);
                    LinkError::Io
                })?
        };

        info!(
            "Simulated board online ({} plant(s), ambient {}°C)",
            config.plants.len(),
            config.ambient_c
        );

        Ok(Self {
            state,
            stop,
            worker: Some(worker),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, BoardState>, LinkError> {
        self.state.lock().map_err(|_| LinkError::Io)
    }

    fn lock_open(&self) -> Result<MutexGuard<'_, BoardState>, LinkError> {
        let state = self.lock()?;
        if !state.open {
            return Err(LinkError::Unavailable);
        }
        Ok(state)
    }
}

fn run(state: Arc<Mutex<BoardState>>, stop: Arc<AtomicBool>) {
    let mut last = Instant::now();

    while !stop.load(Ordering::Acquire) {
        thread::sleep(SAMPLE_PERIOD);
        let now = Instant::now();
        let dt_s = now.duration_since(last).as_secs_f32();
        last = now;

        match state.lock() {
            Ok(mut state) => {
                state.step(dt_s);
                state.emit();
            }
            Err(_) => {
                warn!("Simulated board state poisoned, stopping");
                break;
            }
        }
    }
}

impl PinWriter for SimulatedBoard {
    fn configure_digital_output(&mut self, pin: DigitalPin) -> Result<(), LinkError> {
        let mut state = self.lock_open()?;
        state.outputs.entry(pin).or_insert(false);
        debug!("sim: D{} configured as output", pin);
        Ok(())
    }

    fn write_digital(&mut self, pin: DigitalPin, level: bool) -> Result<(), LinkError> {
        let mut state = self.lock_open()?;
        match state.outputs.get_mut(&pin) {
            Some(current) => {
                *current = level;
                Ok(())
            }
            None => {
                warn!("sim: D{} is not configured as output", pin);
                Err(LinkError::Io)
            }
        }
    }
}

impl AnalogSource for SimulatedBoard {
    fn configure_analog_input(
        &mut self,
        pin: AnalogPin,
        on_change: AnalogCallback,
    ) -> Result<(), LinkError> {
        let mut state = self.lock_open()?;
        state.callbacks.insert(pin, on_change);
        debug!("sim: A{} configured as analog input", pin);
        Ok(())
    }
}

impl HardwareLink for SimulatedBoard {
    fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        self.stop.store(true, Ordering::Release);
        if worker.join().is_err() {
            warn!("Simulated board worker panicked");
        }
        if let Ok(mut state) = self.state.lock() {
            state.open = false;
            state.callbacks.clear();
        }
        info!("Simulated board offline");
    }
}

impl Drop for SimulatedBoard {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use thermorelay_core::calibration::CalibrationPoint;
    use thermorelay_core::divider::DividerTopology;

    fn config() -> SimulationConfig {
        let points = [
            CalibrationPoint::new(0.0, 33_621.0),
            CalibrationPoint::new(25.0, 10_000.0),
            CalibrationPoint::new(50.0, 3_588.0),
        ];
        let estimator =
            ResistanceEstimator::new(5.0, 5.0, 10, 10_000.0, DividerTopology::SensorTop).unwrap();

        SimulationConfig {
            plants: vec![PlantConfig {
                sensor_pin: 0,
                estimator,
                drives: vec![
                    Drive {
                        pin: 7,
                        polarity: Polarity::ActiveLow,
                        mode: ControlMode::Heating,
                    },
                    Drive {
                        pin: 8,
                        polarity: Polarity::ActiveHigh,
                        mode: ControlMode::Cooling,
                    },
                ],
            }],
            model: Arc::new(CalibrationModel::load(&points).unwrap()),
            ambient_c: 25.0,
        }
    }

    #[test]
    fn test_plant_relaxes_without_drive() {
        let mut state = BoardState::new(&config());
        state.step(10.0);
        assert_eq!(state.plants[0].temperature_c, 25.0);
    }

    #[test]
    fn test_active_low_heater_warms_plant() {
        let mut state = BoardState::new(&config());
        state.outputs.insert(7, true);
        state.step(1.0);
        assert_eq!(state.plants[0].temperature_c, 25.0);

        state.outputs.insert(7, false);
        state.step(1.0);
        assert!(state.plants[0].temperature_c > 25.0);
    }

    #[test]
    fn test_cooler_cools_plant() {
        let mut state = BoardState::new(&config());
        state.outputs.insert(8, true);
        state.step(2.0);
        assert!(state.plants[0].temperature_c < 25.0);
    }

    #[test]
    fn test_sample_at_reference_is_half_scale() {
        let state = BoardState::new(&config());
        // 10kΩ against a 10kΩ series resistor
        assert_eq!(state.sample(0), Some(512));
        assert_eq!(state.sample(3), None);
    }

    #[test]
    fn test_emit_calls_registered_callbacks() {
        let mut state = BoardState::new(&config());
        let (tx, rx) = mpsc::channel();
        state
            .callbacks
            .insert(0, Box::new(move |raw| tx.send(raw).unwrap()));

        state.emit();
        assert_eq!(rx.try_recv(), Ok(512));
    }

    #[test]
    fn test_board_streams_samples_until_shutdown() {
        let mut board = SimulatedBoard::open(&config()).unwrap();
        let (tx, rx) = mpsc::channel();
        board
            .configure_analog_input(0, Box::new(move |raw| {
                let _ = tx.send(raw);
            }))
            .unwrap();

        let raw = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!((500..=524).contains(&raw), "raw = {}", raw);

        board.shutdown();
        board.shutdown();
        assert_eq!(board.write_digital(7, true), Err(LinkError::Unavailable));
    }

    #[test]
    fn test_write_requires_configured_output() {
        let mut board = SimulatedBoard::open(&config()).unwrap();
        assert_eq!(board.write_digital(7, true), Err(LinkError::Io));

        board.configure_digital_output(7).unwrap();
        board.write_digital(7, false).unwrap();
        assert_eq!(board.lock().unwrap().outputs.get(&7), Some(&false));
    }
}
