//! Component construction
//!
//! Turns a validated [`ControllerConfig`] into live components sharing one
//! hardware link:
//!
//! - one [`ThermistorReader`] per distinct analog pin, attached to the link
//! - one [`RelayOutput`] per loop
//! - one [`ThresholdLoop`] entry per loop

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::info;

use thermorelay_core::calibration::CalibrationModel;
use thermorelay_core::config::ControllerConfig;
use thermorelay_core::control::ThresholdRule;
use thermorelay_core::smoothing::SampleSmoother;
use thermorelay_drivers::actuator::RelayOutput;
use thermorelay_drivers::control::{ControlEntry, ThresholdLoop};
use thermorelay_drivers::link::{LinkHandle, LinkManager};
use thermorelay_drivers::sensor::{ReadingHandle, ThermistorReader};
use thermorelay_hal::{AnalogPin, HardwareLink};

/// Relay driven through a share of the link
pub type Relay<L> = RelayOutput<LinkHandle<L>>;

/// Everything the control task runs
///
/// Fields drop in declaration order: the control loop shuts its relays
/// off before the sensor shares of the link are released.
pub struct Controller<L: HardwareLink + Send> {
    pub control: ThresholdLoop<ReadingHandle, Relay<L>>,
    /// Link shares held on behalf of the attached sensor callbacks
    pub sensor_links: Vec<LinkHandle<L>>,
}

/// Build all components for `config`
pub fn build<L: HardwareLink + Send>(
    config: &ControllerConfig,
    model: Arc<CalibrationModel>,
    manager: &Arc<LinkManager<L>>,
) -> Result<Controller<L>> {
    let names = config.resolved_names();
    let dwell_ms = config.min_dwell_ms();

    let mut readings: Vec<(AnalogPin, ReadingHandle)> = Vec::new();
    let mut sensor_links = Vec::new();
    let mut control = ThresholdLoop::new();

    for (l, name) in config.loops.iter().zip(names) {
        let reading = match readings.iter().find(|(pin, _)| *pin == l.sensor_pin) {
            Some((_, reading)) => reading.clone(),
            None => {
                let estimator = config
                    .estimator_for(l)
                    .map_err(|e| anyhow!("{}: {}", name, e))?;
                let smoother =
                    SampleSmoother::new(l.window).map_err(|e| anyhow!("{}: {}", name, e))?;
                let reader =
                    ThermistorReader::new(l.sensor_pin, model.clone(), estimator, smoother);

                let mut link = acquire(manager).with_context(|| format!("sensor A{}", l.sensor_pin))?;
                let reading = reader
                    .attach(&mut link)
                    .map_err(|e| anyhow!("cannot attach sensor A{}: {}", l.sensor_pin, e))?;

                sensor_links.push(link);
                readings.push((l.sensor_pin, reading.clone()));
                reading
            }
        };

        let link = acquire(manager).with_context(|| format!("relay D{}", l.actuator_pin))?;
        let relay = RelayOutput::new(link, l.actuator_pin, l.polarity);
        let rule = ThresholdRule::new(l.mode, l.threshold_c, dwell_ms);

        info!(
            "{}: {} on D{} at {}°C from A{}",
            name,
            l.mode.label(),
            l.actuator_pin,
            l.threshold_c,
            l.sensor_pin
        );
        control
            .add(ControlEntry::new(name, reading, relay, rule))
            .map_err(|e| anyhow!("{}", e))?;
    }

    Ok(Controller {
        control,
        sensor_links,
    })
}

fn acquire<L: HardwareLink + Send>(manager: &Arc<LinkManager<L>>) -> Result<LinkHandle<L>> {
    manager
        .acquire()
        .map_err(|e| anyhow!("cannot open hardware link: {}", e))
}
