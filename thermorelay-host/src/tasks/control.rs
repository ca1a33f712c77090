//! Control loop task
//!
//! Ticks the threshold loop on a fixed cadence, independent of how often
//! the board delivers samples, until the shutdown future completes. The
//! loop's safe shutdown always runs before the task returns.

use std::future::Future;
use std::time::Duration;

use log::info;
use tokio::time::{self, Instant, MissedTickBehavior};

use thermorelay_core::traits::{Actuator, TemperatureSource};
use thermorelay_drivers::control::ThresholdLoop;

/// Run `control` every `period` until `shutdown` resolves
///
/// Tick times passed to the loop are milliseconds since the task started.
pub async fn control_task<S, A, F>(control: &mut ThresholdLoop<S, A>, period: Duration, shutdown: F)
where
    S: TemperatureSource,
    A: Actuator,
    F: Future<Output = ()>,
{
    let start = Instant::now();
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    info!("Control loop started ({} ms period)", period.as_millis());

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                let now_ms = start.elapsed().as_millis() as u64;
                control.tick(now_ms);
            }
        }
    }

    info!("Control loop stopping");
    control.shutdown();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use heapless::String;
    use thermorelay_core::control::{ControlMode, ThresholdRule};
    use thermorelay_drivers::control::ControlEntry;

    #[derive(Clone, Default)]
    struct CountingSensor {
        reads: Rc<Cell<usize>>,
    }

    impl TemperatureSource for CountingSensor {
        fn temperature(&self) -> Option<f32> {
            self.reads.set(self.reads.get() + 1);
            Some(20.0)
        }
    }

    struct TraceActuator {
        on: bool,
        trace: Rc<RefCell<Vec<bool>>>,
    }

    impl Actuator for TraceActuator {
        fn turn_on(&mut self) {
            self.on = true;
            self.trace.borrow_mut().push(true);
        }

        fn turn_off(&mut self) {
            self.on = false;
            self.trace.borrow_mut().push(false);
        }

        fn is_on(&self) -> bool {
            self.on
        }

        fn pin(&self) -> u8 {
            7
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_until_shutdown_then_turns_off() {
        let sensor = CountingSensor::default();
        let trace = Rc::new(RefCell::new(Vec::new()));

        let mut control = ThresholdLoop::new();
        control
            .add(ControlEntry::new(
                String::try_from("heater1").unwrap(),
                sensor.clone(),
                TraceActuator {
                    on: false,
                    trace: trace.clone(),
                },
                ThresholdRule::new(ControlMode::Heating, 25.0, 5_000),
            ))
            .unwrap();

        control_task(
            &mut control,
            Duration::from_millis(500),
            time::sleep(Duration::from_millis(1_200)),
        )
        .await;

        // Ticks at 0, 500 and 1000 ms
        assert_eq!(sensor.reads.get(), 3);
        assert!(control.is_shut_down());
        assert_eq!(*trace.borrow(), [true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_shutdown_still_runs_safe_shutdown() {
        let sensor = CountingSensor::default();
        let trace = Rc::new(RefCell::new(Vec::new()));

        let mut control = ThresholdLoop::new();
        control
            .add(ControlEntry::new(
                String::try_from("heater1").unwrap(),
                sensor.clone(),
                TraceActuator {
                    on: false,
                    trace: trace.clone(),
                },
                ThresholdRule::new(ControlMode::Heating, 25.0, 0),
            ))
            .unwrap();

        control_task(&mut control, Duration::from_millis(500), async {}).await;

        assert_eq!(sensor.reads.get(), 0);
        assert_eq!(*trace.borrow(), [false]);
    }
}
