use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{interval, sleep, MissedTickBehavior};

use crate::config::ControllerConfig;
use crate::door::{DoorController, Position};
use crate::hardware::{IndicatorDriver, MotorPins, RawSensor};
use crate::indicator::Indicator;
use crate::presence::PresenceEvent;
use crate::safety::SafetyMonitor;
use crate::sensor::CurrentSensor;

/// Result of one periodic cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    pub current_amps: f32,
    pub overload: bool,
    pub arrived: Option<Position>,
}

/// Single-threaded control loop
///
/// Presence events and periodic cycles are handled one at a time from the
/// same task, so an event never lands in the middle of a cycle.
pub struct ControlLoop<P, L, S> {
    door: DoorController<P, L>,
    sensor: CurrentSensor<S>,
    safety: SafetyMonitor,
    cycle_time: Duration,
    startup_blink: Duration,
}

impl<P, L, S> ControlLoop<P, L, S>
where
    P: MotorPins,
    L: IndicatorDriver,
    S: RawSensor,
{
    pub fn new(
        door: DoorController<P, L>,
        sensor: CurrentSensor<S>,
        safety: SafetyMonitor,
        config: &ControllerConfig,
    ) -> Self {
        Self {
            door,
            sensor,
            safety,
            cycle_time: config.cycle_time(),
            startup_blink: config.startup_blink(),
        }
    }

    pub fn door(&self) -> &DoorController<P, L> {
        &self.door
    }

    pub fn handle(&mut self, event: PresenceEvent) {
        match event {
            PresenceEvent::PresenceDetected => self.door.on_presence_detected(),
            PresenceEvent::PresenceReleased => self.door.on_presence_released(),
        }
    }

    /// Sensor read, overload check, then timer advance
    pub fn cycle(&mut self) -> CycleReport {
        let current_amps = self.sensor.read_current();
        tracing::debug!("Motor current: {:.3} A", current_amps);

        let overload = self.safety.check(current_amps);
        if overload {
            tracing::warn!(
                "Torque overload ({:.3} A >= {:.3} A), stopping motor",
                current_amps,
                self.safety.current_limit()
            );
            self.door.force_stop();
        }

        let arrived = self.door.tick(self.cycle_time);

        let (up, down) = self.door.outputs();
        let state = self.door.state();
        tracing::debug!(
            "Motor outputs: up={} down={} (rise {:?} left, fall {:?} left)",
            up,
            down,
            state.up_timer().remaining(),
            state.down_timer().remaining()
        );

        CycleReport {
            current_amps,
            overload,
            arrived,
        }
    }

    /// Blink the LED once to show the controller is alive
    async fn startup(&mut self) {
        let indicator = self.door.indicator_mut();
        indicator.show(Indicator::Off);
        indicator.show(Indicator::Startup);
        sleep(self.startup_blink).await;
        self.door.indicator_mut().show(Indicator::Off);
    }

    /// Run until `shutdown` flips to true, then stop the motor
    pub async fn run(
        &mut self,
        mut events: mpsc::Receiver<PresenceEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        self.startup().await;
        tracing::info!(
            "Control loop running every {:?} (rise {:?}, fall {:?})",
            self.cycle_time,
            self.door.state().up_timer().duration(),
            self.door.state().down_timer().duration()
        );

        let mut ticker = interval(self.cycle_time);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut events_open = true;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                event = events.recv(), if events_open => {
                    match event {
                        Some(event) => self.handle(event),
                        None => {
                            tracing::info!("Presence source closed");
                            events_open = false;
                        }
                    }
                }
                _ = ticker.tick() => {
                    let report = self.cycle();
                    if let Some(position) = report.arrived {
                        tracing::info!("Door reached {:?}", position);
                    }
                    tracing::trace!(
                        current_amps = report.current_amps,
                        overload = report.overload,
                        "Cycle complete"
                    );
                }
            }
        }

        tracing::info!("Control loop stopping");
        self.door.force_stop();
    }
}
