//! Door motion state machine
//!
//! Travel is open-loop: each stroke starts a countdown sized to the door's
//! rise or fall time, and the motor is stopped when it runs out. `position`
//! only changes when a countdown completes, so after a forced stop it still
//! holds the last position the door was known to have reached.

use std::time::Duration;

use crate::config::ControllerConfig;
use crate::error::InvariantViolation;
use crate::hardware::{IndicatorDriver, Motor, MotorPins};
use crate::indicator::Indicator;

/// Last confirmed resting position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Down,
    Up,
}

/// What the motor is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Idle,
    MovingUp,
    MovingDown,
}

/// Countdown for a single stroke
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelTimer {
    duration: Duration,
    remaining: Duration,
    active: bool,
}

impl TravelTimer {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            remaining: duration,
            active: false,
        }
    }

    fn start(&mut self) {
        self.remaining = self.duration;
        self.active = true;
    }

    /// Count down by `dt`; true once nothing remains
    fn advance(&mut self, dt: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(dt);
        self.remaining.is_zero()
    }

    fn reset(&mut self) {
        self.remaining = self.duration;
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoorState {
    position: Position,
    up_timer: TravelTimer,
    down_timer: TravelTimer,
}

impl DoorState {
    /// Power-on state: door down, motor idle
    pub fn new(rise_time: Duration, fall_time: Duration) -> Self {
        Self {
            position: Position::Down,
            up_timer: TravelTimer::new(rise_time),
            down_timer: TravelTimer::new(fall_time),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Derived from whichever travel timer is running
    pub fn motion(&self) -> Motion {
        if self.up_timer.is_active() {
            Motion::MovingUp
        } else if self.down_timer.is_active() {
            Motion::MovingDown
        } else {
            Motion::Idle
        }
    }

    pub fn up_timer(&self) -> &TravelTimer {
        &self.up_timer
    }

    pub fn down_timer(&self) -> &TravelTimer {
        &self.down_timer
    }
}

/// Owns the door state and drives the motor and status LED from it
pub struct DoorController<P, L> {
    state: DoorState,
    motor: Motor<P>,
    indicator: L,
}

impl<P: MotorPins, L: IndicatorDriver> DoorController<P, L> {
    pub fn new(pins: P, indicator: L, config: &ControllerConfig) -> Self {
        Self {
            state: DoorState::new(config.rise_time(), config.fall_time()),
            motor: Motor::new(pins),
            indicator,
        }
    }

    pub fn state(&self) -> &DoorState {
        &self.state
    }

    /// Current (drive-up, drive-down) output levels
    pub fn outputs(&self) -> (bool, bool) {
        self.motor.outputs()
    }

    pub fn indicator_mut(&mut self) -> &mut L {
        &mut self.indicator
    }

    /// Start raising the door unless it is already up or rising
    pub fn on_presence_detected(&mut self) {
        tracing::info!("Pressure detected");

        if self.state.position != Position::Up && !self.state.up_timer.is_active() {
            tracing::info!("Starting motor up");
            self.motor.up();
            self.state.up_timer.start();
            self.indicator.show(Indicator::MovingUp);
        } else {
            tracing::debug!(
                "Ignoring pressure: position={:?}, motion={:?}",
                self.state.position,
                self.state.motion()
            );
        }
    }

    /// Start lowering the door unless it is already down or falling
    pub fn on_presence_released(&mut self) {
        tracing::info!("Pressure relieved");

        if self.state.position == Position::Up && !self.state.down_timer.is_active() {
            tracing::info!("Starting motor down");
            self.motor.down();
            self.state.down_timer.start();
            self.indicator.show(Indicator::MovingDown);
        } else {
            tracing::debug!(
                "Ignoring release: position={:?}, motion={:?}",
                self.state.position,
                self.state.motion()
            );
        }
    }

    /// Advance the running travel timer by `dt`
    ///
    /// Returns the position reached if a stroke completed on this tick.
    pub fn tick(&mut self, dt: Duration) -> Option<Position> {
        if let Err(violation) = self.check_invariants() {
            tracing::error!("Door state inconsistent ({}), stopping motor", violation);
            self.force_stop();
            return None;
        }

        if self.state.up_timer.is_active() {
            if self.state.up_timer.advance(dt) {
                tracing::info!("Stopping motor up");
                self.motor.off();
                self.state.up_timer.reset();
                self.state.position = Position::Up;
                self.indicator.show(Indicator::Stopped);
                return Some(Position::Up);
            }
        } else if self.state.down_timer.is_active() && self.state.down_timer.advance(dt) {
            tracing::info!("Stopping motor down");
            self.motor.off();
            self.state.down_timer.reset();
            self.state.position = Position::Down;
            self.indicator.show(Indicator::Stopped);
            return Some(Position::Down);
        }

        None
    }

    /// Cut both motor outputs and abandon any stroke in progress
    ///
    /// `position` is left alone: it keeps the last position a stroke
    /// actually reached.
    ///
    /// The indicator only changes when a stroke was actually interrupted;
    /// stopping an idle door leaves the LED alone.
    pub fn force_stop(&mut self) {
        let motion = self.state.motion();

        self.motor.off();
        self.state.up_timer.reset();
        self.state.down_timer.reset();

        if motion != Motion::Idle {
            tracing::warn!(
                "Motor stopped while {:?}, door position unknown (last known {:?})",
                motion,
                self.state.position
            );
            self.indicator.show(Indicator::Stopped);
        }
    }

    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let up = self.state.up_timer.is_active();
        let down = self.state.down_timer.is_active();

        if up && down {
            return Err(InvariantViolation::BothTimersActive);
        }
        if up && self.state.position == Position::Up {
            return Err(InvariantViolation::MovingUpFromUp);
        }
        if down && self.state.position == Position::Down {
            return Err(InvariantViolation::MovingDownFromDown);
        }

        Ok(())
    }
}
