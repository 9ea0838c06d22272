//! Board collaborators
//!
//! The controller only talks to hardware through these traits, so the same
//! state machine runs against real pins or the simulated board.

use crate::indicator::Indicator;

/// The two motor driver inputs
pub trait MotorPins {
    fn set_drive_up(&mut self, on: bool);
    fn set_drive_down(&mut self, on: bool);
    fn drive_up(&self) -> bool;
    fn drive_down(&self) -> bool;
}

/// Status LED
pub trait IndicatorDriver {
    fn show(&mut self, indicator: Indicator);
}

/// Normalized analog sample from the current sense resistor
pub trait RawSensor {
    /// Nominally within 0.0..=1.0
    fn sample(&mut self) -> f32;
}

/// Direction-safe wrapper around the motor pins
///
/// The opposite output is always lowered before one is raised, so both
/// driver inputs are never high at the same time.
pub struct Motor<P> {
    pins: P,
}

impl<P: MotorPins> Motor<P> {
    pub fn new(mut pins: P) -> Self {
        pins.set_drive_up(false);
        pins.set_drive_down(false);
        Self { pins }
    }

    pub fn up(&mut self) {
        self.pins.set_drive_down(false);
        self.pins.set_drive_up(true);
    }

    pub fn down(&mut self) {
        self.pins.set_drive_up(false);
        self.pins.set_drive_down(true);
    }

    pub fn off(&mut self) {
        self.pins.set_drive_up(false);
        self.pins.set_drive_down(false);
    }

    /// Current (drive-up, drive-down) levels
    pub fn outputs(&self) -> (bool, bool) {
        (self.pins.drive_up(), self.pins.drive_down())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pins that fail the test if both outputs are ever high
    #[derive(Default)]
    struct CheckedPins {
        up: bool,
        down: bool,
    }

    impl MotorPins for CheckedPins {
        fn set_drive_up(&mut self, on: bool) {
            self.up = on;
            assert!(!(self.up && self.down), "both outputs high");
        }

        fn set_drive_down(&mut self, on: bool) {
            self.down = on;
            assert!(!(self.up && self.down), "both outputs high");
        }

        fn drive_up(&self) -> bool {
            self.up
        }

        fn drive_down(&self) -> bool {
            self.down
        }
    }

    #[test]
    fn test_new_motor_is_off() {
        let motor = Motor::new(CheckedPins { up: true, down: false });
        assert_eq!(motor.outputs(), (false, false));
    }

    #[test]
    fn test_direction_change_never_overlaps() {
        let mut motor = Motor::new(CheckedPins::default());
        motor.up();
        assert_eq!(motor.outputs(), (true, false));
        motor.down();
        assert_eq!(motor.outputs(), (false, true));
        motor.up();
        assert_eq!(motor.outputs(), (true, false));
        motor.off();
        assert_eq!(motor.outputs(), (false, false));
    }
}
