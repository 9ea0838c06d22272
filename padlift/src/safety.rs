//! Motor overload cutoff
//!
//! A stalled or obstructed door shows up as motor current climbing past the
//! configured limit. The monitor only answers whether a reading is an
//! overload; stopping the motor is up to the control loop.

use crate::config::SafetyConfig;

#[derive(Debug, Clone)]
pub struct SafetyMonitor {
    current_limit: f32,
}

impl SafetyMonitor {
    pub fn new(config: &SafetyConfig) -> Self {
        Self {
            current_limit: config.motor_current_limit_amps,
        }
    }

    /// True when `current_amps` is at or above the limit
    pub fn check(&self, current_amps: f32) -> bool {
        current_amps >= self.current_limit
    }

    pub fn current_limit(&self) -> f32 {
        self.current_limit
    }
}
