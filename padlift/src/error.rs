use thiserror::Error;

/// Rejected configuration values, reported at startup
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be a positive, finite number (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} is not representable as a non-zero duration (got {value})")]
    DurationOutOfRange { field: &'static str, value: f64 },

    #[error("{field} must be within 0.0..=1.0 (got {value})")]
    OutOfUnitRange { field: &'static str, value: f64 },

    #[error("cycle_time_secs ({cycle}) must not exceed {field} ({travel})")]
    CycleLongerThanTravel {
        field: &'static str,
        cycle: f64,
        travel: f64,
    },
}

/// Inconsistent door state detected by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("rise and fall timers are both active")]
    BothTimersActive,

    #[error("moving up while the door is already up")]
    MovingUpFromUp,

    #[error("moving down while the door is already down")]
    MovingDownFromDown,
}
