/// What the status LED shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// All colours dark
    Off,
    /// Red: motor stopped
    Stopped,
    /// Green: door rising
    MovingUp,
    /// Blue: door falling
    MovingDown,
    /// Blue: power-on blink
    Startup,
}

impl Indicator {
    /// Pin levels for (red, green, blue)
    ///
    /// The LED is common-anode, so a colour is lit by driving its pin low.
    pub fn pin_levels(self) -> (bool, bool, bool) {
        match self {
            Indicator::Off => (true, true, true),
            Indicator::Stopped => (false, true, true),
            Indicator::MovingUp => (true, false, true),
            Indicator::MovingDown | Indicator::Startup => (true, true, false),
        }
    }

    pub fn colour(self) -> &'static str {
        match self {
            Indicator::Off => "off",
            Indicator::Stopped => "red",
            Indicator::MovingUp => "green",
            Indicator::MovingDown | Indicator::Startup => "blue",
        }
    }
}
