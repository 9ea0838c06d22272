use crate::config::SensorConfig;
use crate::hardware::RawSensor;

/// Motor current measurement across the series sense resistor
pub struct CurrentSensor<S> {
    raw: S,
    supply_voltage: f32,
    series_resistance: f32,
}

impl<S: RawSensor> CurrentSensor<S> {
    pub fn new(raw: S, config: &SensorConfig) -> Self {
        Self {
            raw,
            supply_voltage: config.supply_voltage,
            series_resistance: config.series_resistance_ohms,
        }
    }

    /// Sample the sensor once and return the motor current in amps
    ///
    /// Samples outside 0.0..=1.0 are clamped; NaN reads as full scale.
    pub fn read_current(&mut self) -> f32 {
        let sample = self.raw.sample();
        let normalized = if sample.is_nan() {
            tracing::warn!("Current sensor returned NaN, treating as full scale");
            1.0
        } else if !(0.0..=1.0).contains(&sample) {
            tracing::warn!("Current sensor reading {} out of range, clamping", sample);
            sample.clamp(0.0, 1.0)
        } else {
            sample
        };

        let volts = self.supply_voltage * normalized;
        volts / self.series_resistance
    }
}
