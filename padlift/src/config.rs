use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::error::ConfigError;

/// Door timing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControllerConfig {
    /// Period of the control loop in seconds
    pub cycle_time_secs: f64,

    /// Time in seconds the door takes to open
    pub door_rise_time_secs: f64,

    /// Time in seconds the door takes to close
    pub door_fall_time_secs: f64,

    /// How long the blue LED blinks at power-on
    pub startup_blink_secs: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            cycle_time_secs: 0.5,
            door_rise_time_secs: 10.0,
            door_fall_time_secs: 10.0,
            startup_blink_secs: 1.0,
        }
    }
}

impl ControllerConfig {
    pub fn cycle_time(&self) -> Duration {
        Duration::from_secs_f64(self.cycle_time_secs)
    }

    pub fn rise_time(&self) -> Duration {
        Duration::from_secs_f64(self.door_rise_time_secs)
    }

    pub fn fall_time(&self) -> Duration {
        Duration::from_secs_f64(self.door_fall_time_secs)
    }

    pub fn startup_blink(&self) -> Duration {
        Duration::from_secs_f64(self.startup_blink_secs)
    }
}

/// Overload cutoff configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SafetyConfig {
    /// Motor current in amps at or above which the motor is shut off
    pub motor_current_limit_amps: f32,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            motor_current_limit_amps: 0.1,
        }
    }
}

/// Current sense circuit configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SensorConfig {
    /// ADC reference / supply voltage in volts
    pub supply_voltage: f32,

    /// Sense resistor in series with the motor, in ohms
    pub series_resistance_ohms: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            supply_voltage: 3.3,
            series_resistance_ohms: 10.0,
        }
    }
}

/// Simulated board loads, as normalized ADC readings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Reading with the motor off
    pub idle_load: f32,

    /// Reading while the motor drives freely
    pub running_load: f32,

    /// Reading while the door is jammed
    pub stall_load: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            idle_load: 0.0,
            running_load: 0.2,
            stall_load: 0.5,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub controller: ControllerConfig,
    pub safety: SafetyConfig,
    pub sensor: SensorConfig,
    pub simulation: SimulationConfig,
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

/// Positive seconds must also survive conversion to a non-zero `Duration`
fn require_duration(field: &'static str, secs: f64) -> Result<Duration, ConfigError> {
    require_positive(field, secs)?;
    match Duration::try_from_secs_f64(secs) {
        Ok(duration) if !duration.is_zero() => Ok(duration),
        _ => Err(ConfigError::DurationOutOfRange { field, value: secs }),
    }
}

fn require_unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange {
            field,
            value: value as f64,
        })
    }
}

impl Config {
    /// Check every numeric field before the controller is built
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.controller;
        let cycle = require_duration("cycle_time_secs", c.cycle_time_secs)?;
        let rise = require_duration("door_rise_time_secs", c.door_rise_time_secs)?;
        let fall = require_duration("door_fall_time_secs", c.door_fall_time_secs)?;
        require_duration("startup_blink_secs", c.startup_blink_secs)?;

        for (field, travel, duration) in [
            ("door_rise_time_secs", c.door_rise_time_secs, rise),
            ("door_fall_time_secs", c.door_fall_time_secs, fall),
        ] {
            if cycle > duration {
                return Err(ConfigError::CycleLongerThanTravel {
                    field,
                    cycle: c.cycle_time_secs,
                    travel,
                });
            }
        }

        require_positive(
            "motor_current_limit_amps",
            self.safety.motor_current_limit_amps as f64,
        )?;
        require_positive("supply_voltage", self.sensor.supply_voltage as f64)?;
        require_positive(
            "series_resistance_ohms",
            self.sensor.series_resistance_ohms as f64,
        )?;

        require_unit("idle_load", self.simulation.idle_load)?;
        require_unit("running_load", self.simulation.running_load)?;
        require_unit("stall_load", self.simulation.stall_load)?;

        Ok(())
    }
}

/// Loads the configuration file, creating a default one on first run
pub struct ConfigManager {
    config_path: PathBuf,
    config: Config,
}

impl ConfigManager {
    /// Load config from `path`, or from the XDG location when none is given
    pub async fn new(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path,
            None => Self::get_config_path()?,
        };

        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create config directory")?;
            }
        }

        let config = Self::load_config(&config_path).await?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {:?}", config_path))?;

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Get the XDG-compliant config path: ~/.config/padlift/config.yaml
    fn get_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("", "", "padlift")
            .context("Failed to determine config directory")?;

        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    /// Read the config file, writing out the defaults if there is none yet
    async fn load_config(path: &Path) -> Result<Config> {
        match fs::read_to_string(path).await {
            Ok(contents) => {
                let config = serde_yaml::from_str(&contents)
                    .with_context(|| format!("Failed to parse {:?}", path))?;
                tracing::info!("Loaded configuration from {:?}", path);
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config at {:?}, writing defaults", path);
                Self::write_default(path).await
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read {:?}", path)),
        }
    }

    async fn write_default(path: &Path) -> Result<Config> {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).context("Failed to serialize default config")?;
        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write default config to {:?}", path))?;
        Ok(config)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("padlift-test-{}-{}", std::process::id(), name))
            .join("config.yaml")
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.controller.cycle_time(), Duration::from_millis(500));
        assert_eq!(config.controller.rise_time(), Duration::from_secs(10));
    }

    #[test]
    fn test_rejects_zero_rise_time() {
        let mut config = Config::default();
        config.controller.door_rise_time_secs = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "door_rise_time_secs",
                value: 0.0
            })
        );
    }

    #[test]
    fn test_rejects_nan_current_limit() {
        let mut config = Config::default();
        config.safety.motor_current_limit_amps = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "motor_current_limit_amps",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_cycle_longer_than_travel() {
        let mut config = Config::default();
        config.controller.door_fall_time_secs = 0.25;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CycleLongerThanTravel {
                field: "door_fall_time_secs",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_cycle_time_that_rounds_to_zero() {
        let mut config = Config::default();
        config.controller.cycle_time_secs = 1e-10;
        assert_eq!(
            config.validate(),
            Err(ConfigError::DurationOutOfRange {
                field: "cycle_time_secs",
                value: 1e-10
            })
        );
    }

    #[test]
    fn test_rejects_rise_time_too_large_for_duration() {
        let mut config = Config::default();
        config.controller.door_rise_time_secs = 1e20;
        assert_eq!(
            config.validate(),
            Err(ConfigError::DurationOutOfRange {
                field: "door_rise_time_secs",
                value: 1e20
            })
        );
    }

    #[test]
    fn test_validated_durations_convert() {
        let mut config = Config::default();
        config.controller.cycle_time_secs = 0.25;
        config.controller.door_fall_time_secs = 3600.0;
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.controller.cycle_time(), Duration::from_millis(250));
        assert_eq!(config.controller.fall_time(), Duration::from_secs(3600));
    }

    #[test]
    fn test_rejects_stall_load_above_full_scale() {
        let mut config = Config::default();
        config.simulation.stall_load = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfUnitRange {
                field: "stall_load",
                ..
            })
        ));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "controller:\n  door_rise_time_secs: 6.0\nsafety:\n  motor_current_limit_amps: 0.25\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.controller.door_rise_time_secs, 6.0);
        assert_eq!(config.controller.door_fall_time_secs, 10.0);
        assert_eq!(config.safety.motor_current_limit_amps, 0.25);
        assert_eq!(config.sensor, SensorConfig::default());
    }

    #[tokio::test]
    async fn test_manager_creates_default_file() {
        let path = scratch_path("create");
        let _ = std::fs::remove_file(&path);

        let manager = ConfigManager::new(Some(path.clone())).await.unwrap();
        assert_eq!(manager.config(), &Config::default());
        assert!(path.exists());

        // Second load reads the file just written
        let reloaded = ConfigManager::new(Some(path.clone())).await.unwrap();
        assert_eq!(reloaded.config(), &Config::default());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_manager_rejects_invalid_file() {
        let path = scratch_path("invalid");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "sensor:\n  series_resistance_ohms: -1.0\n").unwrap();

        let result = ConfigManager::new(Some(path.clone())).await;
        assert!(result.is_err());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
