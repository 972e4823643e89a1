use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Environment variable naming an optional JSON configuration file
pub const CONFIG_ENV: &str = "THERMAL_MONITOR_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Pin addressing scheme, fixed once at acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinNumbering {
    /// Broadcom chip-logical numbering
    Bcm,
    /// Physical header position
    Board,
}

/// Configuration for a monitoring run
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    pub threshold_c: f64,         // LED turns on strictly above this (degrees C)
    pub interval_secs: f64,       // Time between samples
    pub duration_secs: f64,       // Total monitoring time
    pub channel: u8,              // LED pin, interpreted per `numbering`
    pub numbering: PinNumbering,  // BCM or physical board addressing
    pub sensor_path: PathBuf,     // sysfs thermal zone pseudo-file
    pub record_dir: Option<PathBuf>, // Where the sample CSV goes, None to skip
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            threshold_c: 44.0,
            interval_secs: 5.0,
            duration_secs: 25.0,
            channel: 18,
            numbering: PinNumbering::Bcm,
            sensor_path: PathBuf::from("/sys/class/thermal/thermal_zone0/temp"),
            record_dir: Some(PathBuf::from("logs")),
        }
    }
}

impl MonitorConfig {
    /// Parse a JSON document; absent keys keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: MonitorConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading configuration from {}", path.display());
        let text = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Load from the file named by `THERMAL_MONITOR_CONFIG`, or fall back to defaults.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => {
                info!("{} not set, using default configuration", CONFIG_ENV);
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.threshold_c.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "threshold must be finite, got {}",
                self.threshold_c
            )));
        }
        if !self.interval_secs.is_finite() || self.interval_secs <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "interval must be a positive number of seconds, got {}",
                self.interval_secs
            )));
        }
        if Duration::try_from_secs_f64(self.interval_secs).is_err() {
            return Err(ConfigError::Invalid(format!(
                "interval {} s is too long to wait for",
                self.interval_secs
            )));
        }
        if !self.duration_secs.is_finite() || self.duration_secs < self.interval_secs {
            return Err(ConfigError::Invalid(format!(
                "duration {} s must be at least the interval {} s",
                self.duration_secs, self.interval_secs
            )));
        }
        Ok(())
    }

    /// Number of samples taken; a trailing partial interval is dropped.
    pub fn iterations(&self) -> u64 {
        (self.duration_secs / self.interval_secs).floor() as u64
    }

    /// Pause between samples. Saturates for intervals `validate()` would reject.
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.interval_secs).unwrap_or(Duration::MAX)
    }
}
