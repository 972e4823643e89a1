use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use super::TemperatureSource;

#[derive(Error, Debug)]
pub enum SensorError {
    #[error("Cannot read {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected sensor value {0:?}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, SensorError>;

/// sysfs thermal zone, e.g. `/sys/class/thermal/thermal_zone0/temp`.
///
/// The file holds a single line with the temperature in milli-degrees Celsius.
pub struct ThermalZone {
    path: PathBuf,
}

impl ThermalZone {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ThermalZone { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw first line of the pseudo-file, trimmed.
    pub fn read_raw(&self) -> Result<String> {
        let unavailable = |source| SensorError::Unavailable {
            path: self.path.clone(),
            source,
        };
        let file = File::open(&self.path).map_err(unavailable)?;
        let mut line = String::new();
        BufReader::new(file)
            .read_line(&mut line)
            .map_err(unavailable)?;
        Ok(line.trim().to_string())
    }
}

/// Milli-degrees text to degrees Celsius.
pub fn millidegrees_to_celsius(raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| SensorError::Malformed(raw.to_string()))?;
    if !value.is_finite() {
        return Err(SensorError::Malformed(raw.to_string()));
    }
    Ok(value / 1000.0)
}

impl TemperatureSource for ThermalZone {
    type Error = SensorError;

    fn read_celsius(&mut self) -> Result<f64> {
        let raw = self.read_raw()?;
        debug!("Raw thermal zone value from {}: {}", self.path.display(), raw);
        millidegrees_to_celsius(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::sample;
    use std::fs;

    #[test]
    fn converts_millidegrees() {
        assert_eq!(millidegrees_to_celsius("44200").unwrap(), 44.2);
        assert_eq!(millidegrees_to_celsius("44200\n").unwrap(), 44200.0 / 1000.0);
        assert_eq!(millidegrees_to_celsius("-5000").unwrap(), -5.0);
        assert_eq!(millidegrees_to_celsius("0").unwrap(), 0.0);
    }

    #[test]
    fn rejects_non_numeric() {
        assert!(matches!(
            millidegrees_to_celsius("hot"),
            Err(SensorError::Malformed(_))
        ));
        assert!(matches!(
            millidegrees_to_celsius(""),
            Err(SensorError::Malformed(_))
        ));
        assert!(matches!(
            millidegrees_to_celsius("inf"),
            Err(SensorError::Malformed(_))
        ));
    }

    #[test]
    fn reads_first_line_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("temp");
        fs::write(&path, "51234\nignored\n").unwrap();

        let mut zone = ThermalZone::new(&path);
        assert_eq!(zone.read_raw().unwrap(), "51234");
        assert_eq!(zone.read_celsius().unwrap(), 51.234);
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut zone = ThermalZone::new(dir.path().join("thermal_zone9/temp"));
        assert!(matches!(
            zone.read_celsius(),
            Err(SensorError::Unavailable { .. })
        ));
    }

    #[test]
    fn picks_up_changes_between_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("temp");
        fs::write(&path, "40000\n").unwrap();
        let mut zone = ThermalZone::new(&path);
        assert_eq!(zone.read_celsius().unwrap(), 40.0);

        fs::write(&path, "47500\n").unwrap();
        assert_eq!(zone.read_celsius().unwrap(), 47.5);

        fs::remove_file(&path).unwrap();
        assert!(zone.read_celsius().is_err());
    }

    #[test]
    fn garbage_in_zone_file_samples_as_no_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("temp");
        fs::write(&path, "hot\n").unwrap();
        let mut zone = ThermalZone::new(&path);
        assert_eq!(sample(&mut zone), None);

        fs::write(&path, "44200\n").unwrap();
        assert_eq!(sample(&mut zone), Some(44.2));

        fs::remove_file(&path).unwrap();
        assert_eq!(sample(&mut zone), None);
    }
}
