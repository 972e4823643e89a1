use chrono::Utc;
use csv::Writer;
use serde::Serialize;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::devices::OutputState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRecord {
    pub timestamp: String, // UTC ISO timestamp
    #[serde(rename = "temperature_C")]
    pub temperature_c: Option<f64>, // empty when the sensor was unavailable
    pub led: OutputState, // decision taken for this sample
}

impl SampleRecord {
    pub fn now(temperature_c: Option<f64>, led: OutputState) -> Self {
        SampleRecord {
            timestamp: Utc::now().to_rfc3339(),
            temperature_c,
            led,
        }
    }
}

/// Outcome of a monitoring run
#[derive(Debug, Default)]
pub struct MonitorSummary {
    pub records: Vec<SampleRecord>,
    pub interrupted: bool,
}

impl MonitorSummary {
    pub fn failures(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.temperature_c.is_none())
            .count()
    }

    pub fn peak(&self) -> Option<f64> {
        self.records
            .iter()
            .filter_map(|r| r.temperature_c)
            .reduce(f64::max)
    }
}

/// Save the sample records to a timestamped CSV file inside `dir`
pub fn save_samples_to_csv(dir: &Path, data: &[SampleRecord]) -> io::Result<PathBuf> {
    let name = chrono::Local::now()
        .format("samples_%Y-%m-%d_%H-%M-%S.csv")
        .to_string();

    fs::create_dir_all(dir)?;
    let path = dir.join(name);

    let file = File::create(&path)?;
    let mut writer = Writer::from_writer(file);
    for record in data {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!("Samples saved to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(t: Option<f64>, led: OutputState) -> SampleRecord {
        SampleRecord {
            timestamp: "2026-01-01T00:00:00+00:00".into(),
            temperature_c: t,
            led,
        }
    }

    #[test]
    fn summary_counts_failures_and_peak() {
        let summary = MonitorSummary {
            records: vec![
                record(Some(43.0), OutputState::Off),
                record(None, OutputState::Off),
                record(Some(45.5), OutputState::On),
            ],
            interrupted: false,
        };
        assert_eq!(summary.failures(), 1);
        assert_eq!(summary.peak(), Some(45.5));
        assert_eq!(MonitorSummary::default().peak(), None);
    }

    #[test]
    fn csv_has_header_and_blank_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_samples_to_csv(
            &dir.path().join("logs"),
            &[
                record(Some(44.2), OutputState::On),
                record(None, OutputState::Off),
            ],
        )
        .unwrap();

        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "timestamp,temperature_C,led");
        assert_eq!(lines[1], "2026-01-01T00:00:00+00:00,44.2,ON");
        assert_eq!(lines[2], "2026-01-01T00:00:00+00:00,,OFF");
    }
}
