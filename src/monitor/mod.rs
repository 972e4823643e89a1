pub mod data;

use crate::config::MonitorConfig;
use crate::devices::{DigitalOutput, OutputGuard, OutputState, TemperatureSource};
use data::{MonitorSummary, SampleRecord};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

/// How a pause between samples ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Elapsed,
    Interrupted,
}

/// Blocking wait between samples
pub trait Pause {
    fn pause(&mut self, interval: Duration) -> Wake;
}

/// Sleeps for the interval unless a stop request arrives first.
pub struct InterruptibleSleep {
    stop: Receiver<()>,
}

impl InterruptibleSleep {
    /// The sender is handed to whatever raises the stop request (signal handler).
    pub fn channel() -> (Sender<()>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, InterruptibleSleep { stop: rx })
    }
}

impl Pause for InterruptibleSleep {
    fn pause(&mut self, interval: Duration) -> Wake {
        match self.stop.recv_timeout(interval) {
            Ok(()) => Wake::Interrupted,
            Err(RecvTimeoutError::Timeout) => Wake::Elapsed,
            Err(RecvTimeoutError::Disconnected) => {
                thread::sleep(interval);
                Wake::Elapsed
            }
        }
    }
}

/// Read the sensor once. Any failure becomes `None`; the loop keeps going.
pub fn sample<S: TemperatureSource>(source: &mut S) -> Option<f64> {
    match source.read_celsius() {
        Ok(temp) => Some(temp),
        Err(e) => {
            error!("Error: Cannot retrieve temperature data ({})", e);
            println!("Error: Cannot retrieve temperature data");
            None
        }
    }
}

/// LED decision for one sample: on only for a reading strictly above the threshold.
pub fn decide(reading: Option<f64>, threshold_c: f64) -> OutputState {
    match reading {
        Some(temp) if temp > threshold_c => OutputState::On,
        _ => OutputState::Off,
    }
}

/// Console line printed once when monitoring starts
pub const BANNER: &str = "Beginning system monitoring...";

/// Console lines for one sample, in print order.
pub fn status_lines(reading: Option<f64>, decision: OutputState) -> Vec<String> {
    match reading {
        Some(temp) => {
            let mut lines = vec![format!("CPU temperature: {:.2} degrees C", temp)];
            if decision == OutputState::On {
                lines.push("Warning: CPU temperature exceeded the threshold".to_string());
            }
            lines
        }
        None => vec!["Temperature check failure".to_string()],
    }
}

fn report(reading: Option<f64>, decision: OutputState) {
    for (i, line) in status_lines(reading, decision).iter().enumerate() {
        // Only the plain temperature line is informational
        if i == 0 && reading.is_some() {
            info!("{}", line);
        } else {
            warn!("{}", line);
        }
        println!("{}", line);
    }
}

/// Run the monitor for `config.iterations()` samples, then release the output.
///
/// Each iteration samples, drives the LED from the reading, waits one interval
/// and then drives the LED off again, so an ON decision only lasts for the
/// pause that follows it. An interrupt during the pause ends the run early.
/// The output is released exactly once on every exit path, including panics.
pub fn run_monitor<S, O, P>(
    config: &MonitorConfig,
    source: &mut S,
    mut output: OutputGuard<O>,
    pause: &mut P,
) -> MonitorSummary
where
    S: TemperatureSource,
    O: DigitalOutput,
    P: Pause,
{
    let iterations = config.iterations();
    let interval = config.interval();
    info!(
        "{} {} samples every {:?}, threshold {} C",
        BANNER, iterations, interval, config.threshold_c
    );
    println!("{}", BANNER);

    let mut summary = MonitorSummary::default();

    for i in 0..iterations {
        let reading = sample(source);
        let decision = decide(reading, config.threshold_c);
        output.set_state(decision);
        report(reading, decision);
        summary.records.push(SampleRecord::now(reading, decision));

        let wake = pause.pause(interval);
        output.set_state(OutputState::Off);

        if wake == Wake::Interrupted {
            warn!("Monitoring interrupted after {} of {} samples", i + 1, iterations);
            summary.interrupted = true;
            break;
        }
    }

    output.release();
    info!("GPIO cleaned up. Monitoring completed");
    println!("GPIO cleaned up. Monitoring completed");

    summary
}
