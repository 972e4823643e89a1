mod config;
mod devices;
mod monitor;

use config::MonitorConfig;
use devices::{GpioLed, OutputGuard, ThermalZone};
use monitor::InterruptibleSleep;
use monitor::data::save_samples_to_csv;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = setup_logging();
    info!("Starting thermal monitor");

    let config = match MonitorConfig::load() {
        Ok(config) => {
            info!("Using configuration: {:?}", config);
            config
        }
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(Box::new(e));
        }
    };

    // Route SIGINT/SIGTERM into the monitor's pause so the LED is still released
    let (stop, mut pause) = InterruptibleSleep::channel();
    ctrlc::set_handler(move || {
        let _ = stop.send(());
    })?;

    let mut sensor = ThermalZone::new(&config.sensor_path);
    info!("Reading temperature from {}", sensor.path().display());

    let led = match GpioLed::acquire(config.channel, config.numbering) {
        Ok(led) => {
            info!("LED ready on BCM {}", led.bcm());
            led
        }
        Err(e) => {
            error!("Failed to acquire LED output: {}", e);
            return Err(Box::new(e));
        }
    };

    let summary = monitor::run_monitor(&config, &mut sensor, OutputGuard::new(led), &mut pause);

    info!(
        "Took {} samples ({} failed), peak {:?} C, interrupted: {}",
        summary.records.len(),
        summary.failures(),
        summary.peak(),
        summary.interrupted
    );

    if let Some(dir) = &config.record_dir {
        match save_samples_to_csv(dir, &summary.records) {
            Ok(path) => info!("Samples saved to: {}", path.display()),
            Err(e) => warn!("Failed to save samples: {}", e),
        }
    }

    info!("Application shutting down");
    Ok(())
}

fn setup_logging() -> WorkerGuard {
    // File-based logging with daily rotation
    let file_appender = rolling::daily("logs", "monitor.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    fmt()
        .with_writer(non_blocking)
        .with_ansi(false) // Disable ANSI colors in log files
        .with_level(true)
        .init();

    guard
}
