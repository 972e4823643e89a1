pub mod gpio_led;
pub mod thermal_zone;

pub use gpio_led::GpioLed;
pub use thermal_zone::ThermalZone;

use serde::Serialize;
use std::fmt;
use tracing::info;

/// Binary state of the monitored LED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutputState {
    On,
    Off,
}

impl fmt::Display for OutputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputState::On => write!(f, "ON"),
            OutputState::Off => write!(f, "OFF"),
        }
    }
}

/// Something that yields a temperature in degrees Celsius
pub trait TemperatureSource {
    type Error: std::error::Error;

    fn read_celsius(&mut self) -> Result<f64, Self::Error>;
}

/// A single digital output line, already acquired
pub trait DigitalOutput {
    fn set_state(&mut self, state: OutputState);

    /// Give the line back. Called exactly once by `OutputGuard`.
    fn release(&mut self);
}

/// Owns an acquired output and releases it on every exit path.
pub struct OutputGuard<O: DigitalOutput> {
    output: O,
    released: bool,
}

impl<O: DigitalOutput> OutputGuard<O> {
    pub fn new(output: O) -> Self {
        OutputGuard {
            output,
            released: false,
        }
    }

    pub fn set_state(&mut self, state: OutputState) {
        self.output.set_state(state);
    }

    /// Release now instead of at drop.
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.output.release();
            info!("Output released");
        }
    }
}

impl<O: DigitalOutput> Drop for OutputGuard<O> {
    fn drop(&mut self) {
        self.release_once();
    }
}
