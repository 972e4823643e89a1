use thiserror::Error;
use tracing::{info, warn};

use super::{DigitalOutput, OutputState};
use crate::config::PinNumbering;

#[derive(Error, Debug)]
pub enum GpioError {
    #[cfg(feature = "rpi")]
    #[error("GPIO error: {0}")]
    Gpio(#[from] rppal::gpio::Error),

    #[error("Physical pin {0} is not a GPIO line")]
    InvalidPin(u8),

    #[cfg(not(feature = "rpi"))]
    #[error("GPIO support not compiled in (enable the `rpi` feature)")]
    Unsupported,
}

pub type Result<T> = std::result::Result<T, GpioError>;

/// Physical header position to BCM line, 40-pin Raspberry Pi header.
const BOARD_TO_BCM: [(u8, u8); 28] = [
    (3, 2),
    (5, 3),
    (7, 4),
    (8, 14),
    (10, 15),
    (11, 17),
    (12, 18),
    (13, 27),
    (15, 22),
    (16, 23),
    (18, 24),
    (19, 10),
    (21, 9),
    (22, 25),
    (23, 11),
    (24, 8),
    (26, 7),
    (27, 0),
    (28, 1),
    (29, 5),
    (31, 6),
    (32, 12),
    (33, 13),
    (35, 19),
    (36, 16),
    (37, 26),
    (38, 20),
    (40, 21),
];

/// Resolve a configured channel to the BCM line number.
pub fn bcm_line(channel: u8, numbering: PinNumbering) -> Result<u8> {
    match numbering {
        PinNumbering::Bcm => Ok(channel),
        PinNumbering::Board => BOARD_TO_BCM
            .iter()
            .find(|(board, _)| *board == channel)
            .map(|(_, bcm)| *bcm)
            .ok_or(GpioError::InvalidPin(channel)),
    }
}

/// LED on a Raspberry Pi GPIO line.
pub struct GpioLed {
    #[cfg(feature = "rpi")]
    pin: Option<rppal::gpio::OutputPin>,
    bcm: u8,
}

impl GpioLed {
    /// Configure the line as an output, driven low.
    pub fn acquire(channel: u8, numbering: PinNumbering) -> Result<Self> {
        let bcm = bcm_line(channel, numbering)?;
        info!(
            "Acquiring LED on channel {} ({:?} numbering, BCM {})",
            channel, numbering, bcm
        );
        Self::open(bcm)
    }

    #[cfg(feature = "rpi")]
    fn open(bcm: u8) -> Result<Self> {
        let mut pin = rppal::gpio::Gpio::new()?.get(bcm)?.into_output_low();
        pin.set_reset_on_drop(true);
        Ok(GpioLed {
            pin: Some(pin),
            bcm,
        })
    }

    #[cfg(not(feature = "rpi"))]
    fn open(_bcm: u8) -> Result<Self> {
        Err(GpioError::Unsupported)
    }

    pub fn bcm(&self) -> u8 {
        self.bcm
    }
}

impl DigitalOutput for GpioLed {
    #[cfg(feature = "rpi")]
    fn set_state(&mut self, state: OutputState) {
        match self.pin.as_mut() {
            Some(pin) => match state {
                OutputState::On => pin.set_high(),
                OutputState::Off => pin.set_low(),
            },
            None => warn!("Attempted to drive BCM {} after release", self.bcm),
        }
    }

    #[cfg(not(feature = "rpi"))]
    fn set_state(&mut self, _state: OutputState) {
        warn!("Attempted to drive BCM {} without GPIO support", self.bcm);
    }

    #[cfg(feature = "rpi")]
    fn release(&mut self) {
        if let Some(mut pin) = self.pin.take() {
            pin.set_low();
            // Dropping the pin restores its previous mode.
            drop(pin);
            info!("BCM {} released", self.bcm);
        }
    }

    #[cfg(not(feature = "rpi"))]
    fn release(&mut self) {}
}
