//! Linux sysfs GPIO adapter (`/sys/class/gpio`).

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use embedded_hal::digital::PinState;
use log::debug;

use crate::app::ports::{Direction, GpioTransport, RawError};

pub const DEFAULT_ROOT: &str = "/sys/class/gpio";

/// GPIO lines through the legacy sysfs interface.
#[derive(Debug, Clone)]
pub struct SysfsGpio {
    root: PathBuf,
}

impl Default for SysfsGpio {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

impl SysfsGpio {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn line_dir(&self, pin: u32) -> PathBuf {
        self.root.join(format!("gpio{pin}"))
    }

    fn line_attr(&self, pin: u32, attr: &str) -> PathBuf {
        self.line_dir(pin).join(attr)
    }
}

fn write_attr(path: &Path, value: &str) -> Result<(), RawError> {
    let mut file = OpenOptions::new().write(true).open(path)?;
    file.write_all(value.as_bytes())?;
    Ok(())
}

impl GpioTransport for SysfsGpio {
    fn export(&mut self, pin: u32) -> Result<(), RawError> {
        if self.line_dir(pin).exists() {
            debug!("gpio: GPIO {pin} already exported");
            return Ok(());
        }
        match write_attr(&self.root.join("export"), &pin.to_string()) {
            // Raced with another exporter.
            Err(RawError(libc::EBUSY)) => Ok(()),
            other => other,
        }
    }

    fn set_direction(&mut self, pin: u32, direction: Direction) -> Result<(), RawError> {
        let value = match direction {
            Direction::Input => "in",
            Direction::Output => "out",
        };
        write_attr(&self.line_attr(pin, "direction"), value)
    }

    fn set_level(&mut self, pin: u32, level: PinState) -> Result<(), RawError> {
        let value = match level {
            PinState::High => "1",
            PinState::Low => "0",
        };
        write_attr(&self.line_attr(pin, "value"), value)
    }

    fn get_level(&mut self, pin: u32) -> Result<PinState, RawError> {
        let raw = fs::read(self.line_attr(pin, "value"))?;
        match raw.first() {
            Some(b'1') => Ok(PinState::High),
            Some(b'0') => Ok(PinState::Low),
            _ => Err(RawError(libc::EINVAL)),
        }
    }
}
