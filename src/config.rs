//! Daemon configuration.
//!
//! Both daemons start from built-in defaults, optionally overlay a JSON file
//! (`--config`), then apply command-line flags. Every field is optional in
//! the file; missing ones keep their default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::adapters::i2c_dev::DEFAULT_ADAPTOR;
use crate::adapters::process::CommandShutdown;
use crate::adapters::sysfs_gpio::DEFAULT_ROOT;
use crate::adapters::uinput::{DEFAULT_UINPUT, DEVICE_NAME};
use crate::app::input_engine::HeldKeyPolicy;
use crate::app::pin_setup::RetryPolicy;
use crate::app::watchdog::{PulseTiming, WatchdogPins};
use crate::error::{Error, Result};
use crate::pins;

/// Read a JSON configuration file. Unknown keys are rejected.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("reading {}: {e}", path.display())))?;
    serde_json::from_str(&text).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
}

// ---------------------------------------------------------------------------
// picod
// ---------------------------------------------------------------------------

/// Watchdog daemon settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchdogConfig {
    /// Heartbeat output line.
    pub heartbeat_pin: u32,
    /// FSSD sense input line.
    pub sense_pin: u32,
    /// Watch the sense line and shut the host down when it drops.
    pub monitor_fssd: bool,
    /// Heartbeat period in milliseconds.
    pub period_ms: u32,
    /// Heartbeat high time in milliseconds.
    pub pulse_ms: u32,
    /// sysfs GPIO root directory.
    pub gpio_root: PathBuf,
    /// Direction-change retry policy for pin setup.
    pub retry: RetryPolicy,
    /// Command run on a board-initiated shutdown.
    pub shutdown: CommandShutdown,
    /// Detach after setup.
    pub daemon: bool,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            heartbeat_pin: pins::HEARTBEAT_GPIO,
            sense_pin: pins::FSSD_SENSE_GPIO,
            monitor_fssd: true,
            period_ms: pins::HEARTBEAT_PERIOD_MS,
            pulse_ms: pins::HEARTBEAT_HIGH_MS,
            gpio_root: PathBuf::from(DEFAULT_ROOT),
            retry: RetryPolicy::default(),
            shutdown: CommandShutdown::default(),
            daemon: false,
        }
    }
}

impl WatchdogConfig {
    pub fn validate(&self) -> Result<()> {
        if self.period_ms == 0 {
            return Err(Error::Config("period_ms must be positive".into()));
        }
        if self.pulse_ms == 0 || self.pulse_ms >= self.period_ms {
            return Err(Error::Config(format!(
                "pulse_ms ({}) must be positive and shorter than period_ms ({})",
                self.pulse_ms, self.period_ms
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::Config("retry.max_attempts must be positive".into()));
        }
        if self.monitor_fssd && self.sense_pin == self.heartbeat_pin {
            return Err(Error::Config(format!(
                "heartbeat and sense share GPIO {}",
                self.heartbeat_pin
            )));
        }
        if self.shutdown.program.is_empty() {
            return Err(Error::Config("shutdown.program must not be empty".into()));
        }
        Ok(())
    }

    pub fn timing(&self) -> PulseTiming {
        PulseTiming {
            period_ms: self.period_ms,
            high_ms: self.pulse_ms,
        }
    }

    pub fn pins(&self) -> WatchdogPins {
        WatchdogPins {
            heartbeat: self.heartbeat_pin,
            sense: self.monitor_fssd.then_some(self.sense_pin),
        }
    }
}

// ---------------------------------------------------------------------------
// pico-i2cd
// ---------------------------------------------------------------------------

/// Register client daemon settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct I2cdConfig {
    /// i2c-dev adaptor node.
    pub adaptor: PathBuf,
    /// uinput node.
    pub uinput: PathBuf,
    /// Name the virtual input device registers under.
    pub device_name: String,
    /// Forward key presses to uinput.
    pub input: bool,
    /// Delay between key poll cycles in milliseconds.
    pub poll_ms: u32,
    pub held_keys: HeldKeyPolicy,
    /// Detach after setup.
    pub daemon: bool,
}

impl Default for I2cdConfig {
    fn default() -> Self {
        Self {
            adaptor: PathBuf::from(DEFAULT_ADAPTOR),
            uinput: PathBuf::from(DEFAULT_UINPUT),
            device_name: DEVICE_NAME.into(),
            input: true,
            poll_ms: 100,
            held_keys: HeldKeyPolicy::default(),
            daemon: false,
        }
    }
}

impl I2cdConfig {
    pub fn validate(&self) -> Result<()> {
        if self.poll_ms == 0 {
            return Err(Error::Config("poll_ms must be positive".into()));
        }
        if self.device_name.is_empty() {
            return Err(Error::Config("device_name must not be empty".into()));
        }
        Ok(())
    }
}
