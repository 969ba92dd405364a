//! Command-line flags for both daemons.
//!
//! Flags override whatever the defaults and the `--config` file produced.

use std::path::PathBuf;

use clap::Parser;

use crate::app::input_engine::HeldKeyPolicy;
use crate::config::{self, I2cdConfig, WatchdogConfig};
use crate::error::Result;

/// Heartbeat and FSSD shutdown watchdog for the PIco UPS.
#[derive(Debug, Parser)]
#[command(name = "picod", disable_version_flag = true)]
pub struct PicodArgs {
    /// Detach and run in the background; log output is discarded once detached
    #[arg(short, long)]
    pub daemon: bool,

    /// Do not monitor the FSSD line (heartbeat only)
    #[arg(short = 'n', long)]
    pub no_fssd: bool,

    /// Print version and exit
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Heartbeat output GPIO
    #[arg(long, value_name = "GPIO")]
    pub heartbeat_pin: Option<u32>,

    /// FSSD sense input GPIO
    #[arg(long, value_name = "GPIO")]
    pub sense_pin: Option<u32>,

    /// Heartbeat period in milliseconds
    #[arg(long, value_name = "MS")]
    pub period_ms: Option<u32>,

    /// Heartbeat high time in milliseconds
    #[arg(long, value_name = "MS")]
    pub pulse_ms: Option<u32>,

    /// sysfs GPIO root
    #[arg(long, value_name = "DIR")]
    pub gpio_root: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl PicodArgs {
    /// Defaults, then the config file, then these flags; validated.
    pub fn resolve(&self) -> Result<WatchdogConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_json(path)?,
            None => WatchdogConfig::default(),
        };
        self.apply(&mut cfg);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn apply(&self, cfg: &mut WatchdogConfig) {
        if self.daemon {
            cfg.daemon = true;
        }
        if self.no_fssd {
            cfg.monitor_fssd = false;
        }
        if let Some(pin) = self.heartbeat_pin {
            cfg.heartbeat_pin = pin;
        }
        if let Some(pin) = self.sense_pin {
            cfg.sense_pin = pin;
        }
        if let Some(ms) = self.period_ms {
            cfg.period_ms = ms;
        }
        if let Some(ms) = self.pulse_ms {
            cfg.pulse_ms = ms;
        }
        if let Some(root) = &self.gpio_root {
            cfg.gpio_root.clone_from(root);
        }
    }
}

/// PIco UPS register client: status dump and key input device.
#[derive(Debug, Parser)]
#[command(name = "pico-i2cd", disable_version_flag = true)]
pub struct I2cdArgs {
    /// i2c-dev adaptor node
    #[arg(short, long, value_name = "PATH")]
    pub adaptor: Option<PathBuf>,

    /// Detach and run in the background; log output is discarded once detached
    #[arg(short, long)]
    pub daemon: bool,

    /// Do not create the key input device
    #[arg(short = 'i', long)]
    pub no_input: bool,

    /// Print a status snapshot (combine with -i to exit afterwards)
    #[arg(short, long)]
    pub status: bool,

    /// uinput node
    #[arg(short, long, value_name = "PATH")]
    pub uinput: Option<PathBuf>,

    /// Print version and exit
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Key poll interval in milliseconds
    #[arg(long, value_name = "MS")]
    pub poll_ms: Option<u32>,

    /// Clear a held key's latch on every poll
    #[arg(long)]
    pub reset_held_keys: bool,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl I2cdArgs {
    /// Defaults, then the config file, then these flags; validated.
    pub fn resolve(&self) -> Result<I2cdConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_json(path)?,
            None => I2cdConfig::default(),
        };
        self.apply(&mut cfg);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn apply(&self, cfg: &mut I2cdConfig) {
        if let Some(path) = &self.adaptor {
            cfg.adaptor.clone_from(path);
        }
        if let Some(path) = &self.uinput {
            cfg.uinput.clone_from(path);
        }
        if self.daemon {
            cfg.daemon = true;
        }
        if self.no_input {
            cfg.input = false;
        }
        if let Some(ms) = self.poll_ms {
            cfg.poll_ms = ms;
        }
        if self.reset_held_keys {
            cfg.held_keys = HeldKeyPolicy::ResetWhileHeld;
        }
    }
}
