//! GPIO line bring-up with bounded retry.
//!
//! Right after a line is exported the kernel may still be creating its
//! attribute files, and the first direction writes fail with `EACCES` or
//! `ENOENT` until udev has caught up. Export itself is never retried.

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::ports::{Direction, GpioTransport, RawError};

/// Bounded quadratic backoff for direction changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total direction attempts, including the first one.
    pub max_attempts: u32,
    /// Backoff unit in microseconds.
    pub base_unit_us: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 9,
            base_unit_us: 1_000,
        }
    }
}

impl RetryPolicy {
    /// Wait before 1-based attempt `attempt`: `(attempt - 1)² × base_unit`.
    pub fn backoff_us(&self, attempt: u32) -> u32 {
        let n = attempt.saturating_sub(1);
        n.saturating_mul(n).saturating_mul(self.base_unit_us)
    }
}

/// Claim `pin` and set its direction, retrying the direction change.
pub fn setup_pin<G, D>(
    gpio: &mut G,
    pin: u32,
    direction: Direction,
    policy: &RetryPolicy,
    delay: &mut D,
) -> Result<()>
where
    G: GpioTransport,
    D: DelayNs,
{
    gpio.export(pin)
        .map_err(|code| Error::PinExport { pin, code })?;

    let mut last = RawError::UNKNOWN;
    for attempt in 1..=policy.max_attempts {
        let wait = policy.backoff_us(attempt);
        if wait > 0 {
            delay.delay_us(wait);
        }
        match gpio.set_direction(pin, direction) {
            Ok(()) => {
                if attempt > 1 {
                    info!("gpio: GPIO {pin} ready after {attempt} attempts");
                }
                debug!("gpio: GPIO {pin} set to {direction:?}");
                return Ok(());
            }
            Err(code) => {
                debug!("gpio: GPIO {pin} direction attempt {attempt} failed ({code})");
                last = code;
            }
        }
    }

    warn!(
        "gpio: giving up on GPIO {pin} after {} attempts",
        policy.max_attempts
    );
    Err(Error::DirectionSetup {
        pin,
        attempts: policy.max_attempts,
        code: last,
    })
}
