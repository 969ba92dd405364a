//! Blocking delay on the host's monotonic clock.

use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;

/// [`DelayNs`] backed by `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDelay;

impl DelayNs for SystemDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        thread::sleep(Duration::from_micros(u64::from(us)));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
