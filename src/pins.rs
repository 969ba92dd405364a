//! Raspberry Pi header lines wired to the PIco UPS.
//!
//! Numbers are BCM GPIO numbers as used by `/sys/class/gpio`.

/// Output: heartbeat pulse train, proof of life for the board.
pub const HEARTBEAT_GPIO: u32 = 22;

/// Input: FSSD (file safe shut down) sense, high while external power is
/// present. Dropping low after having been high requests a shutdown.
pub const FSSD_SENSE_GPIO: u32 = 27;

/// Heartbeat period.
pub const HEARTBEAT_PERIOD_MS: u32 = 500;

/// High time at the start of each heartbeat period.
pub const HEARTBEAT_HIGH_MS: u32 = 250;
