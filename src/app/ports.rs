//! Port traits: the hexagonal boundary between the protocol core and the OS.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RegisterClient / InputEngine / Watchdog
//! ```
//!
//! Driven adapters (i2c-dev bus, sysfs GPIO, uinput, shutdown command)
//! implement these traits. The engines consume them via generics, so the
//! state machines never touch a device node directly and run unchanged
//! against the recording mocks in the test suite.

use core::fmt;

use embedded_hal::digital::PinState;
use log::debug;

use crate::registers::PicoKey;

// ───────────────────────────────────────────────────────────────
// Raw transport failures
// ───────────────────────────────────────────────────────────────

/// Numeric failure code reported by a transport primitive.
///
/// On Linux this is the `errno` of the failing syscall. The core carries it
/// through to log lines and fatal setup errors but never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawError(pub i32);

impl RawError {
    /// Code used when the OS did not report one.
    pub const UNKNOWN: Self = Self(-1);
}

impl From<std::io::Error> for RawError {
    fn from(e: std::io::Error) -> Self {
        e.raw_os_error().map_or(Self::UNKNOWN, Self)
    }
}

impl fmt::Display for RawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "errno {}", self.0)
    }
}

// ───────────────────────────────────────────────────────────────
// Register bus port (SMBus-style transactions)
// ───────────────────────────────────────────────────────────────

/// One shared handle onto the register bus.
///
/// The handle talks to one device address at a time; `select_address`
/// switches it. Opening happens in the adapter's constructor, closing in
/// its `Drop`.
pub trait BusTransport {
    /// Point subsequent transactions at `device`.
    fn select_address(&mut self, device: u8) -> Result<(), RawError>;

    /// Read a 16-bit word from `register` of the selected device.
    fn read_word(&mut self, register: u8) -> Result<u16, RawError>;

    /// Read one byte from `register` of the selected device.
    fn read_byte(&mut self, register: u8) -> Result<u8, RawError>;

    /// Write one byte to `register` of the selected device.
    fn write_byte(&mut self, register: u8, value: u8) -> Result<(), RawError>;
}

// ───────────────────────────────────────────────────────────────
// GPIO port
// ───────────────────────────────────────────────────────────────

/// Line direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// Raw GPIO primitives, addressed by line number.
pub trait GpioTransport {
    /// Bring the line under software control.
    fn export(&mut self, pin: u32) -> Result<(), RawError>;

    /// Set the line direction. May fail transiently right after `export`.
    fn set_direction(&mut self, pin: u32, direction: Direction) -> Result<(), RawError>;

    /// Drive an output line.
    fn set_level(&mut self, pin: u32, level: PinState) -> Result<(), RawError>;

    /// Sample an input line.
    fn get_level(&mut self, pin: u32) -> Result<PinState, RawError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → virtual input device)
// ───────────────────────────────────────────────────────────────

/// Whether the sink took a write.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkWrite {
    Accepted,
    Rejected,
}

impl SinkWrite {
    pub fn is_accepted(self) -> bool {
        self == Self::Accepted
    }
}

/// Receives key transitions and the per-cycle synchronisation barrier.
///
/// Device registration and capability declaration happen once, before the
/// input engine starts polling, in the adapter's constructor.
pub trait EventSink {
    /// Report `key` as pressed (`true`) or released (`false`).
    fn emit_key(&mut self, key: PicoKey, pressed: bool) -> SinkWrite;

    /// Close the batch of key events written since the last barrier.
    fn emit_sync(&mut self) -> SinkWrite;
}

// ───────────────────────────────────────────────────────────────
// Shutdown action
// ───────────────────────────────────────────────────────────────

/// Irreversible host shutdown. Fire-and-forget: nothing is returned and the
/// caller never waits for the shutdown to take effect.
pub trait ShutdownAction {
    fn trigger(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Best-effort results
// ───────────────────────────────────────────────────────────────

/// Outcome of an operation the caller is allowed, by contract, to drop.
///
/// Heartbeat pulses, hardware key resets and sync barriers are retried
/// implicitly by the next loop iteration, so their failures carry no
/// action. Wrapping them keeps the discard visible at the call site:
/// [`discard`](Self::discard) drops the outcome and logs a failure at debug
/// level.
#[must_use = "best-effort results are discarded with `.discard(..)`"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestEffort<E>(Result<(), E>);

impl<E: fmt::Display> BestEffort<E> {
    pub fn new(result: Result<(), E>) -> Self {
        Self(result)
    }

    pub fn is_ok(&self) -> bool {
        self.0.is_ok()
    }

    /// Drop the outcome; a failure is logged under `context` and forgotten.
    pub fn discard(self, context: &str) {
        if let Err(e) = self.0 {
            debug!("{context} failed (ignored): {e}");
        }
    }
}

impl From<SinkWrite> for BestEffort<SinkRejected> {
    fn from(write: SinkWrite) -> Self {
        match write {
            SinkWrite::Accepted => Self(Ok(())),
            SinkWrite::Rejected => Self(Err(SinkRejected)),
        }
    }
}

/// Error side of a best-effort sink write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkRejected;

impl fmt::Display for SinkRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sink rejected the write")
    }
}
