//! Unified error types for the PIco UPS daemons.
//!
//! A single `Error` enum that every subsystem converts into. Setup-time
//! variants are fatal and end up in front of the operator; steady-state
//! variants are absorbed by the polling loops and only ever logged.

use core::fmt;
use std::path::PathBuf;

use crate::app::ports::RawError;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A device node (bus adaptor or uinput) could not be opened.
    TransportOpen { path: PathBuf, code: RawError },
    /// Selecting a device address on the shared bus handle failed.
    AddressSelect { device: u8, code: RawError },
    /// A register read or write was rejected by the bus.
    Transport { device: u8, register: u8, code: RawError },
    /// A GPIO line could not be claimed.
    PinExport { pin: u32, code: RawError },
    /// A GPIO line refused its direction change on every attempt.
    DirectionSetup { pin: u32, attempts: u32, code: RawError },
    /// A level change during a heartbeat pulse failed.
    Pulse { pin: u32, edge: PulseEdge, code: RawError },
    /// The virtual input device could not be registered.
    SinkSetup { step: &'static str, code: RawError },
    /// Configuration is invalid or could not be loaded.
    Config(String),
}

/// Which half of a pulse failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseEdge {
    Rising,
    Falling,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransportOpen { path, code } => {
                write!(f, "could not open '{}' ({code})", path.display())
            }
            Self::AddressSelect { device, code } => {
                write!(f, "selecting device 0x{device:02x} failed ({code})")
            }
            Self::Transport {
                device,
                register,
                code,
            } => write!(
                f,
                "register 0x{register:02x} on device 0x{device:02x} failed ({code})"
            ),
            Self::PinExport { pin, code } => write!(f, "could not export GPIO {pin} ({code})"),
            Self::DirectionSetup {
                pin,
                attempts,
                code,
            } => write!(
                f,
                "GPIO {pin} rejected its direction after {attempts} attempts (last: {code})"
            ),
            Self::Pulse { pin, edge, code } => {
                write!(f, "{edge} edge on GPIO {pin} failed ({code})")
            }
            Self::SinkSetup { step, code } => {
                write!(f, "input device setup failed at {step} ({code})")
            }
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl fmt::Display for PulseEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rising => write!(f, "rising"),
            Self::Falling => write!(f, "falling"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// True for failures that may only happen before a polling loop starts.
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            Self::TransportOpen { .. }
                | Self::PinExport { .. }
                | Self::DirectionSetup { .. }
                | Self::SinkSetup { .. }
                | Self::Config(_)
        )
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
