//! PIco UPS register map.
//!
//! Every quantity the host can read or write lives at a fixed
//! (device address, register offset) pair. The board answers on two
//! device addresses: `0x69` for live status and `0x6b` for identity.

// ---------------------------------------------------------------------------
// Device addresses
// ---------------------------------------------------------------------------

/// Live status block (mode, voltages, keys, temperatures).
pub const STATUS_DEVICE: u8 = 0x69;

/// Identity block (firmware version).
pub const IDENTITY_DEVICE: u8 = 0x6b;

// ---------------------------------------------------------------------------
// Status block registers
// ---------------------------------------------------------------------------

pub const REG_MODE: u8 = 0x00; // byte
pub const REG_BATTERY_VOLTAGE: u8 = 0x01; // word, fixed-point
pub const REG_HOST_VOLTAGE: u8 = 0x03; // word, fixed-point
pub const REG_KEY_BASE: u8 = 0x09; // byte per key, +0..2
pub const REG_TEMPERATURE_1: u8 = 0x0c; // byte, degrees Celsius
pub const REG_TEMPERATURE_2: u8 = 0x0d; // byte, degrees Celsius

// ---------------------------------------------------------------------------
// Identity block registers
// ---------------------------------------------------------------------------

pub const REG_FIRMWARE_VERSION: u8 = 0x00; // byte

/// Number of user keys on the board.
pub const KEY_COUNT: usize = 3;

// ---------------------------------------------------------------------------
// Typed addresses
// ---------------------------------------------------------------------------

/// One readable or writable hardware register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BusAddress {
    pub device: u8,
    pub register: u8,
}

impl BusAddress {
    pub const fn new(device: u8, register: u8) -> Self {
        Self { device, register }
    }
}

pub const MODE: BusAddress = BusAddress::new(STATUS_DEVICE, REG_MODE);
pub const BATTERY_VOLTAGE: BusAddress = BusAddress::new(STATUS_DEVICE, REG_BATTERY_VOLTAGE);
pub const HOST_VOLTAGE: BusAddress = BusAddress::new(STATUS_DEVICE, REG_HOST_VOLTAGE);
pub const FIRMWARE_VERSION: BusAddress = BusAddress::new(IDENTITY_DEVICE, REG_FIRMWARE_VERSION);

/// A user key on the board, in register order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PicoKey {
    A,
    B,
    C,
}

impl PicoKey {
    pub const ALL: [Self; KEY_COUNT] = [Self::A, Self::B, Self::C];

    /// Logical index (0..2).
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
        }
    }

    /// Status register for this key. Nonzero while a press is latched.
    pub const fn status_register(self) -> BusAddress {
        BusAddress::new(STATUS_DEVICE, REG_KEY_BASE + self.index() as u8)
    }
}

/// On-board temperature probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureProbe {
    First,
    Second,
}

impl TemperatureProbe {
    pub const ALL: [Self; 2] = [Self::First, Self::Second];

    pub const fn register(self) -> BusAddress {
        match self {
            Self::First => BusAddress::new(STATUS_DEVICE, REG_TEMPERATURE_1),
            Self::Second => BusAddress::new(STATUS_DEVICE, REG_TEMPERATURE_2),
        }
    }

    /// 1-based probe number as printed on the board.
    pub const fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a fixed-point voltage word.
///
/// The high byte is the integer part, the low byte the hundredths. Bytes
/// above 99 are not re-normalised: `0x0A64` decodes to `10 + 100/100 = 11.0`.
pub fn decode_voltage(word: u16) -> f32 {
    let integer = f32::from((word >> 8) as u8);
    let fraction = f32::from((word & 0xff) as u8);
    integer + fraction / 100.0
}

/// Board power source, from the mode register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerSource {
    /// Running from the host's supply.
    Host,
    /// Running from the UPS battery.
    Battery,
    /// Any value the firmware documents differently.
    Other(u8),
}

impl From<u8> for PowerSource {
    fn from(raw: u8) -> Self {
        match raw {
            1 => Self::Host,
            2 => Self::Battery,
            other => Self::Other(other),
        }
    }
}
