//! Register client: semantic reads and writes on top of a [`BusTransport`].
//!
//! The client owns the bus handle and remembers which device address the
//! handle currently points at, so that back-to-back transactions on the
//! status block cost one address select instead of one per read. Values are
//! never cached: every accessor goes back to the hardware.

use log::trace;

use crate::error::{Error, Result};
use crate::registers::{
    self, BusAddress, PicoKey, PowerSource, TemperatureProbe, decode_voltage,
};

use super::ports::BusTransport;

/// Typed access to the PIco register map.
pub struct RegisterClient<B> {
    bus: B,
    /// Device address the bus handle currently points at.
    selected: Option<u8>,
}

impl<B: BusTransport> RegisterClient<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            selected: None,
        }
    }

    /// Device address currently selected on the bus handle, if any.
    pub fn selected_address(&self) -> Option<u8> {
        self.selected
    }

    /// Borrow the underlying transport.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Give the transport back, dropping the address cache.
    pub fn into_bus(self) -> B {
        self.bus
    }

    // ── Raw transactions ─────────────────────────────────────

    /// Point the bus handle at `device` unless it already is.
    ///
    /// The cache only moves after the transport confirms the select.
    pub fn select_address(&mut self, device: u8) -> Result<()> {
        if self.selected == Some(device) {
            return Ok(());
        }
        self.bus
            .select_address(device)
            .map_err(|code| Error::AddressSelect { device, code })?;
        trace!("bus: selected device 0x{device:02x}");
        self.selected = Some(device);
        Ok(())
    }

    pub fn read_word(&mut self, addr: BusAddress) -> Result<u16> {
        self.select_address(addr.device)?;
        self.bus
            .read_word(addr.register)
            .map_err(|code| transport_error(addr, code))
    }

    pub fn read_byte(&mut self, addr: BusAddress) -> Result<u8> {
        self.select_address(addr.device)?;
        self.bus
            .read_byte(addr.register)
            .map_err(|code| transport_error(addr, code))
    }

    pub fn write_byte(&mut self, addr: BusAddress, value: u8) -> Result<()> {
        self.select_address(addr.device)?;
        self.bus
            .write_byte(addr.register, value)
            .map_err(|code| transport_error(addr, code))
    }

    // ── Typed accessors ──────────────────────────────────────

    /// Battery voltage in volts.
    pub fn battery_voltage(&mut self) -> Result<f32> {
        self.read_word(registers::BATTERY_VOLTAGE).map(decode_voltage)
    }

    /// Host supply voltage in volts.
    pub fn host_voltage(&mut self) -> Result<f32> {
        self.read_word(registers::HOST_VOLTAGE).map(decode_voltage)
    }

    pub fn firmware_version(&mut self) -> Result<u8> {
        self.read_byte(registers::FIRMWARE_VERSION)
    }

    /// Raw mode register.
    pub fn mode(&mut self) -> Result<u8> {
        self.read_byte(registers::MODE)
    }

    pub fn power_source(&mut self) -> Result<PowerSource> {
        self.mode().map(PowerSource::from)
    }

    /// Latched status of `key`; nonzero means a press is pending.
    pub fn key_status(&mut self, key: PicoKey) -> Result<u8> {
        self.read_byte(key.status_register())
    }

    /// Clear the latched status of `key`.
    pub fn reset_key(&mut self, key: PicoKey) -> Result<()> {
        self.write_byte(key.status_register(), 0)
    }

    /// Probe temperature in degrees Celsius.
    pub fn temperature(&mut self, probe: TemperatureProbe) -> Result<u8> {
        self.read_byte(probe.register())
    }
}

fn transport_error(addr: BusAddress, code: super::ports::RawError) -> Error {
    Error::Transport {
        device: addr.device,
        register: addr.register,
        code,
    }
}
