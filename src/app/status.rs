//! One-shot status snapshot in Prometheus text exposition format.

use core::fmt;

use crate::error::Result;
use crate::registers::TemperatureProbe;

use super::ports::BusTransport;
use super::register_client::RegisterClient;

/// One reading of every register client accessor.
///
/// A failed read is kept as `None` and rendered as `NaN`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatusReport {
    pub firmware_version: Option<u8>,
    pub mode: Option<u8>,
    pub battery_volts: Option<f32>,
    pub host_volts: Option<f32>,
    pub temperatures: [Option<u8>; 2],
}

impl StatusReport {
    /// Read every accessor once, in output order.
    pub fn collect<B: BusTransport>(client: &mut RegisterClient<B>) -> Self {
        let firmware_version = reading(client.firmware_version(), "firmware version");
        let mode = reading(client.mode(), "mode");
        let battery_volts = reading(client.battery_voltage(), "battery voltage");
        let host_volts = reading(client.host_voltage(), "host voltage");
        let temperatures =
            TemperatureProbe::ALL.map(|probe| reading(client.temperature(probe), "temperature"));
        Self {
            firmware_version,
            mode,
            battery_volts,
            host_volts,
            temperatures,
        }
    }

    /// Number of accessors that failed.
    pub fn failures(&self) -> usize {
        [
            self.firmware_version.is_none(),
            self.mode.is_none(),
            self.battery_volts.is_none(),
            self.host_volts.is_none(),
        ]
        .into_iter()
        .chain(self.temperatures.iter().map(Option::is_none))
        .filter(|failed| *failed)
        .count()
    }
}

fn reading<T>(result: Result<T>, what: &str) -> Option<T> {
    result
        .map_err(|e| log::debug!("status: {what} unavailable: {e}"))
        .ok()
}

struct Integer(Option<u8>);

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v}"),
            None => f.write_str("NaN"),
        }
    }
}

struct Volts(Option<f32>);

impl fmt::Display for Volts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v:.2}"),
            None => f.write_str("NaN"),
        }
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "pico_firmware_version {}", Integer(self.firmware_version))?;
        writeln!(f, "pico_mode {}", Integer(self.mode))?;
        writeln!(f, "pico_battery_volts {}", Volts(self.battery_volts))?;
        writeln!(f, "pico_host_volts {}", Volts(self.host_volts))?;
        for (probe, value) in TemperatureProbe::ALL.iter().zip(self.temperatures) {
            writeln!(
                f,
                "pico_temperature_{}_celsius_degrees {}",
                probe.number(),
                Integer(value)
            )?;
        }
        Ok(())
    }
}
