//! Mock hardware adapters for integration tests.
//!
//! Each mock records every call so tests can assert on the full history
//! without touching i2c-dev, sysfs or uinput.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;
use ups_pico::app::ports::{
    BusTransport, Direction, EventSink, GpioTransport, RawError, ShutdownAction, SinkWrite,
};
use ups_pico::registers::{BusAddress, PicoKey};

/// errno the mocks report for injected failures (EIO).
pub const EIO: RawError = RawError(5);

// ── Register bus ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusCall {
    Select(u8),
    ReadWord(BusAddress),
    ReadByte(BusAddress),
    WriteByte(BusAddress, u8),
}

/// Bus with per-register scripted answers.
///
/// A register answers from its script until the script runs dry, then
/// falls back to its fixed value (zero if none was set).
#[derive(Default)]
pub struct MockBus {
    pub calls: Vec<BusCall>,
    selected: Option<u8>,
    values: HashMap<BusAddress, u16>,
    scripts: HashMap<BusAddress, VecDeque<Result<u16, RawError>>>,
    pub fail_select: Option<RawError>,
    pub fail_writes: Option<RawError>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, addr: BusAddress, value: u16) -> &mut Self {
        self.values.insert(addr, value);
        self
    }

    pub fn script(&mut self, addr: BusAddress, answers: &[u16]) -> &mut Self {
        self.scripts
            .entry(addr)
            .or_default()
            .extend(answers.iter().map(|&v| Ok(v)));
        self
    }

    pub fn fail_next(&mut self, addr: BusAddress, code: RawError) -> &mut Self {
        self.scripts.entry(addr).or_default().push_back(Err(code));
        self
    }

    pub fn selects(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, BusCall::Select(_)))
            .count()
    }

    pub fn writes(&self) -> Vec<(BusAddress, u8)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                BusCall::WriteByte(addr, value) => Some((*addr, *value)),
                _ => None,
            })
            .collect()
    }

    fn address(&self, register: u8) -> Result<BusAddress, RawError> {
        // ENXIO: nothing selected
        let device = self.selected.ok_or(RawError(6))?;
        Ok(BusAddress::new(device, register))
    }

    fn answer(&mut self, addr: BusAddress) -> Result<u16, RawError> {
        if let Some(next) = self.scripts.get_mut(&addr).and_then(VecDeque::pop_front) {
            return next;
        }
        Ok(self.values.get(&addr).copied().unwrap_or(0))
    }
}

impl BusTransport for MockBus {
    fn select_address(&mut self, device: u8) -> Result<(), RawError> {
        self.calls.push(BusCall::Select(device));
        if let Some(code) = self.fail_select {
            return Err(code);
        }
        self.selected = Some(device);
        Ok(())
    }

    fn read_word(&mut self, register: u8) -> Result<u16, RawError> {
        let addr = self.address(register)?;
        self.calls.push(BusCall::ReadWord(addr));
        self.answer(addr)
    }

    fn read_byte(&mut self, register: u8) -> Result<u8, RawError> {
        let addr = self.address(register)?;
        self.calls.push(BusCall::ReadByte(addr));
        self.answer(addr).map(|v| v as u8)
    }

    fn write_byte(&mut self, register: u8, value: u8) -> Result<(), RawError> {
        let addr = self.address(register)?;
        self.calls.push(BusCall::WriteByte(addr, value));
        match self.fail_writes {
            Some(code) => Err(code),
            None => Ok(()),
        }
    }
}

// ── GPIO ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioCall {
    Export(u32),
    SetDirection(u32, Direction),
    SetLevel(u32, PinState),
    GetLevel(u32),
}

/// GPIO lines with a scripted sense input.
///
/// Reads answer from the script, then stay `Low` once it runs dry.
#[derive(Default)]
pub struct MockGpio {
    pub calls: Vec<GpioCall>,
    sense: VecDeque<Result<PinState, RawError>>,
    pub fail_export: Option<RawError>,
    /// Number of upcoming direction changes that fail.
    pub failing_directions: u32,
    /// Level that always fails to be driven.
    pub fail_level: Option<PinState>,
}

impl MockGpio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_sense(&mut self, levels: &[PinState]) -> &mut Self {
        self.sense.extend(levels.iter().map(|&l| Ok(l)));
        self
    }

    pub fn fail_next_read(&mut self) -> &mut Self {
        self.sense.push_back(Err(EIO));
        self
    }

    pub fn levels(&self, pin: u32) -> Vec<PinState> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                GpioCall::SetLevel(p, level) if *p == pin => Some(*level),
                _ => None,
            })
            .collect()
    }

    pub fn direction_attempts(&self, pin: u32) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, GpioCall::SetDirection(p, _) if *p == pin))
            .count()
    }
}

impl GpioTransport for MockGpio {
    fn export(&mut self, pin: u32) -> Result<(), RawError> {
        self.calls.push(GpioCall::Export(pin));
        match self.fail_export {
            Some(code) => Err(code),
            None => Ok(()),
        }
    }

    fn set_direction(&mut self, pin: u32, direction: Direction) -> Result<(), RawError> {
        self.calls.push(GpioCall::SetDirection(pin, direction));
        if self.failing_directions > 0 {
            self.failing_directions -= 1;
            // EACCES, as sysfs reports before udev fixes permissions
            return Err(RawError(13));
        }
        Ok(())
    }

    fn set_level(&mut self, pin: u32, level: PinState) -> Result<(), RawError> {
        self.calls.push(GpioCall::SetLevel(pin, level));
        if self.fail_level == Some(level) {
            return Err(EIO);
        }
        Ok(())
    }

    fn get_level(&mut self, pin: u32) -> Result<PinState, RawError> {
        self.calls.push(GpioCall::GetLevel(pin));
        self.sense.pop_front().unwrap_or(Ok(PinState::Low))
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    Key(PicoKey, bool),
    Sync,
}

/// Records accepted events; refuses the next `reject_keys` key writes and
/// the next `reject_syncs` barriers.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
    pub reject_keys: u32,
    pub reject_syncs: u32,
    pub rejected: u32,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presses(&self, key: PicoKey) -> usize {
        self.events
            .iter()
            .filter(|e| **e == SinkEvent::Key(key, true))
            .count()
    }

    pub fn releases(&self, key: PicoKey) -> usize {
        self.events
            .iter()
            .filter(|e| **e == SinkEvent::Key(key, false))
            .count()
    }

    pub fn syncs(&self) -> usize {
        self.events.iter().filter(|e| **e == SinkEvent::Sync).count()
    }
}

impl EventSink for RecordingSink {
    fn emit_key(&mut self, key: PicoKey, pressed: bool) -> SinkWrite {
        if self.reject_keys > 0 {
            self.reject_keys -= 1;
            self.rejected += 1;
            return SinkWrite::Rejected;
        }
        self.events.push(SinkEvent::Key(key, pressed));
        SinkWrite::Accepted
    }

    fn emit_sync(&mut self) -> SinkWrite {
        if self.reject_syncs > 0 {
            self.reject_syncs -= 1;
            self.rejected += 1;
            return SinkWrite::Rejected;
        }
        self.events.push(SinkEvent::Sync);
        SinkWrite::Accepted
    }
}

// ── Delay and shutdown ────────────────────────────────────────

/// Records every requested wait, in microseconds.
#[derive(Default)]
pub struct RecordingDelay {
    pub waits_us: Vec<u64>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_ms(&self) -> u64 {
        self.waits_us.iter().sum::<u64>() / 1_000
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.waits_us.push(u64::from(ns) / 1_000);
    }

    fn delay_us(&mut self, us: u32) {
        self.waits_us.push(u64::from(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.waits_us.push(u64::from(ms) * 1_000);
    }
}

#[derive(Default)]
pub struct RecordingShutdown {
    pub triggered: u32,
}

impl ShutdownAction for RecordingShutdown {
    fn trigger(&mut self) {
        self.triggered += 1;
    }
}
