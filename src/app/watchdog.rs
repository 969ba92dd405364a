//! Heartbeat and FSSD (file safe shut down) handshake.
//!
//! The board expects a steady pulse train on the heartbeat line as proof
//! that the host is alive, and raises the sense line while external power is
//! present. When the sense line drops after having been seen high, the host
//! must shut down cleanly before the battery runs out.
//!
//! ```text
//!   sense ──▶ WatchdogState::step ──▶ TickPlan { pulse, shutdown }
//!                                        │          │
//!                        pulse() ◀───────┘          └──▶ ShutdownAction
//! ```
//!
//! The "seen high at least once" gate keeps an unpowered or absent board
//! (sense floating or stuck low) from ever shutting the host down, and stops
//! the trigger from repeating every period once the line is already low.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;
use log::{debug, info, warn};

use crate::error::{Error, PulseEdge, Result};

use super::ports::{BestEffort, GpioTransport, ShutdownAction};

// ───────────────────────────────────────────────────────────────
// Pure state machine
// ───────────────────────────────────────────────────────────────

/// One sample of the sense line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenseReading {
    High,
    Low,
    /// The read failed; counts as neither high nor low.
    Unavailable,
}

impl From<PinState> for SenseReading {
    fn from(level: PinState) -> Self {
        match level {
            PinState::High => Self::High,
            PinState::Low => Self::Low,
        }
    }
}

/// What one loop iteration has to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickPlan {
    pub pulse: bool,
    pub shutdown: bool,
}

/// Handshake flags carried from one iteration to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchdogState {
    fssd_was_high: bool,
    initial_pulse_sent: bool,
}

impl WatchdogState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Has the sense line been high since the last shutdown trigger?
    pub fn fssd_was_high(&self) -> bool {
        self.fssd_was_high
    }

    pub fn initial_pulse_sent(&self) -> bool {
        self.initial_pulse_sent
    }

    /// Fold one sense sample into the state and plan the iteration.
    pub fn step(&mut self, sense: SenseReading) -> TickPlan {
        if sense == SenseReading::High {
            self.fssd_was_high = true;
        }

        let pulse = !self.initial_pulse_sent || self.fssd_was_high;
        if pulse {
            self.initial_pulse_sent = true;
        }

        let shutdown = self.fssd_was_high && sense == SenseReading::Low;
        if shutdown {
            // Re-arm: a later high-then-low edge triggers again.
            self.fssd_was_high = false;
        }

        TickPlan { pulse, shutdown }
    }
}

// ───────────────────────────────────────────────────────────────
// Pulse primitive
// ───────────────────────────────────────────────────────────────

/// Heartbeat waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseTiming {
    /// Full period, in milliseconds.
    pub period_ms: u32,
    /// Time spent high at the start of each period, in milliseconds.
    pub high_ms: u32,
}

impl PulseTiming {
    pub const fn low_ms(&self) -> u32 {
        self.period_ms.saturating_sub(self.high_ms)
    }
}

impl Default for PulseTiming {
    fn default() -> Self {
        Self {
            period_ms: 500,
            high_ms: 250,
        }
    }
}

/// Drive one period of the heartbeat on `pin`.
///
/// Both hold phases always run so the train stays roughly periodic even
/// when a level change fails; a failed rising edge still attempts the
/// falling edge. The first failure is returned.
pub fn pulse<G, D>(gpio: &mut G, pin: u32, timing: PulseTiming, delay: &mut D) -> Result<()>
where
    G: GpioTransport,
    D: DelayNs,
{
    let rising = gpio.set_level(pin, PinState::High);
    delay.delay_ms(timing.high_ms);
    let falling = gpio.set_level(pin, PinState::Low);
    delay.delay_ms(timing.low_ms());

    rising.map_err(|code| Error::Pulse {
        pin,
        edge: PulseEdge::Rising,
        code,
    })?;
    falling.map_err(|code| Error::Pulse {
        pin,
        edge: PulseEdge::Falling,
        code,
    })
}

// ───────────────────────────────────────────────────────────────
// Driver
// ───────────────────────────────────────────────────────────────

/// Lines the watchdog drives and samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogPins {
    pub heartbeat: u32,
    /// `None` disables sense monitoring; the line is then treated as high.
    pub sense: Option<u32>,
}

/// I/O shell around [`WatchdogState`].
pub struct Watchdog<G, S, D> {
    gpio: G,
    shutdown: S,
    delay: D,
    pins: WatchdogPins,
    timing: PulseTiming,
    state: WatchdogState,
}

impl<G, S, D> Watchdog<G, S, D>
where
    G: GpioTransport,
    S: ShutdownAction,
    D: DelayNs,
{
    pub fn new(gpio: G, shutdown: S, delay: D, pins: WatchdogPins, timing: PulseTiming) -> Self {
        Self {
            gpio,
            shutdown,
            delay,
            pins,
            timing,
            state: WatchdogState::new(),
        }
    }

    pub fn state(&self) -> &WatchdogState {
        &self.state
    }

    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    pub fn shutdown_action(&self) -> &S {
        &self.shutdown
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    fn read_sense(&mut self) -> SenseReading {
        let Some(pin) = self.pins.sense else {
            return SenseReading::High;
        };
        match self.gpio.get_level(pin) {
            Ok(level) => SenseReading::from(level),
            Err(code) => {
                debug!("watchdog: sense GPIO {pin} unreadable ({code})");
                SenseReading::Unavailable
            }
        }
    }

    /// Run one iteration, taking roughly one period.
    pub fn tick(&mut self) -> TickPlan {
        let sense = self.read_sense();
        let plan = self.state.step(sense);

        if plan.pulse {
            BestEffort::new(pulse(
                &mut self.gpio,
                self.pins.heartbeat,
                self.timing,
                &mut self.delay,
            ))
            .discard("watchdog: heartbeat pulse");
        }

        if plan.shutdown {
            warn!("watchdog: FSSD line dropped, shutting the host down");
            self.shutdown.trigger();
        }

        if !plan.pulse {
            self.delay.delay_ms(self.timing.period_ms);
        }

        plan
    }

    /// Iterate forever.
    pub fn run(&mut self) -> ! {
        info!(
            "watchdog: heartbeat on GPIO {} ({}ms/{}ms), sense {}",
            self.pins.heartbeat,
            self.timing.high_ms,
            self.timing.period_ms,
            self.pins
                .sense
                .map_or_else(|| "disabled".to_string(), |pin| format!("on GPIO {pin}")),
        );
        loop {
            self.tick();
        }
    }
}
