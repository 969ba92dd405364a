//! Input event engine: polled key registers to clean press/release events.
//!
//! ## Per-key state machine
//!
//! | State   | Status read | Action                                   | Next    |
//! |---------|-------------|------------------------------------------|---------|
//! | `Idle`  | nonzero     | emit press, clear latch (best effort)    | `Armed` |
//! | `Idle`  | zero        | none                                     | `Idle`  |
//! | `Armed` | zero        | emit release                             | `Idle`  |
//! | `Armed` | nonzero     | [`HeldKeyPolicy`]; never a second press  | `Armed` |
//!
//! A transition only commits when the sink accepts the event. A rejected
//! write leaves the key where it was, so the same transition is offered
//! again on the next poll. After every key has been scanned, one sync
//! barrier closes the batch if anything was committed.
//!
//! [`InputEngine::poll`] runs exactly one cycle against injected ports;
//! [`InputEngine::tick`] adds the fixed sleep and [`InputEngine::run`]
//! repeats it.

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::registers::{KEY_COUNT, PicoKey};

use super::ports::{BestEffort, BusTransport, EventSink, SinkRejected};
use super::register_client::RegisterClient;

// ───────────────────────────────────────────────────────────────
// Key state
// ───────────────────────────────────────────────────────────────

/// Debounce phase of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    /// Last reported state was "released".
    Idle,
    /// A press was reported; waiting for the latch to read zero.
    Armed,
}

/// A key edge the sink has to hear about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Press,
    Release,
}

impl Transition {
    pub fn pressed(self) -> bool {
        self == Self::Press
    }
}

/// What to do when an armed key still reads as pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeldKeyPolicy {
    /// Leave the latch alone until it reads zero.
    #[default]
    Ignore,
    /// Clear the latch again on every held cycle.
    ResetWhileHeld,
}

/// Debounce state for one physical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyState {
    key: PicoKey,
    phase: KeyPhase,
}

impl KeyState {
    pub fn new(key: PicoKey) -> Self {
        Self {
            key,
            phase: KeyPhase::Idle,
        }
    }

    pub fn key(&self) -> PicoKey {
        self.key
    }

    pub fn phase(&self) -> KeyPhase {
        self.phase
    }

    /// True between an accepted press and its accepted release.
    pub fn awaiting_release(&self) -> bool {
        self.phase == KeyPhase::Armed
    }

    /// Transition implied by a status read, without committing it.
    pub fn pending(&self, status: u8) -> Option<Transition> {
        match (self.phase, status != 0) {
            (KeyPhase::Idle, true) => Some(Transition::Press),
            (KeyPhase::Armed, false) => Some(Transition::Release),
            _ => None,
        }
    }

    /// Advance after the sink accepted `transition`.
    pub fn commit(&mut self, transition: Transition) {
        self.phase = match transition {
            Transition::Press => KeyPhase::Armed,
            Transition::Release => KeyPhase::Idle,
        };
    }
}

// ───────────────────────────────────────────────────────────────
// Cycle report
// ───────────────────────────────────────────────────────────────

/// Outcome of one poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Transitions committed this cycle, in scan order.
    pub transitions: Vec<(PicoKey, Transition), KEY_COUNT>,
    /// Keys whose status register could not be read.
    pub read_failures: u8,
    /// Transitions the sink refused; they are retried next cycle.
    pub rejected: u8,
    /// Whether a sync barrier was written (accepted or not).
    pub synced: bool,
}

impl CycleReport {
    pub fn is_quiet(&self) -> bool {
        self.transitions.is_empty() && self.read_failures == 0 && self.rejected == 0
    }
}

// ───────────────────────────────────────────────────────────────
// Engine
// ───────────────────────────────────────────────────────────────

/// Debounce engine for all board keys.
pub struct InputEngine {
    keys: [KeyState; KEY_COUNT],
    policy: HeldKeyPolicy,
}

impl InputEngine {
    pub fn new(policy: HeldKeyPolicy) -> Self {
        Self {
            keys: PicoKey::ALL.map(KeyState::new),
            policy,
        }
    }

    pub fn policy(&self) -> HeldKeyPolicy {
        self.policy
    }

    pub fn key_state(&self, key: PicoKey) -> &KeyState {
        &self.keys[key.index()]
    }

    /// Run one poll cycle: scan every key, then close the batch.
    pub fn poll<B, S>(&mut self, client: &mut RegisterClient<B>, sink: &mut S) -> CycleReport
    where
        B: BusTransport,
        S: EventSink,
    {
        let mut report = CycleReport::default();

        for state in &mut self.keys {
            let key = state.key();
            let status = match client.key_status(key) {
                Ok(status) => status,
                Err(e) => {
                    debug!("input: key {key:?} status unavailable: {e}");
                    report.read_failures += 1;
                    continue;
                }
            };

            let Some(transition) = state.pending(status) else {
                if state.awaiting_release() && self.policy == HeldKeyPolicy::ResetWhileHeld {
                    BestEffort::new(client.reset_key(key)).discard("input: held key reset");
                }
                continue;
            };

            if !sink.emit_key(key, transition.pressed()).is_accepted() {
                trace!("input: {key:?} {transition:?} rejected, retrying next cycle");
                report.rejected += 1;
                continue;
            }

            state.commit(transition);
            if transition == Transition::Press {
                // The latch is cleared after the press is out; the key stays
                // armed whether or not the board took the write.
                BestEffort::new(client.reset_key(key)).discard("input: key latch reset");
            }
            debug!("input: {key:?} {transition:?}");
            // At most one transition per key per cycle, so this never overflows.
            if report.transitions.push((key, transition)).is_err() {
                debug!("input: transition report full");
            }
        }

        if !report.transitions.is_empty() {
            BestEffort::<SinkRejected>::from(sink.emit_sync()).discard("input: sync barrier");
            report.synced = true;
        }

        report
    }

    /// One poll cycle followed by the fixed `interval_ms` sleep.
    pub fn tick<B, S, D>(
        &mut self,
        client: &mut RegisterClient<B>,
        sink: &mut S,
        delay: &mut D,
        interval_ms: u32,
    ) -> CycleReport
    where
        B: BusTransport,
        S: EventSink,
        D: DelayNs,
    {
        let report = self.poll(client, sink);
        if !report.is_quiet() {
            trace!("input: cycle {report:?}");
        }
        delay.delay_ms(interval_ms);
        report
    }

    /// Tick forever.
    pub fn run<B, S, D>(
        &mut self,
        client: &mut RegisterClient<B>,
        sink: &mut S,
        delay: &mut D,
        interval_ms: u32,
    ) -> !
    where
        B: BusTransport,
        S: EventSink,
        D: DelayNs,
    {
        info!(
            "input: polling {} keys every {}ms (held keys: {:?})",
            KEY_COUNT, interval_ms, self.policy
        );
        loop {
            self.tick(client, sink, delay, interval_ms);
        }
    }
}
