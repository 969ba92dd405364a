//! Watchdog driver against mock GPIO, delay and shutdown.

use embedded_hal::digital::PinState::{self, High, Low};

use crate::mock_hw::{EIO, GpioCall, MockGpio, RecordingDelay, RecordingShutdown};

use ups_pico::app::watchdog::{PulseTiming, Watchdog, WatchdogPins, pulse};
use ups_pico::error::{Error, PulseEdge};

const HEARTBEAT: u32 = 22;
const SENSE: u32 = 27;

type TestWatchdog = Watchdog<MockGpio, RecordingShutdown, RecordingDelay>;

fn watchdog(gpio: MockGpio, sense: Option<u32>) -> TestWatchdog {
    Watchdog::new(
        gpio,
        RecordingShutdown::default(),
        RecordingDelay::new(),
        WatchdogPins {
            heartbeat: HEARTBEAT,
            sense,
        },
        PulseTiming::default(),
    )
}

fn sensing(levels: &[PinState]) -> TestWatchdog {
    let mut gpio = MockGpio::new();
    gpio.script_sense(levels);
    watchdog(gpio, Some(SENSE))
}

fn ticks(wd: &mut TestWatchdog, n: usize) {
    for _ in 0..n {
        let _ = wd.tick();
    }
}

#[test]
fn first_tick_pulses_even_without_power() {
    let mut wd = sensing(&[Low]);
    let plan = wd.tick();

    assert!(plan.pulse);
    assert!(!plan.shutdown);
    assert_eq!(wd.gpio().levels(HEARTBEAT), vec![High, Low]);
    assert_eq!(wd.delay().waits_us, vec![250_000, 250_000]);
}

#[test]
fn absent_board_never_shuts_down() {
    let mut wd = sensing(&[]);
    ticks(&mut wd, 10);

    assert_eq!(wd.shutdown_action().triggered, 0);
    // Only the initial pulse; afterwards one idle period per tick.
    assert_eq!(wd.gpio().levels(HEARTBEAT).len(), 2);
    assert_eq!(wd.delay().total_ms(), 10 * 500);
}

#[test]
fn sense_drop_after_high_triggers_one_shutdown() {
    let mut wd = sensing(&[Low, High, High, Low, Low, Low]);

    ticks(&mut wd, 3);
    assert_eq!(wd.shutdown_action().triggered, 0);

    let plan = wd.tick();
    assert!(plan.shutdown);
    assert_eq!(wd.shutdown_action().triggered, 1);

    ticks(&mut wd, 2);
    assert_eq!(wd.shutdown_action().triggered, 1);
}

#[test]
fn second_power_cycle_rearms_the_trigger() {
    let mut wd = sensing(&[Low, High, High, Low, Low, High, Low]);
    ticks(&mut wd, 7);
    assert_eq!(wd.shutdown_action().triggered, 2);
    assert!(!wd.state().fssd_was_high());
}

#[test]
fn pulse_train_runs_while_power_is_present() {
    let mut wd = sensing(&[High, High, High]);
    ticks(&mut wd, 3);
    assert_eq!(
        wd.gpio().levels(HEARTBEAT),
        vec![High, Low, High, Low, High, Low]
    );
    assert_eq!(wd.delay().total_ms(), 3 * 500);
}

#[test]
fn unreadable_sense_neither_arms_nor_fires() {
    let mut gpio = MockGpio::new();
    gpio.script_sense(&[High]);
    gpio.fail_next_read();
    gpio.script_sense(&[Low]);
    let mut wd = watchdog(gpio, Some(SENSE));

    ticks(&mut wd, 2);
    assert_eq!(wd.shutdown_action().triggered, 0);
    assert!(wd.state().fssd_was_high());

    let _ = wd.tick();
    assert_eq!(wd.shutdown_action().triggered, 1);
}

#[test]
fn disabled_sense_pulses_forever_without_reading() {
    let mut wd = watchdog(MockGpio::new(), None);
    ticks(&mut wd, 4);

    assert_eq!(wd.gpio().levels(HEARTBEAT).len(), 8);
    assert!(
        !wd.gpio()
            .calls
            .iter()
            .any(|c| matches!(c, GpioCall::GetLevel(_)))
    );
    assert_eq!(wd.shutdown_action().triggered, 0);
}

#[test]
fn failed_pulse_keeps_the_period() {
    let mut gpio = MockGpio::new();
    gpio.fail_level = Some(High);
    gpio.script_sense(&[High, High]);
    let mut wd = watchdog(gpio, Some(SENSE));

    ticks(&mut wd, 2);
    assert_eq!(wd.delay().total_ms(), 2 * 500);
    assert_eq!(wd.gpio().levels(HEARTBEAT), vec![High, Low, High, Low]);
}

#[test]
fn rising_edge_failure_still_drives_low() {
    let mut gpio = MockGpio::new();
    gpio.fail_level = Some(High);
    let mut delay = RecordingDelay::new();

    let err = pulse(&mut gpio, HEARTBEAT, PulseTiming::default(), &mut delay).unwrap_err();

    assert_eq!(
        err,
        Error::Pulse {
            pin: HEARTBEAT,
            edge: PulseEdge::Rising,
            code: EIO,
        }
    );
    assert_eq!(gpio.levels(HEARTBEAT), vec![High, Low]);
    assert_eq!(delay.waits_us, vec![250_000, 250_000]);
}

#[test]
fn falling_edge_failure_is_reported() {
    let mut gpio = MockGpio::new();
    gpio.fail_level = Some(Low);
    let mut delay = RecordingDelay::new();
    let timing = PulseTiming {
        period_ms: 1_000,
        high_ms: 100,
    };

    let err = pulse(&mut gpio, HEARTBEAT, timing, &mut delay).unwrap_err();

    assert!(matches!(
        err,
        Error::Pulse {
            edge: PulseEdge::Falling,
            ..
        }
    ));
    assert_eq!(delay.waits_us, vec![100_000, 900_000]);
}
