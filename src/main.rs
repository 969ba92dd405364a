//! picod: PIco UPS heartbeat and FSSD shutdown watchdog.
//!
//! ```text
//!   SysfsGpio ──▶ setup_pin (heartbeat: out, sense: in)
//!       │
//!       ▼
//!   Watchdog ── pulse every period ──▶ heartbeat GPIO
//!       │
//!       └── sense high→low ──▶ CommandShutdown ("shutdown -h now")
//! ```
//!
//! Setup failures are reported on the terminal before `-d` detaches.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use ups_pico::adapters::{SysfsGpio, SystemDelay, daemonize};
use ups_pico::app::pin_setup::setup_pin;
use ups_pico::app::ports::Direction;
use ups_pico::app::watchdog::Watchdog;
use ups_pico::cli::PicodArgs;

fn main() -> Result<()> {
    let args = PicodArgs::parse();
    if args.version {
        println!("picod {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = args.resolve().context("invalid configuration")?;
    let pins = cfg.pins();
    info!("picod v{} starting", env!("CARGO_PKG_VERSION"));

    let mut gpio = SysfsGpio::new(&cfg.gpio_root);
    let mut delay = SystemDelay;

    setup_pin(
        &mut gpio,
        pins.heartbeat,
        Direction::Output,
        &cfg.retry,
        &mut delay,
    )
    .with_context(|| format!("setting up heartbeat GPIO {}", pins.heartbeat))?;

    if let Some(sense) = pins.sense {
        setup_pin(&mut gpio, sense, Direction::Input, &cfg.retry, &mut delay)
            .with_context(|| format!("setting up FSSD sense GPIO {sense}"))?;
    } else {
        info!("FSSD monitoring disabled");
    }

    if cfg.daemon {
        info!("detaching; stderr logging stops here");
        daemonize().context("failed to daemonise")?;
    }

    let mut watchdog = Watchdog::new(gpio, cfg.shutdown.clone(), delay, pins, cfg.timing());
    watchdog.run()
}
