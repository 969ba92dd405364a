//! pico-i2cd: PIco UPS register client.
//!
//! Prints a status snapshot on request and turns the board's three keys
//! into `BTN_A`/`BTN_B`/`BTN_C` events on a uinput device.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use ups_pico::adapters::{LinuxI2cBus, SystemDelay, UinputSink, daemonize};
use ups_pico::app::input_engine::InputEngine;
use ups_pico::app::register_client::RegisterClient;
use ups_pico::app::status::StatusReport;
use ups_pico::cli::I2cdArgs;

fn main() -> Result<()> {
    let args = I2cdArgs::parse();
    if args.version {
        println!("pico-i2cd {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = args.resolve().context("invalid configuration")?;

    let bus = LinuxI2cBus::open(&cfg.adaptor)
        .with_context(|| format!("could not open adaptor {}", cfg.adaptor.display()))?;
    let mut client = RegisterClient::new(bus);

    if args.status {
        print!("{}", StatusReport::collect(&mut client));
    }

    if !cfg.input {
        return Ok(());
    }

    let mut sink = UinputSink::open(&cfg.uinput, &cfg.device_name)
        .with_context(|| format!("could not create input device on {}", cfg.uinput.display()))?;

    if cfg.daemon {
        info!("detaching; stderr logging stops here");
        daemonize().context("failed to daemonise")?;
    }

    info!("pico-i2cd v{} polling {}", env!("CARGO_PKG_VERSION"), cfg.adaptor.display());
    let mut engine = InputEngine::new(cfg.held_keys);
    engine.run(&mut client, &mut sink, &mut SystemDelay, cfg.poll_ms)
}
