//! PIco UPS host library.
//!
//! Shared by the `picod` watchdog and the `pico-i2cd` register client.
//! The protocol core in [`app`] is hardware-free; [`adapters`] binds it to
//! Linux i2c-dev, sysfs GPIO and uinput.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod pins;
pub mod registers;

pub use error::{Error, Result};
