//! Protocol core: register decode and the two polling state machines.
//!
//! Everything here talks to hardware through the **port traits** in
//! [`ports`], so every engine runs unchanged against the recording mocks in
//! the test suite. The Linux implementations live in [`crate::adapters`].

pub mod input_engine;
pub mod pin_setup;
pub mod ports;
pub mod register_client;
pub mod status;
pub mod watchdog;
