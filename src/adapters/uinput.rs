//! Linux uinput event sink.
//!
//! Registers a virtual keyboard-class device exposing `BTN_A`, `BTN_B` and
//! `BTN_C` and forwards key transitions to it as `input_event` records.
//! The device node is opened non-blocking, so a full kernel queue turns
//! into [`SinkWrite::Rejected`] instead of stalling the poll loop.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use log::{debug, info, trace};

use crate::app::ports::{EventSink, RawError, SinkWrite};
use crate::error::{Error, Result};
use crate::registers::PicoKey;

pub const DEFAULT_UINPUT: &str = "/dev/uinput";
pub const DEVICE_NAME: &str = "Raspberry Pi PIco UPS";

// <linux/input-event-codes.h>
const EV_SYN: u16 = 0x00;
const EV_KEY: u16 = 0x01;
const SYN_REPORT: u16 = 0;
const BTN_A: u16 = 0x130;
const BTN_B: u16 = 0x131;
const BTN_C: u16 = 0x132;

/// Event types the device declares: the sync barrier and key events.
const EVENT_TYPES: [u16; 2] = [EV_SYN, EV_KEY];

// <linux/input.h>
const BUS_I2C: u16 = 0x18;

// <linux/uinput.h>
const UINPUT_IOCTL_BASE: u8 = b'U';
const UINPUT_MAX_NAME_SIZE: usize = 80;
const ABS_CNT: usize = 64;

const IOC_NRBITS: u32 = 8;
const IOC_TYPEBITS: u32 = 8;
const IOC_SIZEBITS: u32 = 14;
const IOC_TYPESHIFT: u32 = IOC_NRBITS;
const IOC_SIZESHIFT: u32 = IOC_TYPESHIFT + IOC_TYPEBITS;
const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + IOC_SIZEBITS;
const IOC_NONE: u32 = 0;
const IOC_WRITE: u32 = 1;

const fn ioctl_code(direction: u32, kind: u8, nr: u8, size: usize) -> libc::c_ulong {
    ((direction << IOC_DIRSHIFT)
        | ((kind as u32) << IOC_TYPESHIFT)
        | (nr as u32)
        | ((size as u32) << IOC_SIZESHIFT)) as libc::c_ulong
}

const UI_DEV_CREATE: libc::c_ulong = ioctl_code(IOC_NONE, UINPUT_IOCTL_BASE, 1, 0);
const UI_DEV_DESTROY: libc::c_ulong = ioctl_code(IOC_NONE, UINPUT_IOCTL_BASE, 2, 0);
const UI_SET_EVBIT: libc::c_ulong = ioctl_code(
    IOC_WRITE,
    UINPUT_IOCTL_BASE,
    100,
    std::mem::size_of::<libc::c_int>(),
);
const UI_SET_KEYBIT: libc::c_ulong = ioctl_code(
    IOC_WRITE,
    UINPUT_IOCTL_BASE,
    101,
    std::mem::size_of::<libc::c_int>(),
);

/// `struct input_event`: a `timeval` (left zero, the kernel stamps it)
/// followed by type, code and value.
const EVENT_SIZE: usize = std::mem::size_of::<libc::timeval>() + 8;

/// `struct uinput_user_dev`.
const USER_DEV_SIZE: usize = UINPUT_MAX_NAME_SIZE + 8 + 4 + 4 * ABS_CNT * 4;

/// Input code reported for each board key.
pub const fn key_code(key: PicoKey) -> u16 {
    match key {
        PicoKey::A => BTN_A,
        PicoKey::B => BTN_B,
        PicoKey::C => BTN_C,
    }
}

fn encode_event(kind: u16, code: u16, value: i32) -> [u8; EVENT_SIZE] {
    let mut buf = [0u8; EVENT_SIZE];
    let tail = &mut buf[EVENT_SIZE - 8..];
    tail[0..2].copy_from_slice(&kind.to_ne_bytes());
    tail[2..4].copy_from_slice(&code.to_ne_bytes());
    tail[4..8].copy_from_slice(&value.to_ne_bytes());
    buf
}

fn encode_user_dev(name: &str) -> Vec<u8> {
    let mut buf = vec![0u8; USER_DEV_SIZE];
    // Keep a trailing NUL.
    let len = name.len().min(UINPUT_MAX_NAME_SIZE - 1);
    buf[..len].copy_from_slice(&name.as_bytes()[..len]);

    let id = UINPUT_MAX_NAME_SIZE;
    buf[id..id + 2].copy_from_slice(&BUS_I2C.to_ne_bytes());
    // vendor and product stay zero
    buf[id + 6..id + 8].copy_from_slice(&1u16.to_ne_bytes());
    // ff_effects_max and the abs tables stay zero
    buf
}

/// Virtual input device backed by `/dev/uinput`.
#[derive(Debug)]
pub struct UinputSink {
    file: File,
    path: PathBuf,
}

impl UinputSink {
    /// Open `path`, declare the key capabilities and create the device.
    pub fn open(path: impl AsRef<Path>, name: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&path)
            .map_err(|e| Error::TransportOpen {
                path: path.clone(),
                code: RawError::from(e),
            })?;
        let sink = Self { file, path };

        for kind in EVENT_TYPES {
            sink.ioctl_int(UI_SET_EVBIT, libc::c_int::from(kind), "UI_SET_EVBIT")?;
        }
        for key in PicoKey::ALL {
            sink.ioctl_int(
                UI_SET_KEYBIT,
                libc::c_int::from(key_code(key)),
                "UI_SET_KEYBIT",
            )?;
        }

        let dev = encode_user_dev(name);
        match (&sink.file).write(&dev) {
            Ok(n) if n == dev.len() => {}
            Ok(_) => {
                return Err(Error::SinkSetup {
                    step: "device description",
                    code: RawError(libc::EIO),
                });
            }
            Err(e) => {
                return Err(Error::SinkSetup {
                    step: "device description",
                    code: RawError::from(e),
                });
            }
        }

        // SAFETY: UI_DEV_CREATE takes no argument.
        let rc = unsafe { libc::ioctl(sink.file.as_raw_fd(), UI_DEV_CREATE as _) };
        if rc < 0 {
            return Err(Error::SinkSetup {
                step: "UI_DEV_CREATE",
                code: RawError::from(std::io::Error::last_os_error()),
            });
        }

        info!("input: created \"{name}\" via {}", sink.path.display());
        Ok(sink)
    }

    fn ioctl_int(&self, request: libc::c_ulong, value: libc::c_int, step: &'static str) -> Result<()> {
        // SAFETY: the UI_SET_*BIT requests take an int by value.
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), request as _, value) };
        if rc < 0 {
            return Err(Error::SinkSetup {
                step,
                code: RawError::from(std::io::Error::last_os_error()),
            });
        }
        Ok(())
    }

    fn write_event(&mut self, kind: u16, code: u16, value: i32) -> SinkWrite {
        let event = encode_event(kind, code, value);
        match self.file.write(&event) {
            Ok(n) if n == EVENT_SIZE => SinkWrite::Accepted,
            Ok(n) => {
                trace!("input: short event write ({n} of {EVENT_SIZE} bytes)");
                SinkWrite::Rejected
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                trace!("input: event queue full");
                SinkWrite::Rejected
            }
            Err(e) => {
                debug!("input: event write failed: {e}");
                SinkWrite::Rejected
            }
        }
    }
}

impl EventSink for UinputSink {
    fn emit_key(&mut self, key: PicoKey, pressed: bool) -> SinkWrite {
        self.write_event(EV_KEY, key_code(key), i32::from(pressed))
    }

    fn emit_sync(&mut self) -> SinkWrite {
        self.write_event(EV_SYN, SYN_REPORT, 0)
    }
}

impl Drop for UinputSink {
    fn drop(&mut self) {
        // SAFETY: UI_DEV_DESTROY takes no argument.
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), UI_DEV_DESTROY as _) };
        if rc < 0 {
            debug!(
                "input: UI_DEV_DESTROY failed: {}",
                std::io::Error::last_os_error()
            );
        }
    }
}
