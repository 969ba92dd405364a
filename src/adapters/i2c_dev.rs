//! Linux i2c-dev bus adapter.
//!
//! One open `/dev/i2c-N` handle, pointed at a device with `I2C_SLAVE` and
//! driven with `I2C_SMBUS` byte/word transactions. The handle is closed
//! when the adapter is dropped.

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;
use std::path::Path;

use log::debug;

use crate::app::ports::{BusTransport, RawError};
use crate::error::{Error, Result};

/// Default adaptor on a Raspberry Pi.
pub const DEFAULT_ADAPTOR: &str = "/dev/i2c-1";

// <linux/i2c-dev.h>
const I2C_SLAVE: libc::c_ulong = 0x0703;
const I2C_SMBUS: libc::c_ulong = 0x0720;

// <linux/i2c.h>
const I2C_SMBUS_WRITE: u8 = 0;
const I2C_SMBUS_READ: u8 = 1;
const I2C_SMBUS_BYTE_DATA: u32 = 2;
const I2C_SMBUS_WORD_DATA: u32 = 3;

/// `union i2c_smbus_data`: a byte, a word, or a length-prefixed block.
const SMBUS_DATA_LEN: usize = 34;

#[repr(C)]
struct SmbusIoctlData {
    read_write: u8,
    command: u8,
    size: u32,
    data: *mut [u8; SMBUS_DATA_LEN],
}

/// SMBus transport over a Linux i2c-dev character device.
#[derive(Debug)]
pub struct LinuxI2cBus {
    file: File,
}

impl LinuxI2cBus {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| Error::TransportOpen {
                path: path.clone(),
                code: RawError::from(e),
            })?;
        debug!("bus: opened {}", path.display());
        Ok(Self { file })
    }

    fn smbus(
        &mut self,
        read_write: u8,
        command: u8,
        size: u32,
        data: &mut [u8; SMBUS_DATA_LEN],
    ) -> core::result::Result<(), RawError> {
        let mut args = SmbusIoctlData {
            read_write,
            command,
            size,
            data: data as *mut _,
        };
        // SAFETY: `args` and the data block it points at outlive the call,
        // and the block is as large as the kernel's `i2c_smbus_data` union.
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), I2C_SMBUS as _, &mut args) };
        if rc < 0 {
            return Err(RawError::from(std::io::Error::last_os_error()));
        }
        Ok(())
    }
}

impl BusTransport for LinuxI2cBus {
    fn select_address(&mut self, device: u8) -> core::result::Result<(), RawError> {
        // SAFETY: I2C_SLAVE takes the address by value.
        let rc = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                I2C_SLAVE as _,
                libc::c_ulong::from(device),
            )
        };
        if rc < 0 {
            return Err(RawError::from(std::io::Error::last_os_error()));
        }
        Ok(())
    }

    fn read_word(&mut self, register: u8) -> core::result::Result<u16, RawError> {
        let mut data = [0u8; SMBUS_DATA_LEN];
        self.smbus(I2C_SMBUS_READ, register, I2C_SMBUS_WORD_DATA, &mut data)?;
        Ok(u16::from_ne_bytes([data[0], data[1]]))
    }

    fn read_byte(&mut self, register: u8) -> core::result::Result<u8, RawError> {
        let mut data = [0u8; SMBUS_DATA_LEN];
        self.smbus(I2C_SMBUS_READ, register, I2C_SMBUS_BYTE_DATA, &mut data)?;
        Ok(data[0])
    }

    fn write_byte(&mut self, register: u8, value: u8) -> core::result::Result<(), RawError> {
        let mut data = [0u8; SMBUS_DATA_LEN];
        data[0] = value;
        self.smbus(I2C_SMBUS_WRITE, register, I2C_SMBUS_BYTE_DATA, &mut data)
    }
}
