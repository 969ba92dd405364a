//! Adapters: Linux implementations of the port traits.
//!
//! | Adapter      | Implements       | Connects to                 |
//! |--------------|------------------|-----------------------------|
//! | `i2c_dev`    | BusTransport     | `/dev/i2c-N` (SMBus ioctls) |
//! | `sysfs_gpio` | GpioTransport    | `/sys/class/gpio`           |
//! | `uinput`     | EventSink        | `/dev/uinput`               |
//! | `process`    | ShutdownAction   | `shutdown -h now`           |
//! | `clock`      | DelayNs          | `std::thread::sleep`        |

pub mod clock;
pub mod i2c_dev;
pub mod process;
pub mod sysfs_gpio;
pub mod uinput;

pub use clock::SystemDelay;
pub use i2c_dev::LinuxI2cBus;
pub use process::{CommandShutdown, daemonize};
pub use sysfs_gpio::SysfsGpio;
pub use uinput::UinputSink;
