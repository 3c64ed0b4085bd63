// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Raw byte access to the I2C bus.
//!
//! The [`Transport`] trait is what the command layer talks to. The Linux
//! implementation is a [`LinuxI2CDevice`] bound to the SGP30 address; tests
//! plug in scripted transports.

use crate::error::Sgp30Error;
use i2cdev::core::I2CDevice;
use i2cdev::linux::LinuxI2CDevice;
use log::info;
use std::io;
use std::path::Path;

/// Fixed 7 bit address of the SGP30
pub const SGP30_ADDRESS: u16 = 0x58;

/// Bus used when no device path is given
pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";

/// Byte level access to an addressed I2C device.
///
/// Both operations report how many bytes actually moved. The command layer
/// treats anything short of the requested length as a transport failure,
/// implementations must not retry.
pub trait Transport {
    /// Writes `bytes` to the device, returning the number of bytes written.
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;

    /// Reads into `buf`, returning the number of bytes read.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Opens the I2C device node at `path` and binds the SGP30 address.
///
/// The device is closed when the returned handle is dropped.
pub fn open<P: AsRef<Path>>(path: P) -> Result<LinuxI2CDevice, Sgp30Error> {
    let path = path.as_ref();
    let device = LinuxI2CDevice::new(path, SGP30_ADDRESS).map_err(io::Error::from)?;
    info!(
        "Opened {} for SGP30 at address {:#04x}",
        path.display(),
        SGP30_ADDRESS
    );
    Ok(device)
}

/// The i2c-dev character device completes a transfer in full or fails,
/// so a successful call always moved the whole buffer.
impl Transport for LinuxI2CDevice {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        I2CDevice::write(self, bytes).map_err(io::Error::from)?;
        Ok(bytes.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        I2CDevice::read(self, buf).map_err(io::Error::from)?;
        Ok(buf.len())
    }
}
