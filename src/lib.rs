// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

//! SGP30 driver implementing the SGP30 I2C gas sensor operations on Linux
//!
//! Operations taken from the [datasheet](https://sensirion.com/media/documents/984E0DD5/61644B8B/Sensirion_Gas_Sensors_Datasheet_SGP30.pdf)
//!
//! Every exchange writes a two byte command, waits for the settle time the
//! chip needs and reads back words of two data bytes plus a CRC 8 byte. A
//! word whose checksum does not match fails the whole call.
//!
//! ## Basic Example
//!
//! Obtaining eCO2 and TVOC once per second
//!
//!
//!```no_run
//!use sgp30_i2c::sgp30::Sgp30;
//!use std::thread;
//!use std::time::Duration;
//!
//!fn main() {
//!    // Open the I2C device
//!    let mut sgp = Sgp30::new().unwrap();
//!    sgp.init().unwrap();
//!
//!    loop {
//!        match sgp.measure_air_quality() {
//!            Ok(m) => println!("eCO2: {} ppm TVOC: {} ppb", m.co2eq_ppm, m.tvoc_ppb),
//!            Err(e) => println!("Error obtaining measurements. More details: {}", e),
//!        }
//!        thread::sleep(Duration::from_secs(1));
//!    }
//!}
//!```
//!

/// CRC 8 used on every data word
pub mod crc;
/// Command table and the write, wait, read exchange
pub mod command;
mod error;
/// Driver struct implementing SGP30 device related operations
pub mod sgp30;
/// Bus access and the Linux i2c-dev implementation
pub mod transport;

pub use error::Sgp30Error;
pub use sgp30::{AirQuality, Baseline, FeatureSet, RawSignals, Sgp30};
pub use transport::{Transport, DEFAULT_I2C_BUS, SGP30_ADDRESS};
