// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

use crate::command::{execute, Command};
use crate::error::Sgp30Error;
use crate::transport::{self, Transport, DEFAULT_I2C_BUS};
use i2cdev::linux::LinuxI2CDevice;
use log::{info, warn};
use std::path::Path;

/// Word returned by a passing self test
pub const SELF_TEST_PASSED: u16 = 0xD400;

/// eCO2 and TVOC reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AirQuality {
    /// CO2 equivalent in ppm
    pub co2eq_ppm: u16,
    /// Total volatile organic compounds in ppb
    pub tvoc_ppb: u16,
}

/// Raw sensor signals, in chip counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSignals {
    pub h2: u16,
    pub ethanol: u16,
}

/// Baseline of the eCO2 and TVOC algorithms.
///
/// Read it regularly and restore it with [`Sgp30::set_baseline`] after a
/// power cycle. [`Baseline::to_u32`] gives an opaque value suitable for storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Baseline {
    pub co2eq: u16,
    pub tvoc: u16,
}

impl Baseline {
    /// Packs the baseline, eCO2 in the high half
    pub fn to_u32(self) -> u32 {
        (u32::from(self.co2eq) << 16) | u32::from(self.tvoc)
    }

    pub fn from_u32(raw: u32) -> Baseline {
        Baseline {
            co2eq: (raw >> 16) as u16,
            tvoc: raw as u16,
        }
    }
}

/// Decoded feature set version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSet(pub u16);

impl FeatureSet {
    /// Product type, 0 for the SGP30
    pub fn product_type(self) -> u8 {
        (self.0 >> 12) as u8
    }

    pub fn product_version(self) -> u8 {
        self.0 as u8
    }
}

/// Packs an absolute humidity in g/m³ into the 8.8 fixed point word the chip expects.
///
/// The integer part goes to the high byte, the fractional part times 256 to
/// the low byte. Both are truncated, never rounded: `25.5` packs to `0x1980`.
/// Values outside `0.0..256.0` are rejected.
///
pub fn encode_humidity(grams_per_m3: f64) -> Result<u16, Sgp30Error> {
    if !(0.0..256.0).contains(&grams_per_m3) {
        return Err(Sgp30Error::Invalid("humidity must be within 0 and 256 g/m3"));
    }
    let integer = grams_per_m3.trunc();
    let fractional = ((grams_per_m3 - integer) * 256.0).trunc();
    Ok(((integer as u16) << 8) | fractional as u16)
}

/// SGP30 Struct, owns the bus transport
/// and has implemented related SGP30 operations
///
/// Every operation blocks the calling thread for the settle time the chip
/// needs and takes `&mut self`, so only one command is ever in flight.
/// A bus that hangs in the middle of a transfer blocks the caller
/// indefinitely; there is no timeout.
///
/// The transport is released by [`Sgp30::deinit`] or when the driver is
/// dropped, whichever comes first.
///
pub struct Sgp30<T: Transport> {
    transport: Option<T>,
}

/// Constructors for the Linux i2c-dev bus
///
impl Sgp30<LinuxI2CDevice> {
    /// Create a new SGP30 Struct
    ///
    /// Tries to open the device on the standard bus /dev/i2c-1, address 0x58.
    /// If fails, returns a transport error.
    ///
    pub fn new() -> Result<Sgp30<LinuxI2CDevice>, Sgp30Error> {
        Sgp30::open(DEFAULT_I2C_BUS)
    }

    /// Same as [`Sgp30::new`] for any i2c-dev device node.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Sgp30<LinuxI2CDevice>, Sgp30Error> {
        Ok(Sgp30::with_transport(transport::open(path)?))
    }
}

/// Implementation of SGP30 related
/// operations
///
impl<T: Transport> Sgp30<T> {
    /// Wraps an already addressed transport. No bytes are sent.
    pub fn with_transport(transport: T) -> Sgp30<T> {
        Sgp30 {
            transport: Some(transport),
        }
    }

    /// False once [`Sgp30::deinit`] has released the transport.
    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// Releases the transport. Any later operation fails with an invalid call
    /// error. Calling it twice is harmless.
    ///
    pub fn deinit(&mut self) {
        if self.transport.take().is_some() {
            info!("SGP30 released");
        }
    }

    fn run<const N: usize>(
        &mut self,
        command: Command,
        payload: &[u16],
    ) -> Result<[u16; N], Sgp30Error> {
        let transport = self
            .transport
            .as_mut()
            .ok_or(Sgp30Error::Invalid("sensor has been deinitialized"))?;
        execute(transport, command, payload)
    }

    /// Starts the air quality algorithm.
    ///
    /// For the first 15 seconds after init the chip returns fixed values
    /// (400 ppm, 0 ppb). The baseline is reset, restore it afterwards with
    /// [`Sgp30::set_baseline`] if one was saved.
    ///
    pub fn init(&mut self) -> Result<(), Sgp30Error> {
        let [] = self.run::<0>(Command::InitAirQuality, &[])?;
        info!("SGP30 air quality algorithm initialized");
        Ok(())
    }

    /// Get eCO2 (ppm) and TVOC (ppb).
    /// Call it once per second to keep the dynamic baseline compensation working.
    ///
    pub fn measure_air_quality(&mut self) -> Result<AirQuality, Sgp30Error> {
        let [co2eq_ppm, tvoc_ppb] = self.run(Command::MeasureAirQuality, &[])?;
        Ok(AirQuality {
            co2eq_ppm,
            tvoc_ppb,
        })
    }

    pub fn measure_raw_signals(&mut self) -> Result<RawSignals, Sgp30Error> {
        let [h2, ethanol] = self.run(Command::MeasureRawSignals, &[])?;
        Ok(RawSignals { h2, ethanol })
    }

    /// Reads the current baseline. A checksum mismatch fails the call like
    /// any other read.
    ///
    pub fn get_baseline(&mut self) -> Result<Baseline, Sgp30Error> {
        let [co2eq, tvoc] = self.run(Command::GetBaseline, &[])?;
        Ok(Baseline { co2eq, tvoc })
    }

    /// Restores a baseline read by [`Sgp30::get_baseline`].
    /// The chip expects the TVOC word first, the reverse of the read order.
    ///
    pub fn set_baseline(&mut self, baseline: &Baseline) -> Result<(), Sgp30Error> {
        let [] = self.run::<0>(Command::SetBaseline, &[baseline.tvoc, baseline.co2eq])?;
        Ok(())
    }

    /// Sets the absolute humidity in g/m³ used for compensation, 0 disables it.
    /// See [`encode_humidity`] for the packing.
    ///
    pub fn set_humidity(&mut self, grams_per_m3: f64) -> Result<(), Sgp30Error> {
        let word = encode_humidity(grams_per_m3)?;
        let [] = self.run::<0>(Command::SetHumidity, &[word])?;
        Ok(())
    }

    /// Runs the on chip self test.
    /// Returns false when the chip reports a failure pattern,
    /// errors are kept for transport and checksum problems.
    ///
    pub fn measure_test(&mut self) -> Result<bool, Sgp30Error> {
        let [pattern] = self.run(Command::MeasureTest, &[])?;
        if pattern != SELF_TEST_PASSED {
            warn!("SGP30 self test returned {:#06x}", pattern);
        }
        Ok(pattern == SELF_TEST_PASSED)
    }

    /// Same as [`Sgp30::measure_test`], a failure pattern becomes
    /// [`Sgp30Error::Functional`].
    pub fn self_test(&mut self) -> Result<(), Sgp30Error> {
        let [pattern] = self.run(Command::MeasureTest, &[])?;
        if pattern == SELF_TEST_PASSED {
            Ok(())
        } else {
            warn!("SGP30 self test returned {:#06x}", pattern);
            Err(Sgp30Error::Functional(pattern))
        }
    }

    /// Get the feature set version, decode it with [`FeatureSet`].
    pub fn get_feature_set_version(&mut self) -> Result<u16, Sgp30Error> {
        let [version] = self.run(Command::GetFeatureSetVersion, &[])?;
        Ok(version)
    }

    /// Get the 48 bit serial id, the first word is the most significant.
    ///
    pub fn get_serial_id(&mut self) -> Result<u64, Sgp30Error> {
        let words: [u16; 3] = self.run(Command::GetSerialId, &[])?;
        Ok(words
            .iter()
            .fold(0u64, |serial, word| (serial << 16) | u64::from(*word)))
    }
}
