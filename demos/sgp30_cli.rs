//! Polls an SGP30 once per second and prints its readings.
//!
//! ```bash
//! RUST_LOG=debug cargo run --example sgp30-cli -- /dev/i2c-1 60
//! ```
//!
//! The first argument is the bus device, the second the number of samples
//! (0 or missing runs forever). The bus is released when the driver is
//! dropped, on every exit path.

use anyhow::Context;
use sgp30_i2c::{FeatureSet, Sgp30, DEFAULT_I2C_BUS};
use std::env;
use std::thread;
use std::time::Duration;

/// Print the baseline every this many samples
const BASELINE_EVERY: u64 = 30;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let path = args.next().unwrap_or_else(|| DEFAULT_I2C_BUS.to_string());
    let samples: u64 = match args.next() {
        Some(n) => n.parse().context("sample count must be a number")?,
        None => 0,
    };

    let mut sgp = Sgp30::open(&path)
        .with_context(|| format!("could not open {}; are you running as root?", path))?;

    let serial = sgp.get_serial_id().context("reading serial id")?;
    println!("Serial: 0x{:012x}", serial);
    let version = sgp
        .get_feature_set_version()
        .context("reading feature set version")?;
    let feature_set = FeatureSet(version);
    println!(
        "Feature set version: 0x{:04x} (product type {}, version {})",
        version,
        feature_set.product_type(),
        feature_set.product_version()
    );

    sgp.init().context("initializing air quality")?;
    thread::sleep(Duration::from_secs(1));

    let mut count = 0u64;
    while samples == 0 || count < samples {
        count += 1;
        let air = sgp.measure_air_quality()?;
        println!("eCO2: {} ppm, TVOC: {} ppb", air.co2eq_ppm, air.tvoc_ppb);
        let raw = sgp.measure_raw_signals()?;
        println!("H2: {}, Ethanol: {}", raw.h2, raw.ethanol);

        if count % BASELINE_EVERY == 0 {
            let baseline = sgp.get_baseline()?;
            println!(
                "===BASELINE=== eCO2: {}, TVOC: {}",
                baseline.co2eq, baseline.tvoc
            );
        }
        thread::sleep(Duration::from_secs(1));
    }

    sgp.deinit();
    Ok(())
}
