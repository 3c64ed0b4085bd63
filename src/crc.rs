// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

//! CRC-8 checksum protecting every data word exchanged with the chip.
//!
//! Polynomial 0x31 (x^8 + x^5 + x^4 + 1), initial value 0xFF, no final XOR.
//! More info regarding the [algorithm](https://en.wikipedia.org/wiki/Computation_of_cyclic_redundancy_checks)

/// Generator polynomial
pub const CRC8_POLYNOMIAL: u8 = 0x31;
/// Initial remainder
pub const CRC8_INIT: u8 = 0xFF;

/// Computes the checksum of a 2 byte data word, MSB first.
///
pub fn generate(data: &[u8; 2]) -> u8 {
    let mut rem = CRC8_INIT;
    for byte in data {
        rem ^= byte;
        for _ in 0..8 {
            if (rem & 0x80) != 0 {
                rem = (rem << 1) ^ CRC8_POLYNOMIAL;
            } else {
                rem <<= 1;
            }
        }
    }
    rem
}

/// Returns true when `expected` is the checksum of `data`.
pub fn verify(data: &[u8; 2], expected: u8) -> bool {
    generate(data) == expected
}
