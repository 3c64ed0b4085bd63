// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::error::Error;
use std::fmt;
use std::io;

///
///SGP30 error enum. Transport wraps the Io error
///of any failed or short bus transfer. Checksum when
///a received word does not match its crc 8 byte.
///Invalid for calls the driver refuses to send and
///Functional when the chip answers the self test
///with a failure pattern.
///
#[derive(Debug)]
pub enum Sgp30Error {
    /// Opening, writing to or reading from the bus failed, or moved fewer bytes than requested
    Transport(io::Error),
    /// The checksum of a received word does not correspond to the calculated checksum
    Checksum {
        /// Position of the word in the response, starting at 0
        word: usize,
        /// Checksum calculated over the received data bytes
        expected: u8,
        /// Checksum byte sent by the chip
        received: u8,
    },
    /// Malformed call, nothing was sent to the device
    Invalid(&'static str),
    /// The self test completed on the bus but the chip reported this pattern instead of 0xD400
    Functional(u16),
}

impl Sgp30Error {
    /// Transport error for a write that moved fewer bytes than requested
    pub(crate) fn short_write(done: usize, requested: usize) -> Self {
        Sgp30Error::Transport(io::Error::new(
            io::ErrorKind::WriteZero,
            format!("short write: {} of {} bytes", done, requested),
        ))
    }

    /// Transport error for a read that returned fewer bytes than requested
    pub(crate) fn short_read(done: usize, requested: usize) -> Self {
        Sgp30Error::Transport(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("short read: {} of {} bytes", done, requested),
        ))
    }
}

///Implementation for Io error to Sgp30Error
impl From<io::Error> for Sgp30Error {
    fn from(e: io::Error) -> Self {
        Sgp30Error::Transport(e)
    }
}

///Implementation of display for Sgp30Error
impl fmt::Display for Sgp30Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Sgp30Error::Transport(ref e) => write!(f, "Transport error: {}", e),
            Sgp30Error::Checksum {
                word,
                expected,
                received,
            } => write!(
                f,
                "Checksum Error found in word {}: expected {:#04x}, received {:#04x}",
                word, expected, received
            ),
            Sgp30Error::Invalid(reason) => write!(f, "Invalid call: {}", reason),
            Sgp30Error::Functional(pattern) => {
                write!(f, "Self test failed with pattern {:#06x}", pattern)
            }
        }
    }
}

///Implementation for Error to Sgp30Error
impl Error for Sgp30Error {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            Sgp30Error::Transport(ref e) => Some(e),
            _ => None,
        }
    }
}
