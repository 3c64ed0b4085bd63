// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Command table and the write, wait, read exchange shared by every
//! SGP30 operation.
//!
//! Every data word travels as `[msb, lsb, crc8(msb, lsb)]`.

use crate::crc;
use crate::error::Sgp30Error;
use crate::transport::Transport;
use log::{debug, error, warn};
use std::{thread, time};

/// Bytes per word on the wire, two data bytes and the checksum
pub const WORD_LEN: usize = 3;

const OPCODE_LEN: usize = 2;
const MAX_PAYLOAD_WORDS: usize = 2;
const MAX_RESPONSE_WORDS: usize = 3;
const MAX_REQUEST_LEN: usize = OPCODE_LEN + MAX_PAYLOAD_WORDS * WORD_LEN;

/// Operations understood by the chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Starts the air quality algorithm
    InitAirQuality,
    /// Reads eCO2 and TVOC
    MeasureAirQuality,
    /// Reads the H2 and ethanol raw signals
    MeasureRawSignals,
    /// Reads the eCO2 and TVOC baselines
    GetBaseline,
    /// Restores previously read baselines
    SetBaseline,
    /// Sets absolute humidity for compensation
    SetHumidity,
    /// On chip self test
    MeasureTest,
    GetFeatureSetVersion,
    GetSerialId,
}

impl Command {
    /// Two byte opcode sent first in every request
    pub const fn opcode(self) -> [u8; 2] {
        match self {
            Command::InitAirQuality => [0x20, 0x03],
            Command::MeasureAirQuality => [0x20, 0x08],
            Command::MeasureRawSignals => [0x20, 0x50],
            Command::GetBaseline => [0x20, 0x15],
            Command::SetBaseline => [0x20, 0x1E],
            Command::SetHumidity => [0x20, 0x61],
            Command::MeasureTest => [0x20, 0x32],
            Command::GetFeatureSetVersion => [0x20, 0x2F],
            Command::GetSerialId => [0x36, 0x82],
        }
    }

    /// Time the chip needs after the write before the response can be read,
    /// or before it accepts the next command for write only operations.
    pub const fn settle_time(self) -> time::Duration {
        let millis = match self {
            Command::InitAirQuality => 10,
            Command::MeasureAirQuality => 12,
            Command::MeasureRawSignals => 25,
            Command::GetBaseline => 10,
            Command::SetBaseline => 10,
            Command::SetHumidity => 10,
            Command::MeasureTest => 220,
            Command::GetFeatureSetVersion => 3,
            Command::GetSerialId => 1,
        };
        time::Duration::from_millis(millis)
    }

    /// Number of data words sent after the opcode
    pub const fn payload_words(self) -> usize {
        match self {
            Command::SetBaseline => 2,
            Command::SetHumidity => 1,
            _ => 0,
        }
    }

    /// Number of words the chip answers with
    pub const fn response_words(self) -> usize {
        match self {
            Command::MeasureAirQuality | Command::MeasureRawSignals | Command::GetBaseline => 2,
            Command::MeasureTest | Command::GetFeatureSetVersion => 1,
            Command::GetSerialId => 3,
            Command::InitAirQuality | Command::SetBaseline | Command::SetHumidity => 0,
        }
    }
}

/// Encodes a value as it goes on the wire, big endian followed by its checksum
pub fn encode_word(value: u16) -> [u8; WORD_LEN] {
    let [msb, lsb] = value.to_be_bytes();
    [msb, lsb, crc::generate(&[msb, lsb])]
}

/// Checks the checksum of one received word and returns its value.
///
/// `index` is the position of the word inside the response, used for the error.
pub fn decode_word(bytes: &[u8; WORD_LEN], index: usize) -> Result<u16, Sgp30Error> {
    let data = [bytes[0], bytes[1]];
    let expected = crc::generate(&data);
    if expected != bytes[2] {
        warn!(
            "Checksum mismatch in word {}: {:02X?}, expected crc {:#04x}",
            index, bytes, expected
        );
        return Err(Sgp30Error::Checksum {
            word: index,
            expected,
            received: bytes[2],
        });
    }
    Ok(u16::from_be_bytes(data))
}

/// Runs one command: writes the opcode and `payload`, sleeps for the
/// command's settle time, then reads and validates `N` words.
///
/// Every word must pass its checksum before anything is returned; a single
/// bad word fails the whole call.
pub fn execute<T: Transport, const N: usize>(
    transport: &mut T,
    command: Command,
    payload: &[u16],
) -> Result<[u16; N], Sgp30Error> {
    if payload.len() != command.payload_words() {
        return Err(Sgp30Error::Invalid("payload length does not match command"));
    }
    if N != command.response_words() {
        return Err(Sgp30Error::Invalid("response length does not match command"));
    }

    let mut request = [0u8; MAX_REQUEST_LEN];
    request[..OPCODE_LEN].copy_from_slice(&command.opcode());
    let mut len = OPCODE_LEN;
    for value in payload {
        request[len..len + WORD_LEN].copy_from_slice(&encode_word(*value));
        len += WORD_LEN;
    }
    let request = &request[..len];

    debug!("{:?} write {:02X?}", command, request);
    let written = transport.write(request).map_err(|e| {
        error!("{:?}: write failed: {}", command, e);
        Sgp30Error::Transport(e)
    })?;
    if written != request.len() {
        error!("{:?}: wrote {} of {} bytes", command, written, request.len());
        return Err(Sgp30Error::short_write(written, request.len()));
    }

    thread::sleep(command.settle_time());

    let mut words = [0u16; N];
    if N == 0 {
        return Ok(words);
    }

    let mut response = [0u8; MAX_RESPONSE_WORDS * WORD_LEN];
    let response = &mut response[..N * WORD_LEN];
    let read = transport.read(response).map_err(|e| {
        error!("{:?}: read failed: {}", command, e);
        Sgp30Error::Transport(e)
    })?;
    if read != response.len() {
        error!("{:?}: read {} of {} bytes", command, read, response.len());
        return Err(Sgp30Error::short_read(read, response.len()));
    }
    debug!("{:?} read {:02X?}", command, response);

    for (index, chunk) in response.chunks_exact(WORD_LEN).enumerate() {
        let bytes = [chunk[0], chunk[1], chunk[2]];
        words[index] = decode_word(&bytes, index)?;
    }
    Ok(words)
}
