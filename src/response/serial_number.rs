// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::{
    control_block::{opcode, serial_number::MSN_HEADER_LEN},
    error::{EngineError, EngineResult},
    response::ResponseHeader,
    utils::{clamp_slice, get_u32},
};

/// READ MEDIA SERIAL NUMBER data: a 4-byte length then the serial number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSerialNumberResponse {
    pub header: ResponseHeader,
    pub serial_number: Vec<u8>,
}

impl MediaSerialNumberResponse {
    pub fn required_length(probe: &[u8]) -> EngineResult<u32> {
        let len = get_u32(probe, 0).ok_or_else(|| {
            EngineError::protocol(format!(
                "media serial number header needs {MSN_HEADER_LEN} bytes, got {}",
                probe.len()
            ))
        })?;
        len.checked_add(MSN_HEADER_LEN)
            .ok_or_else(|| EngineError::protocol("media serial number length overflows"))
    }

    pub fn parse(buf: &[u8]) -> EngineResult<Self> {
        let len = Self::required_length(buf)? as usize;
        if len > buf.len() {
            return Err(EngineError::protocol(format!(
                "media serial number declares {len} bytes, got {}",
                buf.len()
            )));
        }
        Ok(Self {
            header: ResponseHeader::new(opcode::READ_MEDIA_SERIAL_NUMBER),
            serial_number: clamp_slice(buf, MSN_HEADER_LEN as usize, len).to_vec(),
        })
    }

    /// Serial number as text when the medium uses printable ASCII.
    pub fn as_ascii(&self) -> Option<&str> {
        self.serial_number
            .iter()
            .all(|b| b.is_ascii_graphic() || *b == b' ')
            .then(|| std::str::from_utf8(&self.serial_number).ok())
            .flatten()
    }
}
