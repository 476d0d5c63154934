// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! READ BUFFER data, shaped by the MODE the command was issued with.

use bytes::Bytes;

use crate::{
    control_block::{buffer::buffer_mode, opcode},
    error::{EngineError, EngineResult},
    response::ResponseHeader,
    utils::{get_u16, get_u24},
};

const BUFFER_DESCRIPTOR_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadBufferData {
    /// 4-byte header ([1..4] BUFFER CAPACITY) then buffer contents.
    Combined { capacity: u32, data: Bytes },
    Data(Bytes),
    /// [0] OFFSET BOUNDARY, [1..4] BUFFER CAPACITY.
    Descriptor { offset_boundary: u8, capacity: u32 },
    Echo(Bytes),
    /// [2..4] BUFFER CAPACITY (12..0).
    EchoDescriptor { capacity: u16 },
    /// Vendor and other modes.
    Raw(Bytes),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadBufferResponse {
    pub header: ResponseHeader,
    pub mode: u8,
    pub data: ReadBufferData,
}

impl ReadBufferResponse {
    pub fn parse(mode: u8, buf: &[u8]) -> EngineResult<Self> {
        let need_descriptor = || {
            if buf.len() < BUFFER_DESCRIPTOR_LEN {
                return Err(EngineError::protocol(format!(
                    "READ BUFFER mode {mode:#04x} needs {BUFFER_DESCRIPTOR_LEN} bytes, got {}",
                    buf.len()
                )));
            }
            Ok(())
        };

        let data = match mode {
            buffer_mode::COMBINED => {
                need_descriptor()?;
                ReadBufferData::Combined {
                    capacity: get_u24(buf, 1).unwrap_or(0),
                    data: Bytes::copy_from_slice(&buf[BUFFER_DESCRIPTOR_LEN..]),
                }
            },
            buffer_mode::DATA => ReadBufferData::Data(Bytes::copy_from_slice(buf)),
            buffer_mode::DESCRIPTOR => {
                need_descriptor()?;
                ReadBufferData::Descriptor {
                    offset_boundary: buf[0],
                    capacity: get_u24(buf, 1).unwrap_or(0),
                }
            },
            buffer_mode::ECHO => ReadBufferData::Echo(Bytes::copy_from_slice(buf)),
            buffer_mode::ECHO_DESCRIPTOR => {
                need_descriptor()?;
                ReadBufferData::EchoDescriptor {
                    capacity: get_u16(buf, 2).unwrap_or(0) & 0x1FFF,
                }
            },
            _ => ReadBufferData::Raw(Bytes::copy_from_slice(buf)),
        };

        Ok(Self {
            header: ResponseHeader::new(opcode::READ_BUFFER),
            mode,
            data,
        })
    }
}
