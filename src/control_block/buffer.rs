// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! READ BUFFER (0x3C), WRITE BUFFER (0x3B), READ BUFFER CAPACITY (0x5C).
//!
//! READ/WRITE BUFFER, 10 bytes:
//!   [1] MODE(4..0)
//!   [2] BUFFER ID
//!   [3..6] BUFFER OFFSET (24-bit)
//!   [6..9] ALLOCATION / PARAMETER LIST LENGTH (24-bit)

use std::borrow::Cow;

use crate::{
    control_block::{
        CDB_MAX_LEN, CdbEncoder, DataDirection, TransferLength, check_max, check_one_of, opcode,
    },
    error::EngineResult,
    utils::{U24_MAX, field, flag, put_u16, put_u24},
};

pub mod buffer_mode {
    pub const COMBINED: u8 = 0x00;
    pub const VENDOR: u8 = 0x01;
    pub const DATA: u8 = 0x02;
    pub const DESCRIPTOR: u8 = 0x03;
    pub const MICROCODE: u8 = 0x04;
    pub const MICROCODE_SAVE: u8 = 0x05;
    pub const MICROCODE_OFFSETS: u8 = 0x06;
    pub const MICROCODE_OFFSETS_SAVE: u8 = 0x07;
    pub const ECHO: u8 = 0x0A;
    pub const ECHO_DESCRIPTOR: u8 = 0x0B;
    pub const ENABLE_EXPANDER: u8 = 0x1A;
    pub const DISABLE_EXPANDER: u8 = 0x1B;
    pub const APPLICATION_LOG: u8 = 0x1C;
}

const READ_MODES: &[u8] = &[
    buffer_mode::COMBINED,
    buffer_mode::VENDOR,
    buffer_mode::DATA,
    buffer_mode::DESCRIPTOR,
    buffer_mode::ECHO,
    buffer_mode::ECHO_DESCRIPTOR,
    buffer_mode::ENABLE_EXPANDER,
];

const WRITE_MODES: &[u8] = &[
    buffer_mode::COMBINED,
    buffer_mode::VENDOR,
    buffer_mode::DATA,
    buffer_mode::MICROCODE,
    buffer_mode::MICROCODE_SAVE,
    buffer_mode::MICROCODE_OFFSETS,
    buffer_mode::MICROCODE_OFFSETS_SAVE,
    buffer_mode::ECHO,
    buffer_mode::ENABLE_EXPANDER,
    buffer_mode::DISABLE_EXPANDER,
    buffer_mode::APPLICATION_LOG,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadBuffer {
    pub mode: u8,
    pub buffer_id: u8,
    pub buffer_offset: u32,
    pub allocation_length: u32,
}

impl CdbEncoder for ReadBuffer {
    fn opcode(&self) -> u8 {
        opcode::READ_BUFFER
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        check_one_of("read buffer mode", self.mode, READ_MODES)?;
        check_max("buffer offset", self.buffer_offset, U24_MAX)?;
        check_max("allocation length", self.allocation_length, U24_MAX)?;
        cdb[0] = opcode::READ_BUFFER;
        cdb[1] = field(self.mode, 0, 0x1F);
        cdb[2] = self.buffer_id;
        put_u24(cdb, 3, self.buffer_offset);
        put_u24(cdb, 6, self.allocation_length);
        Ok(10)
    }

    fn direction(&self) -> DataDirection {
        DataDirection::In
    }

    fn transfer_length(&self) -> TransferLength {
        TransferLength::Bytes(self.allocation_length as usize)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteBuffer {
    pub mode: u8,
    pub buffer_id: u8,
    pub buffer_offset: u32,
    pub data: Vec<u8>,
}

impl CdbEncoder for WriteBuffer {
    fn opcode(&self) -> u8 {
        opcode::WRITE_BUFFER
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        check_one_of("write buffer mode", self.mode, WRITE_MODES)?;
        check_max("buffer offset", self.buffer_offset, U24_MAX)?;
        let len = u32::try_from(self.data.len()).unwrap_or(u32::MAX);
        check_max("parameter list length", len, U24_MAX)?;
        cdb[0] = opcode::WRITE_BUFFER;
        cdb[1] = field(self.mode, 0, 0x1F);
        cdb[2] = self.buffer_id;
        put_u24(cdb, 3, self.buffer_offset);
        put_u24(cdb, 6, len);
        Ok(10)
    }

    fn direction(&self) -> DataDirection {
        if self.data.is_empty() {
            DataDirection::None
        } else {
            DataDirection::Out
        }
    }

    fn transfer_length(&self) -> TransferLength {
        TransferLength::Bytes(self.data.len())
    }

    fn parameter_list(&self) -> EngineResult<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(&self.data))
    }
}

pub const BUFFER_CAPACITY_LEN: u16 = 12;

/// READ BUFFER CAPACITY, 10 bytes:
///   [1] BLOCK(0)
///   [7..9] ALLOCATION LENGTH
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadBufferCapacity {
    pub block: bool,
}

impl CdbEncoder for ReadBufferCapacity {
    fn opcode(&self) -> u8 {
        opcode::READ_BUFFER_CAPACITY
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        cdb[0] = opcode::READ_BUFFER_CAPACITY;
        cdb[1] = flag(self.block, 0);
        put_u16(cdb, 7, BUFFER_CAPACITY_LEN);
        Ok(10)
    }

    fn direction(&self) -> DataDirection {
        DataDirection::In
    }

    fn transfer_length(&self) -> TransferLength {
        TransferLength::Bytes(BUFFER_CAPACITY_LEN as usize)
    }
}
