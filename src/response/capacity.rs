// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::{
    control_block::{
        buffer::BUFFER_CAPACITY_LEN,
        opcode,
        read_capacity::{CapacityRaw, parse_read_capacity_zerocopy},
    },
    error::{EngineError, EngineResult},
    response::ResponseHeader,
    utils::{bit, get_u16, get_u32},
};

/// READ CAPACITY result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityResponse {
    pub header: ResponseHeader,
    pub last_lba: u32,
    pub block_length: u32,
}

impl CapacityResponse {
    pub fn parse(buf: &[u8]) -> EngineResult<Self> {
        let raw: &CapacityRaw = parse_read_capacity_zerocopy(buf)?;
        Ok(Self {
            header: ResponseHeader::new(opcode::READ_CAPACITY),
            last_lba: raw.last_lba.get(),
            block_length: raw.block_len.get(),
        })
    }

    pub fn total_bytes(&self) -> u64 {
        (u64::from(self.last_lba) + 1) * u64::from(self.block_length)
    }
}

/// READ BUFFER CAPACITY payload; the shape depends on the BLOCK bit the
/// drive echoes back in byte 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferCapacity {
    /// [4..8] LENGTH OF BUFFER, [8..12] BLANK LENGTH OF BUFFER.
    Bytes { buffer_length: u32, blank_length: u32 },
    /// [8..12] AVAILABLE LENGTH OF BUFFER in blocks.
    Blocks { available_blocks: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferCapacityResponse {
    pub header: ResponseHeader,
    pub data_length: u16,
    pub capacity: BufferCapacity,
}

impl BufferCapacityResponse {
    pub fn parse(buf: &[u8]) -> EngineResult<Self> {
        if buf.len() < BUFFER_CAPACITY_LEN as usize {
            return Err(EngineError::protocol(format!(
                "buffer capacity data needs {BUFFER_CAPACITY_LEN} bytes, got {}",
                buf.len()
            )));
        }
        let data_length = get_u16(buf, 0).unwrap_or(0);
        let word = |off| get_u32(buf, off).unwrap_or(0);
        let capacity = if bit(buf[3], 0) {
            BufferCapacity::Blocks {
                available_blocks: word(8),
            }
        } else {
            BufferCapacity::Bytes {
                buffer_length: word(4),
                blank_length: word(8),
            }
        };
        Ok(Self {
            header: ResponseHeader::new(opcode::READ_BUFFER_CAPACITY),
            data_length,
            capacity,
        })
    }
}
