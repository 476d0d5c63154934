// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use zerocopy::{
    FromBytes, Immutable, KnownLayout,
    byteorder::{BigEndian, U32},
};

use crate::{
    control_block::{CDB_MAX_LEN, CdbEncoder, DataDirection, TransferLength, opcode},
    error::{EngineError, EngineResult},
};

pub const READ_CAPACITY_LEN: usize = 8;

/// **READ CAPACITY** (opcode 0x25), 10 bytes, no parameters.
///
/// MMC drives return the last recorded address of the medium and the
/// logical block length (normally 2048).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadCapacity;

impl CdbEncoder for ReadCapacity {
    fn opcode(&self) -> u8 {
        opcode::READ_CAPACITY
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        cdb[0] = opcode::READ_CAPACITY;
        Ok(10)
    }

    fn direction(&self) -> DataDirection {
        DataDirection::In
    }

    fn transfer_length(&self) -> TransferLength {
        TransferLength::Bytes(READ_CAPACITY_LEN)
    }
}

/// Raw 8-byte parameter data returned by READ CAPACITY.
#[repr(C)]
#[derive(FromBytes, KnownLayout, Immutable, Debug)]
pub struct CapacityRaw {
    /// Last logical block address (bytes 0-3)
    pub last_lba: U32<BigEndian>,
    /// Block length in bytes (bytes 4-7)
    pub block_len: U32<BigEndian>,
}

impl CapacityRaw {
    #[inline]
    pub fn total_bytes(&self) -> u64 {
        (self.last_lba.get() as u64 + 1) * self.block_len.get() as u64
    }
}

/// Parse READ CAPACITY parameter data (needs ≥ 8 bytes).
#[inline]
pub fn parse_read_capacity_zerocopy(buf: &[u8]) -> EngineResult<&CapacityRaw> {
    let (raw, _rest) = CapacityRaw::ref_from_prefix(buf).map_err(|_| {
        EngineError::protocol(format!(
            "READ CAPACITY: need ≥ {READ_CAPACITY_LEN} bytes, got {}",
            buf.len()
        ))
    })?;
    Ok(raw)
}
