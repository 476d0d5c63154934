// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! WRITE(10), WRITE(12), WRITE AND VERIFY(10), SYNCHRONIZE CACHE.
//!
//! Write commands carry their payload; it must be exactly the declared
//! number of blocks of `block_length` bytes.

use std::borrow::Cow;

use crate::{
    cfg::config::DEFAULT_BLOCK_LENGTH,
    control_block::{
        CDB_MAX_LEN, CdbEncoder, DataDirection, TransferLength, check_block_payload, opcode,
    },
    error::EngineResult,
    utils::{flag, put_u16, put_u32},
};

/// WRITE(10):
/// - byte 1      : FUA(3) | TSR(2)
/// - bytes 2..5  : LBA
/// - bytes 7..8  : TRANSFER LENGTH in blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Write10 {
    pub fua: bool,
    pub tsr: bool,
    pub lba: u32,
    pub blocks: u16,
    /// Bytes per block in `data`; not sent to the drive.
    pub block_length: u32,
    pub data: Vec<u8>,
}

impl Write10 {
    /// Plain write of `data` in blocks of the default length.
    pub fn new(lba: u32, blocks: u16, data: Vec<u8>) -> Self {
        Self {
            fua: false,
            tsr: false,
            lba,
            blocks,
            block_length: DEFAULT_BLOCK_LENGTH,
            data,
        }
    }
}

impl CdbEncoder for Write10 {
    fn opcode(&self) -> u8 {
        opcode::WRITE_10
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        check_block_payload(self.blocks.into(), self.block_length, self.data.len())?;
        cdb[0] = opcode::WRITE_10;
        cdb[1] = flag(self.fua, 3) | flag(self.tsr, 2);
        put_u32(cdb, 2, self.lba);
        put_u16(cdb, 7, self.blocks);
        Ok(10)
    }

    fn direction(&self) -> DataDirection {
        DataDirection::Out
    }

    fn transfer_length(&self) -> TransferLength {
        TransferLength::Bytes(self.data.len())
    }

    fn parameter_list(&self) -> EngineResult<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(&self.data))
    }
}

/// WRITE(12):
/// - byte 1      : FUA(3) | TSR(2)
/// - bytes 2..5  : LBA
/// - bytes 6..9  : TRANSFER LENGTH in blocks
/// - byte 10     : STREAMING(7)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Write12 {
    pub fua: bool,
    pub tsr: bool,
    pub lba: u32,
    pub blocks: u32,
    pub streaming: bool,
    pub block_length: u32,
    pub data: Vec<u8>,
}

impl CdbEncoder for Write12 {
    fn opcode(&self) -> u8 {
        opcode::WRITE_12
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        check_block_payload(self.blocks, self.block_length, self.data.len())?;
        cdb[0] = opcode::WRITE_12;
        cdb[1] = flag(self.fua, 3) | flag(self.tsr, 2);
        put_u32(cdb, 2, self.lba);
        put_u32(cdb, 6, self.blocks);
        cdb[10] = flag(self.streaming, 7);
        Ok(12)
    }

    fn direction(&self) -> DataDirection {
        DataDirection::Out
    }

    fn transfer_length(&self) -> TransferLength {
        TransferLength::Bytes(self.data.len())
    }

    fn parameter_list(&self) -> EngineResult<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(&self.data))
    }
}

/// WRITE AND VERIFY(10): LBA at 2..5, blocks at 7..8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteAndVerify10 {
    pub lba: u32,
    pub blocks: u16,
    pub block_length: u32,
    pub data: Vec<u8>,
}

impl CdbEncoder for WriteAndVerify10 {
    fn opcode(&self) -> u8 {
        opcode::WRITE_AND_VERIFY_10
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        check_block_payload(self.blocks.into(), self.block_length, self.data.len())?;
        cdb[0] = opcode::WRITE_AND_VERIFY_10;
        put_u32(cdb, 2, self.lba);
        put_u16(cdb, 7, self.blocks);
        Ok(10)
    }

    fn direction(&self) -> DataDirection {
        DataDirection::Out
    }

    fn transfer_length(&self) -> TransferLength {
        TransferLength::Bytes(self.data.len())
    }

    fn parameter_list(&self) -> EngineResult<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(&self.data))
    }
}

/// SYNCHRONIZE CACHE(10):
/// - byte 1      : IMMED(1)
/// - bytes 2..5  : LBA
/// - bytes 7..8  : NUMBER OF BLOCKS (0 = to the end of the medium)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SynchronizeCache {
    pub immed: bool,
    pub lba: u32,
    pub blocks: u16,
}

impl CdbEncoder for SynchronizeCache {
    fn opcode(&self) -> u8 {
        opcode::SYNCHRONIZE_CACHE
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        cdb[0] = opcode::SYNCHRONIZE_CACHE;
        cdb[1] = flag(self.immed, 1);
        put_u32(cdb, 2, self.lba);
        put_u16(cdb, 7, self.blocks);
        Ok(10)
    }
}
