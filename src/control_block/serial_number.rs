// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! READ MEDIA SERIAL NUMBER: SERVICE ACTION IN(12) (0xAB) with service
//! action 0x01.
//!
//!   [1] SERVICE ACTION = 0x01
//!   [6..10] ALLOCATION LENGTH (BE)

use crate::{
    control_block::{CDB_MAX_LEN, CdbEncoder, DataDirection, TransferLength, opcode},
    error::EngineResult,
    utils::put_u32,
};

pub const READ_MSN_SERVICE_ACTION: u8 = 0x01;
/// Header holding the serial number length.
pub const MSN_HEADER_LEN: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadMediaSerialNumber {
    pub allocation_length: u32,
}

impl Default for ReadMediaSerialNumber {
    fn default() -> Self {
        Self {
            allocation_length: MSN_HEADER_LEN,
        }
    }
}

impl CdbEncoder for ReadMediaSerialNumber {
    fn opcode(&self) -> u8 {
        opcode::READ_MEDIA_SERIAL_NUMBER
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        cdb[0] = opcode::READ_MEDIA_SERIAL_NUMBER;
        cdb[1] = READ_MSN_SERVICE_ACTION;
        put_u32(cdb, 6, self.allocation_length);
        Ok(12)
    }

    fn direction(&self) -> DataDirection {
        DataDirection::In
    }

    fn transfer_length(&self) -> TransferLength {
        TransferLength::Bytes(self.allocation_length as usize)
    }
}
