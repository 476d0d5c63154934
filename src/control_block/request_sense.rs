// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! REQUEST SENSE (6).
//!
//! CDB layout (SPC):
//!   [0] = 0x03 (REQUEST SENSE)
//!   [1] = DESC (bit 0), other bits reserved=0
//!   [4] = ALLOCATION LENGTH (number of bytes to return)
//!
//! `desc=false` requests fixed sense format; `desc=true` requests
//! descriptor format. The drive may still pick the format itself.

use crate::{
    control_block::{CDB_MAX_LEN, CdbEncoder, DataDirection, TransferLength, opcode},
    error::EngineResult,
    utils::flag,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestSense {
    pub desc: bool,
    pub allocation_length: u8,
}

impl RequestSense {
    pub fn fixed(allocation_length: u8) -> Self {
        Self {
            desc: false,
            allocation_length,
        }
    }
}

impl CdbEncoder for RequestSense {
    fn opcode(&self) -> u8 {
        opcode::REQUEST_SENSE
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        cdb[0] = opcode::REQUEST_SENSE;
        cdb[1] = flag(self.desc, 0);
        cdb[4] = self.allocation_length;
        Ok(6)
    }

    fn direction(&self) -> DataDirection {
        DataDirection::In
    }

    fn transfer_length(&self) -> TransferLength {
        TransferLength::Bytes(self.allocation_length as usize)
    }
}
