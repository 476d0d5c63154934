// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! GET EVENT STATUS NOTIFICATION (0x4A), 10 bytes:
//!   [0] 0x4A
//!   [1] POLLED(0)
//!   [4] NOTIFICATION CLASS REQUEST
//!   [7..9] ALLOCATION LENGTH (BE)

use bitflags::bitflags;

use crate::{
    control_block::{CDB_MAX_LEN, CdbEncoder, DataDirection, TransferLength, opcode},
    error::EngineResult,
    utils::{flag, put_u16},
};

bitflags! {
    /// NOTIFICATION CLASS REQUEST bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventClass: u8 {
        const OPERATIONAL_CHANGE = 0x02;
        const POWER_MANAGEMENT   = 0x04;
        const EXTERNAL_REQUEST   = 0x08;
        const MEDIA              = 0x10;
        const MULTI_HOST         = 0x20;
        const DEVICE_BUSY        = 0x40;
    }
}

/// Header plus one descriptor of the largest class.
pub const DEFAULT_EVENT_ALLOCATION: u16 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetEventStatus {
    pub polled: bool,
    pub class_request: EventClass,
    pub allocation_length: u16,
}

impl GetEventStatus {
    pub fn polled(class_request: EventClass) -> Self {
        Self {
            polled: true,
            class_request,
            allocation_length: DEFAULT_EVENT_ALLOCATION,
        }
    }
}

impl CdbEncoder for GetEventStatus {
    fn opcode(&self) -> u8 {
        opcode::GET_EVENT_STATUS_NOTIFICATION
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        cdb[0] = opcode::GET_EVENT_STATUS_NOTIFICATION;
        cdb[1] = flag(self.polled, 0);
        cdb[4] = self.class_request.bits();
        put_u16(cdb, 7, self.allocation_length);
        Ok(10)
    }

    fn direction(&self) -> DataDirection {
        DataDirection::In
    }

    fn transfer_length(&self) -> TransferLength {
        TransferLength::Bytes(self.allocation_length as usize)
    }
}
