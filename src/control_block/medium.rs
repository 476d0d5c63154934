// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Medium handling: START STOP UNIT (0x1B), PREVENT ALLOW MEDIUM REMOVAL
//! (0x1E), LOAD/UNLOAD MEDIUM (0xA6), MECHANISM STATUS (0xBD).

use crate::{
    control_block::{
        CDB_MAX_LEN, CdbEncoder, DataDirection, TransferLength, check_max, check_one_of, opcode,
    },
    error::EngineResult,
    utils::{field, flag, put_u16},
};

/// START STOP UNIT power conditions.
pub mod power_condition {
    pub const NO_CHANGE: u8 = 0x00;
    pub const IDLE: u8 = 0x02;
    pub const STANDBY: u8 = 0x03;
    pub const SLEEP: u8 = 0x05;
}

/// START STOP UNIT, 6 bytes:
///   [1] IMMED(0)
///   [3] FORMAT-LAYER NUMBER(1..0)
///   [4] POWER CONDITION(7..4) | FL(2) | LOEJ(1) | START(0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StartStopUnit {
    pub immed: bool,
    pub format_layer_number: u8,
    pub power_condition: u8,
    pub format_layer: bool,
    pub load_eject: bool,
    pub start: bool,
}

impl StartStopUnit {
    pub fn eject() -> Self {
        Self {
            load_eject: true,
            ..Default::default()
        }
    }

    pub fn load() -> Self {
        Self {
            load_eject: true,
            start: true,
            ..Default::default()
        }
    }
}

impl CdbEncoder for StartStopUnit {
    fn opcode(&self) -> u8 {
        opcode::START_STOP_UNIT
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        use power_condition::*;
        check_one_of(
            "power condition",
            self.power_condition,
            &[NO_CHANGE, IDLE, STANDBY, SLEEP],
        )?;
        check_max("format-layer number", self.format_layer_number.into(), 0x03)?;
        cdb[0] = opcode::START_STOP_UNIT;
        cdb[1] = flag(self.immed, 0);
        cdb[3] = field(self.format_layer_number, 0, 0x03);
        cdb[4] = field(self.power_condition, 4, 0x0F)
            | flag(self.format_layer, 2)
            | flag(self.load_eject, 1)
            | flag(self.start, 0);
        Ok(6)
    }
}

/// PREVENT ALLOW MEDIUM REMOVAL, 6 bytes:
///   [4] PERSISTENT(1) | PREVENT(0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreventAllowRemoval {
    pub persistent: bool,
    pub prevent: bool,
}

impl CdbEncoder for PreventAllowRemoval {
    fn opcode(&self) -> u8 {
        opcode::PREVENT_ALLOW_MEDIUM_REMOVAL
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        cdb[0] = opcode::PREVENT_ALLOW_MEDIUM_REMOVAL;
        cdb[4] = flag(self.persistent, 1) | flag(self.prevent, 0);
        Ok(6)
    }
}

/// LOAD/UNLOAD MEDIUM, 12 bytes:
///   [1] IMMED(0)
///   [4] LOUNLO(1) | START(0)
///   [8] SLOT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadUnloadMedium {
    pub immed: bool,
    pub load_unload: bool,
    pub start: bool,
    pub slot: u8,
}

impl CdbEncoder for LoadUnloadMedium {
    fn opcode(&self) -> u8 {
        opcode::LOAD_UNLOAD_MEDIUM
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        cdb[0] = opcode::LOAD_UNLOAD_MEDIUM;
        cdb[1] = flag(self.immed, 0);
        cdb[4] = flag(self.load_unload, 1) | flag(self.start, 0);
        cdb[8] = self.slot;
        Ok(12)
    }
}

/// Mechanism status header length; the slot table follows it.
pub const MECHANISM_STATUS_HEADER_LEN: u16 = 8;

/// MECHANISM STATUS, 12 bytes:
///   [8..10] ALLOCATION LENGTH
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MechanismStatus {
    pub allocation_length: u16,
}

impl Default for MechanismStatus {
    fn default() -> Self {
        Self {
            allocation_length: MECHANISM_STATUS_HEADER_LEN,
        }
    }
}

impl CdbEncoder for MechanismStatus {
    fn opcode(&self) -> u8 {
        opcode::MECHANISM_STATUS
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        cdb[0] = opcode::MECHANISM_STATUS;
        put_u16(cdb, 8, self.allocation_length);
        Ok(12)
    }

    fn direction(&self) -> DataDirection {
        DataDirection::In
    }

    fn transfer_length(&self) -> TransferLength {
        TransferLength::Bytes(self.allocation_length as usize)
    }
}
