// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! SEND DISC STRUCTURE (0xBF) and SEND OPC INFORMATION (0x54).
//!
//! SEND DISC STRUCTURE, 12 bytes:
//!   [1] MEDIA TYPE(3..0)
//!   [7] FORMAT CODE
//!   [8..10] PARAMETER LIST LENGTH
//!
//! Parameter list: [0..2] STRUCTURE DATA LENGTH (payload + 2), [2..4]
//! reserved, then the structure payload.
//!
//! SEND OPC INFORMATION, 10 bytes:
//!   [1] DOOPC(0)
//!   [2] EXCLUDE1(1) | EXCLUDE0(0)
//!   [7..9] PARAMETER LIST LENGTH (8 bytes per OPC table entry)

use std::borrow::Cow;

use chrono::NaiveDateTime;

use crate::{
    control_block::{CDB_MAX_LEN, CdbEncoder, DataDirection, TransferLength, check_max, opcode},
    error::{EngineError, EngineResult},
    utils::{field, flag, put_u16},
};

pub const DISC_STRUCTURE_HEADER_LEN: usize = 4;

pub mod media_type {
    pub const DVD_HD_DVD: u8 = 0x00;
    pub const BD: u8 = 0x01;
}

pub mod structure_format {
    pub const DVD_USER_SPECIFIC_DATA: u8 = 0x04;
    pub const DVD_COPYRIGHT_MANAGEMENT: u8 = 0x05;
    pub const TIMESTAMP: u8 = 0x0F;
    pub const DVD_LAYER_BOUNDARY: u8 = 0x20;
    pub const DVD_SHIFTED_MIDDLE_AREA_START: u8 = 0x21;
    pub const DVD_JUMP_INTERVAL_SIZE: u8 = 0x22;
    pub const DVD_MANUAL_LAYER_JUMP: u8 = 0x23;
    pub const DVD_REMAPPING_ADDRESS: u8 = 0x24;
    pub const DISC_CONTROL_BLOCK: u8 = 0x30;
    pub const DVD_WRITE_PROTECTION: u8 = 0xC0;
}

const DVD_FORMATS: &[u8] = &[
    structure_format::DVD_USER_SPECIFIC_DATA,
    structure_format::DVD_COPYRIGHT_MANAGEMENT,
    structure_format::TIMESTAMP,
    structure_format::DVD_LAYER_BOUNDARY,
    structure_format::DVD_SHIFTED_MIDDLE_AREA_START,
    structure_format::DVD_JUMP_INTERVAL_SIZE,
    structure_format::DVD_MANUAL_LAYER_JUMP,
    structure_format::DVD_REMAPPING_ADDRESS,
    structure_format::DISC_CONTROL_BLOCK,
    structure_format::DVD_WRITE_PROTECTION,
];

const BD_FORMATS: &[u8] = &[
    structure_format::TIMESTAMP,
    structure_format::DISC_CONTROL_BLOCK,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendDiscStructure {
    pub media_type: u8,
    pub format: u8,
    /// Structure payload without the 4-byte header.
    pub payload: Vec<u8>,
}

impl SendDiscStructure {
    /// Time stamp structure: 4 reserved bytes then `YYYYMMDDhhmmss` in
    /// ASCII.
    pub fn timestamp(media_type: u8, at: NaiveDateTime) -> Self {
        let mut payload = vec![0u8; 4];
        payload.extend_from_slice(at.format("%Y%m%d%H%M%S").to_string().as_bytes());
        Self {
            media_type,
            format: structure_format::TIMESTAMP,
            payload,
        }
    }

    /// DVD write protection: PWP in bit 0 of the first byte.
    pub fn write_protection(persistent: bool) -> Self {
        Self {
            media_type: media_type::DVD_HD_DVD,
            format: structure_format::DVD_WRITE_PROTECTION,
            payload: vec![flag(persistent, 0), 0, 0, 0],
        }
    }

    /// DVD copyright management: CPM(7) | CGMS(5..4) | ADP_TY(3..0).
    pub fn copyright_management(cpm: bool, cgms: u8, adp_ty: u8) -> Self {
        Self {
            media_type: media_type::DVD_HD_DVD,
            format: structure_format::DVD_COPYRIGHT_MANAGEMENT,
            payload: vec![
                flag(cpm, 7) | field(cgms, 4, 0x03) | field(adp_ty, 0, 0x0F),
                0,
                0,
                0,
            ],
        }
    }

    fn parameter_list_len(&self) -> usize {
        DISC_STRUCTURE_HEADER_LEN + self.payload.len()
    }
}

impl CdbEncoder for SendDiscStructure {
    fn opcode(&self) -> u8 {
        opcode::SEND_DISC_STRUCTURE
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        let allowed = match self.media_type {
            media_type::DVD_HD_DVD => DVD_FORMATS,
            media_type::BD => BD_FORMATS,
            other => {
                return Err(EngineError::invalid(format!("invalid media type: {other}")));
            },
        };
        if !allowed.contains(&self.format) {
            return Err(EngineError::invalid(format!(
                "format {:#04x} is not valid for media type {}",
                self.format, self.media_type
            )));
        }
        let len = self.parameter_list_len();
        check_max("parameter list length", len as u32, u16::MAX.into())?;

        cdb[0] = opcode::SEND_DISC_STRUCTURE;
        cdb[1] = field(self.media_type, 0, 0x0F);
        cdb[7] = self.format;
        put_u16(cdb, 8, len as u16);
        Ok(12)
    }

    fn direction(&self) -> DataDirection {
        DataDirection::Out
    }

    fn transfer_length(&self) -> TransferLength {
        TransferLength::Bytes(self.parameter_list_len())
    }

    fn parameter_list(&self) -> EngineResult<Cow<'_, [u8]>> {
        let mut list = vec![0u8; DISC_STRUCTURE_HEADER_LEN];
        put_u16(&mut list, 0, (self.payload.len() + 2) as u16);
        list.extend_from_slice(&self.payload);
        Ok(Cow::Owned(list))
    }
}

pub const OPC_ENTRY_LEN: usize = 8;

/// One OPC table entry: speed in kB/s and six vendor values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcEntry {
    pub speed: u16,
    pub values: [u8; 6],
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SendOpcInformation {
    pub do_opc: bool,
    pub exclude0: bool,
    pub exclude1: bool,
    pub entries: Vec<OpcEntry>,
}

impl SendOpcInformation {
    fn parameter_list_len(&self) -> usize {
        self.entries.len() * OPC_ENTRY_LEN
    }
}

impl CdbEncoder for SendOpcInformation {
    fn opcode(&self) -> u8 {
        opcode::SEND_OPC_INFORMATION
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        let len = self.parameter_list_len();
        check_max("parameter list length", len as u32, u16::MAX.into())?;
        cdb[0] = opcode::SEND_OPC_INFORMATION;
        cdb[1] = flag(self.do_opc, 0);
        cdb[2] = flag(self.exclude1, 1) | flag(self.exclude0, 0);
        put_u16(cdb, 7, len as u16);
        Ok(10)
    }

    fn direction(&self) -> DataDirection {
        if self.entries.is_empty() {
            DataDirection::None
        } else {
            DataDirection::Out
        }
    }

    fn transfer_length(&self) -> TransferLength {
        TransferLength::Bytes(self.parameter_list_len())
    }

    fn parameter_list(&self) -> EngineResult<Cow<'_, [u8]>> {
        let mut list = Vec::with_capacity(self.parameter_list_len());
        for e in &self.entries {
            list.extend_from_slice(&e.speed.to_be_bytes());
            list.extend_from_slice(&e.values);
        }
        Ok(Cow::Owned(list))
    }
}
