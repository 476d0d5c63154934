// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! MECHANISM STATUS response.
//!
//! Header, 8 bytes:
//!   [0]    FAULT(7) | CHANGER STATE(6..5) | CURRENT SLOT low(4..0)
//!   [1]    MECHANISM STATE(7..5) | DOOR OPEN(4) | CURRENT SLOT high(2..0)
//!   [2..5] CURRENT LBA (24 bit)
//!   [5]    NUMBER OF SLOTS AVAILABLE
//!   [6..8] SLOT TABLE LENGTH
//! then 4-byte slot entries.

use crate::{
    control_block::{medium::MECHANISM_STATUS_HEADER_LEN, opcode},
    error::{EngineError, EngineResult},
    response::ResponseHeader,
    utils::{bit, bits, get_u16, get_u24},
};

const SLOT_ENTRY_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotEntry {
    pub disc_present: bool,
    pub change: bool,
    pub cwp_valid: bool,
    pub cwp: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MechanismStatusResponse {
    pub header: ResponseHeader,
    pub fault: bool,
    pub changer_state: u8,
    pub current_slot: u8,
    pub mechanism_state: u8,
    pub door_open: bool,
    pub current_lba: u32,
    pub available_slots: u8,
    pub slot_table_length: u16,
    pub slots: Vec<SlotEntry>,
}

impl MechanismStatusResponse {
    /// Bytes the drive has in total, read off the probe header.
    pub fn required_length(probe: &[u8]) -> EngineResult<u32> {
        let table = get_u16(probe, 6).ok_or_else(|| {
            EngineError::protocol(format!(
                "mechanism status header needs {MECHANISM_STATUS_HEADER_LEN} bytes, got {}",
                probe.len()
            ))
        })?;
        Ok(u32::from(MECHANISM_STATUS_HEADER_LEN) + u32::from(table))
    }

    pub fn parse(buf: &[u8]) -> EngineResult<Self> {
        let slot_table_length = get_u16(buf, 6).ok_or_else(|| {
            EngineError::protocol(format!(
                "mechanism status header needs {MECHANISM_STATUS_HEADER_LEN} bytes, got {}",
                buf.len()
            ))
        })?;
        let (b0, b1) = (buf[0], buf[1]);
        let start = MECHANISM_STATUS_HEADER_LEN as usize;
        let end = (start + slot_table_length as usize).min(buf.len());
        let slots = buf[start..end]
            .chunks_exact(SLOT_ENTRY_LEN)
            .map(|e| SlotEntry {
                disc_present: bit(e[0], 7),
                change: bit(e[0], 0),
                cwp_valid: bit(e[1], 1),
                cwp: bit(e[1], 0),
            })
            .collect();

        Ok(Self {
            header: ResponseHeader::new(opcode::MECHANISM_STATUS),
            fault: bit(b0, 7),
            changer_state: bits(b0, 5, 0x03),
            current_slot: bits(b0, 0, 0x1F) | (bits(b1, 0, 0x07) << 5),
            mechanism_state: bits(b1, 5, 0x07),
            door_open: bit(b1, 4),
            current_lba: get_u24(buf, 2).unwrap_or(0),
            available_slots: buf[5],
            slot_table_length,
            slots,
        })
    }
}
