// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! BLANK (0xA1) and CLOSE TRACK/SESSION (0x5B).
//!
//! BLANK, 12 bytes:
//!   [0] 0xA1
//!   [1] IMMED(4) | BLANKING TYPE(2..0)
//!   [2..6] START ADDRESS / LOGICAL TRACK NUMBER (BE)
//!
//! CLOSE TRACK/SESSION, 10 bytes:
//!   [0] 0x5B
//!   [1] IMMED(0)
//!   [2] CLOSE FUNCTION(2..0)
//!   [4..6] LOGICAL TRACK/SESSION NUMBER (BE)

use crate::{
    control_block::{CDB_MAX_LEN, CdbEncoder, check_max, opcode},
    error::EngineResult,
    utils::{field, flag, put_u16, put_u32},
};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankingType {
    BlankDisc = 0x00,
    MinimalBlankDisc = 0x01,
    BlankTrack = 0x02,
    UnreserveTrack = 0x03,
    BlankTrackTail = 0x04,
    UncloseLastSession = 0x05,
    BlankLastSession = 0x06,
}

impl From<BlankingType> for u8 {
    #[inline]
    fn from(t: BlankingType) -> u8 {
        t as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blank {
    pub immed: bool,
    /// One of [`BlankingType`]; anything above 6 is rejected.
    pub blanking_type: u8,
    pub start_address: u32,
}

impl Blank {
    pub fn new(blanking_type: BlankingType, immed: bool) -> Self {
        Self {
            immed,
            blanking_type: blanking_type.into(),
            start_address: 0,
        }
    }
}

impl CdbEncoder for Blank {
    fn opcode(&self) -> u8 {
        opcode::BLANK
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        check_max("blanking type", self.blanking_type.into(), 0x06)?;
        cdb[0] = opcode::BLANK;
        cdb[1] = flag(self.immed, 4) | field(self.blanking_type, 0, 0x07);
        put_u32(cdb, 2, self.start_address);
        Ok(12)
    }
}

/// Close functions shared by CD and DVD-R media; other media reuse the
/// codes with their own meaning.
pub mod close_function {
    pub const CLOSE_LOGICAL_TRACK: u8 = 0x01;
    pub const CLOSE_SESSION: u8 = 0x02;
    pub const FINALIZE_DVD_RW: u8 = 0x03;
    pub const RECORD_EXTENDED_LEADOUT: u8 = 0x04;
    pub const FINALIZE_30MM_RADIUS: u8 = 0x05;
    pub const FINALIZE_DISC: u8 = 0x06;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseTrackSession {
    pub immed: bool,
    pub close_function: u8,
    pub number: u16,
}

impl CdbEncoder for CloseTrackSession {
    fn opcode(&self) -> u8 {
        opcode::CLOSE_TRACK_SESSION
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        check_max("close function", self.close_function.into(), 0x07)?;
        cdb[0] = opcode::CLOSE_TRACK_SESSION;
        cdb[1] = flag(self.immed, 0);
        cdb[2] = field(self.close_function, 0, 0x07);
        put_u16(cdb, 4, self.number);
        Ok(10)
    }
}
