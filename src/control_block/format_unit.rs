// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! FORMAT UNIT (0x04), 6-byte CDB with a 12-byte parameter list.
//!
//! CDB:
//!   [0] 0x04
//!   [1] FMTDATA(4)=1 | CMPLIST(3) | FORMAT CODE(2..0)=001b
//!
//! Parameter list:
//!   [0]    reserved
//!   [1]    FOV(7) | DPRY(6) | DCRT(5) | STPF(4) | IP(3) | TRY-OUT(2) | IMMED(1) | VS(0)
//!   [2..4] FORMAT DESCRIPTOR LENGTH = 8
//!   [4..8] NUMBER OF BLOCKS
//!   [8]    FORMAT TYPE(7..2) | FORMAT SUBTYPE(1..0)
//!   [9..12] TYPE DEPENDENT PARAMETER

use std::borrow::Cow;

use crate::{
    control_block::{CDB_MAX_LEN, CdbEncoder, DataDirection, TransferLength, check_max, opcode},
    error::EngineResult,
    utils::{U24_MAX, field, flag, put_u16, put_u24, put_u32},
};

pub const FORMAT_PARAMETER_LIST_LEN: usize = 12;

pub mod format_type {
    pub const FULL_FORMAT: u8 = 0x00;
    pub const SPARE_AREA_EXPANSION: u8 = 0x01;
    pub const ZONE_REFORMAT: u8 = 0x04;
    pub const ZONE_FORMAT: u8 = 0x05;
    pub const CD_RW_DVD_RW_FULL_FORMAT: u8 = 0x10;
    pub const CD_RW_DVD_RW_GROW_SESSION: u8 = 0x11;
    pub const CD_RW_DVD_RW_ADD_SESSION: u8 = 0x12;
    pub const DVD_RW_QUICK_GROW_LAST_BORDER: u8 = 0x13;
    pub const DVD_RW_QUICK_ADD_BORDER: u8 = 0x14;
    pub const DVD_RW_QUICK_FORMAT: u8 = 0x15;
    pub const HD_DVD_R_TEST_ZONE_EXPANSION: u8 = 0x16;
    pub const FULL_FORMAT_WITH_SPARING: u8 = 0x20;
    pub const MRW_FORMAT: u8 = 0x24;
    pub const DVD_PLUS_RW_BASIC_FORMAT: u8 = 0x26;
    pub const BD_RE_FULL_FORMAT_WITH_SPARE_AREAS: u8 = 0x30;
    pub const BD_RE_FULL_FORMAT_WITHOUT_SPARE_AREAS: u8 = 0x31;
    pub const BD_R_FULL_FORMAT_WITH_SPARE_AREAS: u8 = 0x32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatUnit {
    pub cmplist: bool,
    pub fov: bool,
    pub dcrt: bool,
    pub try_out: bool,
    pub immed: bool,
    pub vs: bool,
    pub num_of_blocks: u32,
    pub format_type: u8,
    pub format_subtype: u8,
    /// 24-bit, meaning depends on `format_type`.
    pub type_dependent: u32,
}

impl FormatUnit {
    /// Type dependent parameter for Full Format with sparing: M in byte 10,
    /// N in byte 11.
    pub fn sparing_parameters(m: u8, n: u8) -> u32 {
        u32::from_be_bytes([0, 0, m, n])
    }

    /// DVD+RW basic format: RESTART(1) | QUICK START(0) in the last byte.
    pub fn dvd_plus_rw_basic(restart: bool, quick_start: bool) -> u32 {
        u32::from(flag(restart, 1) | flag(quick_start, 0))
    }

    fn build_parameter_list(&self) -> [u8; FORMAT_PARAMETER_LIST_LEN] {
        let mut p = [0u8; FORMAT_PARAMETER_LIST_LEN];
        p[1] = flag(self.fov, 7)
            | flag(self.dcrt, 5)
            | flag(self.try_out, 2)
            | flag(self.immed, 1)
            | flag(self.vs, 0);
        put_u16(&mut p, 2, 8);
        put_u32(&mut p, 4, self.num_of_blocks);
        p[8] = field(self.format_type, 2, 0x3F) | field(self.format_subtype, 0, 0x03);
        put_u24(&mut p, 9, self.type_dependent);
        p
    }
}

impl CdbEncoder for FormatUnit {
    fn opcode(&self) -> u8 {
        opcode::FORMAT_UNIT
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        check_max("format type", self.format_type.into(), 0x3F)?;
        check_max("format subtype", self.format_subtype.into(), 0x03)?;
        check_max("type dependent parameter", self.type_dependent, U24_MAX)?;
        cdb[0] = opcode::FORMAT_UNIT;
        cdb[1] = flag(true, 4) | flag(self.cmplist, 3) | 0x01;
        Ok(6)
    }

    fn direction(&self) -> DataDirection {
        DataDirection::Out
    }

    fn transfer_length(&self) -> TransferLength {
        TransferLength::Bytes(FORMAT_PARAMETER_LIST_LEN)
    }

    fn parameter_list(&self) -> EngineResult<Cow<'_, [u8]>> {
        Ok(Cow::Owned(self.build_parameter_list().to_vec()))
    }
}
