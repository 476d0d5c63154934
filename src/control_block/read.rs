// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Reading and positioning: READ(10), READ(12), READ CD, SEEK(10),
//! VERIFY(10).

use crate::{
    control_block::{
        CDB_MAX_LEN, CdbEncoder, DataDirection, TransferLength, check_max, check_one_of, opcode,
    },
    error::EngineResult,
    utils::{U24_MAX, field, flag, put_u16, put_u24, put_u32},
};

/// READ(10).
///
/// Layout (MMC):
/// - byte 0      : OPERATION CODE = 0x28
/// - byte 1      : FUA(3)
/// - bytes 2..5  : LBA (big-endian, 32-bit)
/// - bytes 7..8  : TRANSFER LENGTH in blocks (big-endian, 16-bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Read10 {
    pub fua: bool,
    pub lba: u32,
    pub blocks: u16,
}

impl CdbEncoder for Read10 {
    fn opcode(&self) -> u8 {
        opcode::READ_10
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        cdb[0] = opcode::READ_10;
        cdb[1] = flag(self.fua, 3);
        put_u32(cdb, 2, self.lba);
        put_u16(cdb, 7, self.blocks);
        Ok(10)
    }

    fn direction(&self) -> DataDirection {
        DataDirection::In
    }

    fn transfer_length(&self) -> TransferLength {
        TransferLength::Blocks(self.blocks.into())
    }
}

/// READ(12).
///
/// - byte 1      : FUA(3)
/// - bytes 2..5  : LBA
/// - bytes 6..9  : TRANSFER LENGTH in blocks (32-bit)
/// - byte 10     : STREAMING(7)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Read12 {
    pub fua: bool,
    pub lba: u32,
    pub blocks: u32,
    pub streaming: bool,
}

impl CdbEncoder for Read12 {
    fn opcode(&self) -> u8 {
        opcode::READ_12
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        cdb[0] = opcode::READ_12;
        cdb[1] = flag(self.fua, 3);
        put_u32(cdb, 2, self.lba);
        put_u32(cdb, 6, self.blocks);
        cdb[10] = flag(self.streaming, 7);
        Ok(12)
    }

    fn direction(&self) -> DataDirection {
        DataDirection::In
    }

    fn transfer_length(&self) -> TransferLength {
        TransferLength::Blocks(self.blocks)
    }
}

/// Expected sector types for READ CD.
pub mod sector_type {
    pub const ANY: u8 = 0x00;
    pub const CDDA: u8 = 0x01;
    pub const MODE1: u8 = 0x02;
    pub const MODE2_FORMLESS: u8 = 0x03;
    pub const MODE2_FORM1: u8 = 0x04;
    pub const MODE2_FORM2: u8 = 0x05;
}

/// READ CD.
///
/// - byte 1      : EXPECTED SECTOR TYPE(4..2) | DAP(1)
/// - bytes 2..5  : STARTING LBA
/// - bytes 6..8  : TRANSFER LENGTH in sectors (24-bit)
/// - byte 9      : SYNC(7) | HEADER CODES(6..5) | USER DATA(4) | EDC&ECC(3) | C2 ERROR(2..1)
/// - byte 10     : SUB-CHANNEL SELECTION(2..0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadCd {
    pub expected_sector_type: u8,
    pub dap: bool,
    pub lba: u32,
    pub sectors: u32,
    pub sync: bool,
    pub header_codes: u8,
    pub user_data: bool,
    pub edc_ecc: bool,
    pub c2_error_info: u8,
    pub subchannel: u8,
    /// Bytes the selected fields add up to per sector (2352 for a full raw
    /// sector, 2048 for Mode 1 user data...).
    pub sector_size: u32,
}

impl ReadCd {
    /// Raw 2352-byte sectors of any type.
    pub fn raw(lba: u32, sectors: u32) -> Self {
        Self {
            expected_sector_type: sector_type::ANY,
            dap: false,
            lba,
            sectors,
            sync: true,
            header_codes: 0x03,
            user_data: true,
            edc_ecc: true,
            c2_error_info: 0,
            subchannel: 0,
            sector_size: 2352,
        }
    }
}

impl CdbEncoder for ReadCd {
    fn opcode(&self) -> u8 {
        opcode::READ_CD
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        check_max("expected sector type", self.expected_sector_type.into(), 0x05)?;
        check_max("header codes", self.header_codes.into(), 0x03)?;
        check_max("C2 error information", self.c2_error_info.into(), 0x02)?;
        check_one_of("sub-channel selection", self.subchannel, &[0x00, 0x02, 0x04])?;
        check_max("transfer length", self.sectors, U24_MAX)?;
        cdb[0] = opcode::READ_CD;
        cdb[1] = field(self.expected_sector_type, 2, 0x07) | flag(self.dap, 1);
        put_u32(cdb, 2, self.lba);
        put_u24(cdb, 6, self.sectors);
        cdb[9] = flag(self.sync, 7)
            | field(self.header_codes, 5, 0x03)
            | flag(self.user_data, 4)
            | flag(self.edc_ecc, 3)
            | field(self.c2_error_info, 1, 0x03);
        cdb[10] = field(self.subchannel, 0, 0x07);
        Ok(12)
    }

    fn direction(&self) -> DataDirection {
        DataDirection::In
    }

    fn transfer_length(&self) -> TransferLength {
        TransferLength::Bytes(self.sectors as usize * self.sector_size as usize)
    }
}

/// SEEK(10): bytes 2..5 LBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seek {
    pub lba: u32,
}

impl CdbEncoder for Seek {
    fn opcode(&self) -> u8 {
        opcode::SEEK_10
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        cdb[0] = opcode::SEEK_10;
        put_u32(cdb, 2, self.lba);
        Ok(10)
    }
}

/// VERIFY(10):
/// - bytes 2..5  : LBA
/// - byte 6      : G3TOUT(0)
/// - bytes 7..8  : VERIFICATION LENGTH in blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verify10 {
    pub lba: u32,
    pub g3_timeout: bool,
    pub blocks: u16,
}

impl CdbEncoder for Verify10 {
    fn opcode(&self) -> u8 {
        opcode::VERIFY_10
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        cdb[0] = opcode::VERIFY_10;
        put_u32(cdb, 2, self.lba);
        cdb[6] = flag(self.g3_timeout, 0);
        put_u16(cdb, 7, self.blocks);
        Ok(10)
    }
}
