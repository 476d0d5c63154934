// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! MODE SENSE (10) and MODE SELECT (10).

use std::borrow::Cow;

use crate::{
    control_block::{CDB_MAX_LEN, CdbEncoder, DataDirection, TransferLength, check_max, opcode},
    error::{EngineError, EngineResult},
    utils::{field, flag, put_u16},
};

/// Mode parameter header (10) length.
pub const MODE_HEADER_LEN: u16 = 8;

/// Page Control (PC) for MODE SENSE byte 2 (bits 7..6).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum PageControl {
    Current = 0b00,
    Changeable = 0b01,
    Default = 0b10,
    Saved = 0b11,
}

impl From<PageControl> for u8 {
    #[inline]
    fn from(pc: PageControl) -> u8 {
        pc as u8
    }
}

/// MMC mode pages.
pub mod mode_page {
    pub const VENDOR: u8 = 0x00;
    pub const READ_WRITE_ERROR_RECOVERY: u8 = 0x01;
    pub const MRW: u8 = 0x03;
    pub const WRITE_PARAMETERS: u8 = 0x05;
    pub const CACHING: u8 = 0x08;
    pub const POWER_CONDITION: u8 = 0x1A;
    pub const INFORMATIONAL_EXCEPTIONS: u8 = 0x1C;
    pub const TIMEOUT_PROTECT: u8 = 0x1D;
    pub const CAPABILITIES: u8 = 0x2A;
    pub const ALL_PAGES: u8 = 0x3F;
}

/// MODE SENSE(10):
///   [0]=0x5A, [1]=DBD<<3, [2]=PC(7..6)|PAGE(5..0), [7..9]=ALLOC_LEN(be)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSense10 {
    pub dbd: bool,
    pub page_control: u8,
    pub page_code: u8,
    pub allocation_length: u16,
}

impl ModeSense10 {
    /// Current values of `page_code`, sized for the header probe.
    pub fn current(page_code: u8) -> Self {
        Self {
            dbd: true,
            page_control: PageControl::Current.into(),
            page_code,
            allocation_length: MODE_HEADER_LEN,
        }
    }

    pub fn with_allocation_length(self, allocation_length: u16) -> Self {
        Self {
            allocation_length,
            ..self
        }
    }
}

impl CdbEncoder for ModeSense10 {
    fn opcode(&self) -> u8 {
        opcode::MODE_SENSE_10
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        check_max("page control", self.page_control.into(), 0x03)?;
        check_max("page code", self.page_code.into(), 0x3F)?;
        cdb[0] = opcode::MODE_SENSE_10;
        cdb[1] = flag(self.dbd, 3);
        cdb[2] = field(self.page_control, 6, 0x03) | field(self.page_code, 0, 0x3F);
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

/// MODE SELECT(10):
///   [0]=0x55, [1]=PF<<4 | SP, [7..9]=PARAMETER LIST LENGTH(be)
///
/// `pages` holds complete mode pages (code, length, data); the 8-byte
/// header is prepended on encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSelect10 {
    pub pf: bool,
    pub sp: bool,
    pub pages: Vec<u8>,
}

impl ModeSelect10 {
    fn parameter_list_len(&self) -> usize {
        MODE_HEADER_LEN as usize + self.pages.len()
    }

    fn check_pages(&self) -> EngineResult<()> {
        let mut off = 0usize;
        while off < self.pages.len() {
            let Some(&len) = self.pages.get(off + 1) else {
                return Err(EngineError::invalid(format!(
                    "mode page at offset {off} has no length byte"
                )));
            };
            off += 2 + len as usize;
        }
        if off != self.pages.len() {
            return Err(EngineError::invalid(
                "mode page length overruns the parameter list",
            ));
        }
        Ok(())
    }
}

impl CdbEncoder for ModeSelect10 {
    fn opcode(&self) -> u8 {
        opcode::MODE_SELECT_10
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        self.check_pages()?;
        let len = self.parameter_list_len();
        check_max("parameter list length", len as u32, u16::MAX.into())?;
        cdb[0] = opcode::MODE_SELECT_10;
        cdb[1] = flag(self.pf, 4) | flag(self.sp, 0);
        put_u16(cdb, 7, len as u16);
        Ok(10)
    }

    fn direction(&self) -> DataDirection {
        DataDirection::Out
    }

    fn transfer_length(&self) -> TransferLength {
        TransferLength::Bytes(self.parameter_list_len())
    }

    fn parameter_list(&self) -> EngineResult<Cow<'_, [u8]>> {
        let mut list = vec![0u8; MODE_HEADER_LEN as usize];
        list.extend_from_slice(&self.pages);
        Ok(Cow::Owned(list))
    }
}
