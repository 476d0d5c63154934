// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! INQUIRY (6), standard data only.
//!
//! CDB layout (SPC):
//!   [0] = 0x12 (INQUIRY)
//!   [1] = EVPD (bit 0)
//!   [2] = Page Code (only when EVPD=1; else 0)
//!   [3..5] = Allocation Length (BE)
//!   [5] = Control

use crate::{
    control_block::{CDB_MAX_LEN, CdbEncoder, DataDirection, TransferLength, opcode},
    error::{EngineError, EngineResult},
    utils::{flag, put_u16},
};

/// Enough to reach the ADDITIONAL LENGTH byte.
pub const INQUIRY_PROBE_LEN: u16 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inquiry {
    /// Vital product data is not supported; must stay `false`.
    pub evpd: bool,
    /// Must be 0 with `evpd == false`.
    pub page_code: u8,
    pub allocation_length: u16,
}

impl Inquiry {
    /// Standard INQUIRY sized for the length probe.
    pub fn standard() -> Self {
        Self {
            evpd: false,
            page_code: 0,
            allocation_length: INQUIRY_PROBE_LEN,
        }
    }

    pub fn with_allocation_length(self, allocation_length: u16) -> Self {
        Self {
            allocation_length,
            ..self
        }
    }
}

impl Default for Inquiry {
    fn default() -> Self {
        Self::standard()
    }
}

impl CdbEncoder for Inquiry {
    fn opcode(&self) -> u8 {
        opcode::INQUIRY
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        if self.evpd || self.page_code != 0 {
            return Err(EngineError::invalid(format!(
                "only standard INQUIRY data is supported (evpd={}, page={:#04x})",
                self.evpd, self.page_code
            )));
        }
        cdb[0] = opcode::INQUIRY;
        cdb[1] = flag(self.evpd, 0);
        cdb[2] = self.page_code;
        put_u16(cdb, 3, self.allocation_length);
        Ok(6)
    }

    fn direction(&self) -> DataDirection {
        DataDirection::In
    }

    fn transfer_length(&self) -> TransferLength {
        TransferLength::Bytes(self.allocation_length as usize)
    }
}
