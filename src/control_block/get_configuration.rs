// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! GET CONFIGURATION (0x46), 10 bytes:
//!   [0] 0x46
//!   [1] RT(1..0)
//!   [2..4] STARTING FEATURE NUMBER (BE)
//!   [7..9] ALLOCATION LENGTH (BE)

use crate::{
    control_block::{CDB_MAX_LEN, CdbEncoder, DataDirection, TransferLength, check_max, opcode},
    error::{EngineError, EngineResult},
    utils::{field, put_u16},
};

/// Header preceding the feature descriptors.
pub const CONFIGURATION_HEADER_LEN: u16 = 8;

/// RT field.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    /// Every feature, starting at the given code.
    All = 0x00,
    /// Only features with the Current bit set.
    Current = 0x01,
    /// Exactly one descriptor, the one named by the start code.
    From = 0x02,
}

impl From<RequestType> for u8 {
    #[inline]
    fn from(rt: RequestType) -> u8 {
        rt as u8
    }
}

impl TryFrom<u8> for RequestType {
    type Error = EngineError;

    fn try_from(v: u8) -> EngineResult<Self> {
        Ok(match v {
            0x00 => RequestType::All,
            0x01 => RequestType::Current,
            0x02 => RequestType::From,
            _ => return Err(EngineError::invalid(format!("invalid request type: {v}"))),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetConfiguration {
    pub rt: u8,
    pub start_feature: u16,
    pub allocation_length: u16,
}

impl GetConfiguration {
    pub fn new(rt: RequestType, start_feature: u16) -> Self {
        Self {
            rt: rt.into(),
            start_feature,
            allocation_length: CONFIGURATION_HEADER_LEN,
        }
    }

    pub fn with_allocation_length(self, allocation_length: u16) -> Self {
        Self {
            allocation_length,
            ..self
        }
    }
}

impl CdbEncoder for GetConfiguration {
    fn opcode(&self) -> u8 {
        opcode::GET_CONFIGURATION
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        check_max("request type", self.rt.into(), 0x02)?;
        cdb[0] = opcode::GET_CONFIGURATION;
        cdb[1] = field(self.rt, 0, 0x03);
        put_u16(cdb, 2, self.start_feature);
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
