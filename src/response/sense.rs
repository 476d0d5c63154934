// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::{
    control_block::opcode,
    error::{EngineError, EngineResult, UnifiedCode},
    models::sense::{FIXED_MIN_LEN, SenseData, SenseRecord},
    response::ResponseHeader,
};

/// REQUEST SENSE result.
///
/// `record` is always present; `fixed` holds the full block when the drive
/// answered in fixed format with at least 18 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSenseResponse {
    pub header: ResponseHeader,
    pub record: SenseRecord,
    pub fixed: Option<SenseData>,
}

impl RequestSenseResponse {
    pub fn parse(buf: &[u8]) -> EngineResult<Self> {
        let record = SenseRecord::parse(buf).ok_or_else(|| {
            EngineError::protocol(format!(
                "REQUEST SENSE returned no sense data: {}",
                hex::encode(buf)
            ))
        })?;
        let fixed = (buf.len() >= FIXED_MIN_LEN)
            .then(|| SenseData::parse(buf).ok())
            .flatten();
        Ok(Self {
            header: ResponseHeader::new(opcode::REQUEST_SENSE),
            record,
            fixed,
        })
    }

    #[inline]
    pub fn code(&self) -> UnifiedCode {
        self.record.code()
    }

    /// Progress of a long-running operation, when the drive reports one.
    pub fn progress(&self) -> Option<u16> {
        self.fixed.as_ref().and_then(SenseData::progress)
    }
}
