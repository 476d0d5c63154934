// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Unified error domain of the engine.
//!
//! Every engine call yields `Result<T, EngineError>`. Device-level failures
//! reported through sense data are folded into a single [`UnifiedCode`] so
//! callers can match on one value instead of three bytes.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Bad caller input, detected before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A transfer buffer could not be allocated.
    #[error("out of memory")]
    OutOfMemory,
    /// The transport failed and no sense data is available.
    #[error("device I/O failure (os code {os_code:#x})")]
    DeviceIoFailure { os_code: i32 },
    /// The response did not match the expected wire format.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
    /// The device completed the command with sense data describing an error.
    #[error("sense error {0}")]
    SenseError(UnifiedCode),
    /// Fewer bytes than requested, with no error status and no sense data.
    #[error("unexpected short transfer: expected {expected} bytes, got {transferred}")]
    UnexpectedShortTransfer { expected: usize, transferred: usize },
}

impl EngineError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::ProtocolViolation(msg.into())
    }

    /// The sense code when this is a [`EngineError::SenseError`].
    pub fn sense_code(&self) -> Option<UnifiedCode> {
        match self {
            Self::SenseError(code) => Some(*code),
            _ => None,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Sense key / ASC / ASCQ folded into one value:
/// `(sense_key << 16) | (asc << 8) | ascq`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnifiedCode(u32);

impl UnifiedCode {
    pub const fn new(sense_key: u8, asc: u8, ascq: u8) -> Self {
        Self((((sense_key & 0x0F) as u32) << 16) | ((asc as u32) << 8) | ascq as u32)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn sense_key(self) -> u8 {
        ((self.0 >> 16) & 0x0F) as u8
    }

    pub const fn asc(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    pub const fn ascq(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// SPC/MMC description of the ASC/ASCQ pair.
    pub fn description(self) -> &'static str {
        asc_ascq_to_str(self.asc(), self.ascq())
    }
}

impl fmt::Debug for UnifiedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UnifiedCode(sk={:#x}, asc={:#04x}, ascq={:#04x})",
            self.sense_key(),
            self.asc(),
            self.ascq()
        )
    }
}

impl fmt::Display for UnifiedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:#08x} ({}/{:02X}/{:02X}: {})",
            self.0,
            self.sense_key(),
            self.asc(),
            self.ascq(),
            self.description()
        )
    }
}

/// Return the SPC-4 / MMC-5 description for a given ASC/ASCQ pair.
///
/// * If the pair is not present in the table, returns `"UNSPECIFIED /
///   vendor specific"`.
#[inline]
pub fn asc_ascq_to_str(asc: u8, ascq: u8) -> &'static str {
    hot_table(asc, ascq).unwrap_or("UNSPECIFIED / vendor specific")
}

fn hot_table(asc: u8, ascq: u8) -> Option<&'static str> {
    Some(match (asc, ascq) {
        (0x00, 0x00) => "No additional sense information",
        (0x00, 0x16) => "Operation in progress",
        (0x02, 0x00) => "No seek complete",
        (0x04, 0x00) => "Logical unit not ready, cause not reportable",
        (0x04, 0x01) => "Logical unit is in process of becoming ready",
        (0x04, 0x04) => "Logical unit not ready, format in progress",
        (0x04, 0x07) => "Logical unit not ready, operation in progress",
        (0x04, 0x08) => "Logical unit not ready, long write in progress",
        (0x0C, 0x00) => "Write error",
        (0x11, 0x00) => "Unrecovered read error",
        (0x11, 0x05) => "L-EC uncorrectable error",
        (0x11, 0x06) => "CIRC unrecovered error",
        (0x15, 0x00) => "Random positioning error",
        (0x1A, 0x00) => "Parameter list length error",
        (0x20, 0x00) => "Invalid command operation code",
        (0x21, 0x00) => "Logical block address out of range",
        (0x21, 0x02) => "Invalid address for write",
        (0x24, 0x00) => "Invalid field in CDB",
        (0x25, 0x00) => "Logical unit not supported",
        (0x26, 0x00) => "Invalid field in parameter list",
        (0x27, 0x00) => "Write protected",
        (0x28, 0x00) => "Not ready to ready change, medium may have changed",
        (0x29, 0x00) => "Power on, reset, or bus device reset occurred",
        (0x2A, 0x01) => "Mode parameters changed",
        (0x2C, 0x00) => "Command sequence error",
        (0x30, 0x00) => "Incompatible medium installed",
        (0x30, 0x02) => "Cannot read medium, incompatible format",
        (0x30, 0x05) => "Cannot write medium, incompatible format",
        (0x31, 0x00) => "Medium format corrupted",
        (0x3A, 0x00) => "Medium not present",
        (0x3A, 0x01) => "Medium not present, tray closed",
        (0x3A, 0x02) => "Medium not present, tray open",
        (0x3E, 0x00) => "Logical unit has not self-configured yet",
        (0x53, 0x02) => "Medium removal prevented",
        (0x57, 0x00) => "Unable to recover table-of-contents",
        (0x5A, 0x01) => "Operator medium removal request",
        (0x63, 0x00) => "End of user area encountered on this track",
        (0x64, 0x00) => "Illegal mode for this track",
        (0x6F, 0x00) => "Copy protection key exchange failure, authentication failure",
        (0x72, 0x00) => "Session fixation error",
        (0x72, 0x03) => "Session fixation error, incomplete track in session",
        (0x73, 0x00) => "CD control error",
        (0x73, 0x03) => "Power calibration area error",
        _ => return None,
    })
}
