// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Sense data parsing and translation into the unified error domain.
//!
//! Fixed format (response codes 70h/71h, SPC-4 § 4.5.3):
//!   [0] VALID(7) | RESPONSE CODE(6..0)
//!   [2] FILEMARK(7) | EOM(6) | ILI(5) | SENSE KEY(3..0)
//!   [3..7]  INFORMATION
//!   [7]     ADDITIONAL SENSE LENGTH
//!   [8..12] COMMAND-SPECIFIC INFORMATION
//!   [12] ASC, [13] ASCQ
//!
//! Descriptor format (72h/73h, SPC-4 § 4.5.2):
//!   [1] SENSE KEY(3..0), [2] ASC, [3] ASCQ

use std::fmt;

use crate::{
    error::{EngineError, EngineResult, UnifiedCode, asc_ascq_to_str},
    utils::get_u32,
};

/// Bytes needed to reach ASCQ in fixed format.
pub const FIXED_ASCQ_LEN: usize = 14;
/// Full fixed-format sense block.
pub const FIXED_MIN_LEN: usize = 18;

/// SPC-4 Table 48 sense keys.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenseKey {
    NoSense = 0x0,
    RecoveredError = 0x1,
    NotReady = 0x2,
    MediumError = 0x3,
    HardwareError = 0x4,
    IllegalRequest = 0x5,
    UnitAttention = 0x6,
    DataProtect = 0x7,
    BlankCheck = 0x8,
    VendorSpecific = 0x9,
    CopyAborted = 0xA,
    AbortedCommand = 0xB,
    Reserved = 0xC,
    VolumeOverflow = 0xD,
    Miscompare = 0xE,
    Completed = 0xF,
}

impl From<u8> for SenseKey {
    fn from(v: u8) -> Self {
        match v & 0x0F {
            0x0 => SenseKey::NoSense,
            0x1 => SenseKey::RecoveredError,
            0x2 => SenseKey::NotReady,
            0x3 => SenseKey::MediumError,
            0x4 => SenseKey::HardwareError,
            0x5 => SenseKey::IllegalRequest,
            0x6 => SenseKey::UnitAttention,
            0x7 => SenseKey::DataProtect,
            0x8 => SenseKey::BlankCheck,
            0x9 => SenseKey::VendorSpecific,
            0xA => SenseKey::CopyAborted,
            0xB => SenseKey::AbortedCommand,
            0xC => SenseKey::Reserved,
            0xD => SenseKey::VolumeOverflow,
            0xE => SenseKey::Miscompare,
            _ => SenseKey::Completed,
        }
    }
}

/// Sense format announced by the response code byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenseFormat {
    FixedCurrent,
    FixedDeferred,
    DescriptorCurrent,
    DescriptorDeferred,
}

impl SenseFormat {
    fn from_response_code(code: u8) -> Option<Self> {
        Some(match code & 0x7F {
            0x70 => SenseFormat::FixedCurrent,
            0x71 => SenseFormat::FixedDeferred,
            0x72 => SenseFormat::DescriptorCurrent,
            0x73 => SenseFormat::DescriptorDeferred,
            _ => return None,
        })
    }

    pub fn is_fixed(self) -> bool {
        matches!(self, SenseFormat::FixedCurrent | SenseFormat::FixedDeferred)
    }
}

/// The sense key / ASC / ASCQ triple.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SenseRecord {
    pub sense_key: u8,
    pub additional_sense_code: u8,
    pub additional_sense_code_qualifier: u8,
}

impl SenseRecord {
    pub const fn new(sense_key: u8, asc: u8, ascq: u8) -> Self {
        Self {
            sense_key: sense_key & 0x0F,
            additional_sense_code: asc,
            additional_sense_code_qualifier: ascq,
        }
    }

    /// Extracts the triple from fixed or descriptor format sense bytes.
    ///
    /// Returns `None` when the buffer is empty or the response code is not a
    /// sense response code; in both cases there is nothing to translate.
    pub fn parse(buf: &[u8]) -> Option<Self> {
        let format = SenseFormat::from_response_code(*buf.first()?)?;
        if format.is_fixed() {
            let sk = buf.get(2).copied()?;
            let asc = buf.get(12).copied().unwrap_or(0);
            let ascq = buf.get(13).copied().unwrap_or(0);
            Some(Self::new(sk, asc, ascq))
        } else {
            let sk = buf.get(1).copied()?;
            let asc = buf.get(2).copied().unwrap_or(0);
            let ascq = buf.get(3).copied().unwrap_or(0);
            Some(Self::new(sk, asc, ascq))
        }
    }

    #[inline]
    pub fn key(&self) -> SenseKey {
        SenseKey::from(self.sense_key)
    }

    #[inline]
    pub fn code(&self) -> UnifiedCode {
        UnifiedCode::new(
            self.sense_key,
            self.additional_sense_code,
            self.additional_sense_code_qualifier,
        )
    }

    /// `true` when the triple reports no condition at all.
    #[inline]
    pub fn is_clear(&self) -> bool {
        self.sense_key == 0
            && self.additional_sense_code == 0
            && self.additional_sense_code_qualifier == 0
    }
}

impl fmt::Debug for SenseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenseRecord")
            .field("sense_key", &self.key())
            .field("asc", &format_args!("{:#04x}", self.additional_sense_code))
            .field(
                "ascq",
                &format_args!("{:#04x}", self.additional_sense_code_qualifier),
            )
            .field(
                "description",
                &asc_ascq_to_str(
                    self.additional_sense_code,
                    self.additional_sense_code_qualifier,
                ),
            )
            .finish()
    }
}

/// Maps sense bytes to the unified result.
///
/// `Ok(())` when there is no sense data or it reports no condition,
/// otherwise `SenseError` carrying the folded code. The mapping depends on
/// the triple alone.
pub fn translate(sense: &[u8]) -> EngineResult<()> {
    match SenseRecord::parse(sense) {
        Some(rec) if !rec.is_clear() => Err(EngineError::SenseError(rec.code())),
        _ => Ok(()),
    }
}

/// Full fixed-format sense block as returned by REQUEST SENSE.
#[derive(Default, PartialEq, Eq, Clone)]
pub struct SenseData {
    pub valid: bool,
    pub response_code: u8,
    pub sense_key: u8,
    pub ili: bool,
    pub eom: bool,
    pub filemark: bool,
    pub information: u32,
    pub additional_len: u8,
    pub cmd_specific: u32,
    pub asc: u8,
    pub ascq: u8,
    /// Sense-key specific bytes 15..17 (SKSV is bit 7 of byte 15).
    pub sense_key_specific: [u8; 3],
}

impl SenseData {
    /// Parse *fixed-format* sense-data.
    ///
    /// The buffer must be at least 18 bytes long.
    pub fn parse(buf: &[u8]) -> EngineResult<Self> {
        if buf.len() < FIXED_MIN_LEN {
            return Err(EngineError::protocol(format!(
                "sense buffer too small: {} < {FIXED_MIN_LEN}",
                buf.len()
            )));
        }
        let format = SenseFormat::from_response_code(buf[0]).ok_or_else(|| {
            EngineError::protocol(format!("bad sense response code {:#04x}", buf[0]))
        })?;
        if !format.is_fixed() {
            return Err(EngineError::protocol(
                "descriptor-format sense where fixed format was requested",
            ));
        }

        Ok(Self {
            valid: buf[0] & 0x80 != 0,
            response_code: buf[0] & 0x7F,
            filemark: buf[2] & 0x80 != 0,
            eom: buf[2] & 0x40 != 0,
            ili: buf[2] & 0x20 != 0,
            sense_key: buf[2] & 0x0F,
            information: get_u32(buf, 3).unwrap_or_default(),
            additional_len: buf[7],
            cmd_specific: get_u32(buf, 8).unwrap_or_default(),
            asc: buf[12],
            ascq: buf[13],
            sense_key_specific: [buf[15], buf[16], buf[17]],
        })
    }

    pub fn record(&self) -> SenseRecord {
        SenseRecord::new(self.sense_key, self.asc, self.ascq)
    }

    /// Progress indication (0..=65535) when the drive reports one through
    /// the sense-key specific bytes (NOT READY, long operations).
    pub fn progress(&self) -> Option<u16> {
        let [b15, b16, b17] = self.sense_key_specific;
        (b15 & 0x80 != 0 && matches!(self.sense_key, 0x0 | 0x2))
            .then(|| u16::from_be_bytes([b16, b17]))
    }
}

impl fmt::Debug for SenseData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenseData")
            .field("valid", &self.valid)
            .field(
                "response_code",
                &format_args!("{:#04x}", self.response_code),
            )
            .field("sense_key", &format_args!("{:#x}", self.sense_key))
            .field("filemark", &self.filemark)
            .field("eom", &self.eom)
            .field("ili", &self.ili)
            .field("information", &self.information)
            .field("additional_len", &self.additional_len)
            .field("cmd_specific", &self.cmd_specific)
            .field("asc", &format_args!("{:#04x}", self.asc))
            .field("ascq", &format_args!("{:#04x}", self.ascq))
            .field("description", &asc_ascq_to_str(self.asc, self.ascq))
            .finish()
    }
}
