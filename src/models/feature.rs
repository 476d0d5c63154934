// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Feature descriptors returned by GET CONFIGURATION (MMC-5 § 5.2).
//!
//! Descriptor layout:
//!   [0..2] FEATURE CODE (BE)
//!   [2]    reserved(7..6) | VERSION(5..2) | PERSISTENT(1) | CURRENT(0)
//!   [3]    ADDITIONAL LENGTH
//!   [4..]  feature dependent data (ADDITIONAL LENGTH bytes)

use bitflags::bitflags;

use crate::{
    error::{EngineError, EngineResult},
    utils::{bit, bits, get_u16, get_u32},
};

pub const FEATURE_HEADER_LEN: usize = 4;

pub mod feature_code {
    pub const PROFILE_LIST: u16 = 0x0000;
    pub const CORE: u16 = 0x0001;
    pub const MORPHING: u16 = 0x0002;
    pub const REMOVABLE_MEDIUM: u16 = 0x0003;
    pub const WRITE_PROTECT: u16 = 0x0004;
    pub const RANDOM_READABLE: u16 = 0x0010;
    pub const MULTI_READ: u16 = 0x001D;
    pub const CD_READ: u16 = 0x001E;
    pub const DVD_READ: u16 = 0x001F;
    pub const RANDOM_WRITABLE: u16 = 0x0020;
    pub const INCREMENTAL_STREAMING_WRITABLE: u16 = 0x0021;
    pub const FORMATTABLE: u16 = 0x0023;
    pub const CD_TRACK_AT_ONCE: u16 = 0x002D;
    pub const CD_MASTERING: u16 = 0x002E;
    pub const DVD_R_RW_WRITE: u16 = 0x002F;
    pub const BD_READ: u16 = 0x0040;
    pub const BD_WRITE: u16 = 0x0041;
    pub const POWER_MANAGEMENT: u16 = 0x0100;
    pub const TIMEOUT: u16 = 0x0105;
    pub const REAL_TIME_STREAMING: u16 = 0x0107;
    pub const DRIVE_SERIAL_NUMBER: u16 = 0x0108;
}

bitflags! {
    /// Low bits of descriptor byte 2; VERSION sits above them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FeatureFlags: u8 {
        const CURRENT    = 0b0000_0001;
        const PERSISTENT = 0b0000_0010;
    }
}

/// One entry of the Profile List feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub number: u16,
    pub current: bool,
}

/// Feature dependent data, decoded for the common features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeaturePayload {
    ProfileList(Vec<Profile>),
    Core {
        physical_interface: u32,
        inq2: bool,
        dbe: bool,
    },
    Morphing {
        oc_event: bool,
        asynchronous: bool,
    },
    RemovableMedium {
        loading_mechanism: u8,
        load: bool,
        eject: bool,
        prevent_jumper: bool,
        lock: bool,
    },
    RandomReadable {
        logical_block_size: u32,
        blocking: u16,
        page_present: bool,
    },
    CdRead {
        dap: bool,
        c2_flags: bool,
        cd_text: bool,
    },
    DvdRead {
        multi110: bool,
        dual_r: bool,
        dual_rw: bool,
    },
    PowerManagement,
    Timeout {
        group3: bool,
        unit_length: u16,
    },
    RealTimeStreaming {
        rbcb: bool,
        scs: bool,
        mp2a: bool,
        wspd: bool,
        sw: bool,
    },
    /// Any feature without a typed decoder, or a typed one whose data was
    /// too short for its layout.
    Raw(Vec<u8>),
}

impl FeaturePayload {
    fn decode(code: u16, data: &[u8]) -> Self {
        Self::decode_typed(code, data).unwrap_or_else(|| FeaturePayload::Raw(data.to_vec()))
    }

    fn decode_typed(code: u16, d: &[u8]) -> Option<Self> {
        use feature_code::*;
        Some(match code {
            PROFILE_LIST => FeaturePayload::ProfileList(
                d.chunks_exact(4)
                    .map(|p| Profile {
                        number: u16::from_be_bytes([p[0], p[1]]),
                        current: bit(p[2], 0),
                    })
                    .collect(),
            ),
            CORE => {
                let b4 = d.get(4).copied().unwrap_or(0);
                FeaturePayload::Core {
                    physical_interface: get_u32(d, 0)?,
                    inq2: bit(b4, 1),
                    dbe: bit(b4, 0),
                }
            },
            MORPHING => {
                let b = *d.first()?;
                FeaturePayload::Morphing {
                    oc_event: bit(b, 1),
                    asynchronous: bit(b, 0),
                }
            },
            REMOVABLE_MEDIUM => {
                let b = *d.first()?;
                FeaturePayload::RemovableMedium {
                    loading_mechanism: bits(b, 5, 0x07),
                    load: bit(b, 4),
                    eject: bit(b, 3),
                    prevent_jumper: bit(b, 2),
                    lock: bit(b, 0),
                }
            },
            RANDOM_READABLE => FeaturePayload::RandomReadable {
                logical_block_size: get_u32(d, 0)?,
                blocking: get_u16(d, 4)?,
                page_present: bit(*d.get(6)?, 0),
            },
            CD_READ => {
                let b = *d.first()?;
                FeaturePayload::CdRead {
                    dap: bit(b, 7),
                    c2_flags: bit(b, 1),
                    cd_text: bit(b, 0),
                }
            },
            DVD_READ => {
                let b0 = d.first().copied().unwrap_or(0);
                let b2 = d.get(2).copied().unwrap_or(0);
                FeaturePayload::DvdRead {
                    multi110: bit(b0, 0),
                    dual_r: bit(b2, 0),
                    dual_rw: bit(b2, 1),
                }
            },
            POWER_MANAGEMENT => FeaturePayload::PowerManagement,
            TIMEOUT => {
                let b0 = *d.first()?;
                FeaturePayload::Timeout {
                    group3: bit(b0, 0),
                    unit_length: get_u16(d, 2).unwrap_or(0),
                }
            },
            REAL_TIME_STREAMING => {
                let b = *d.first()?;
                FeaturePayload::RealTimeStreaming {
                    rbcb: bit(b, 4),
                    scs: bit(b, 3),
                    mp2a: bit(b, 2),
                    wspd: bit(b, 1),
                    sw: bit(b, 0),
                }
            },
            _ => return None,
        })
    }
}

/// A single capability record.
///
/// Built only by [`parse_descriptors`]; fields are read-only to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    feature_code: u16,
    flags: FeatureFlags,
    version: u8,
    additional_length: u8,
    payload: FeaturePayload,
}

impl Feature {
    #[inline]
    pub fn feature_code(&self) -> u16 {
        self.feature_code
    }

    #[inline]
    pub fn current(&self) -> bool {
        self.flags.contains(FeatureFlags::CURRENT)
    }

    #[inline]
    pub fn persistent(&self) -> bool {
        self.flags.contains(FeatureFlags::PERSISTENT)
    }

    #[inline]
    pub fn version(&self) -> u8 {
        self.version
    }

    #[inline]
    pub fn additional_length(&self) -> u8 {
        self.additional_length
    }

    #[inline]
    pub fn payload(&self) -> &FeaturePayload {
        &self.payload
    }

    /// Total descriptor size on the wire.
    #[inline]
    pub fn wire_len(&self) -> usize {
        FEATURE_HEADER_LEN + self.additional_length as usize
    }
}

/// Outcome of parsing one chunk's descriptor area.
#[derive(Debug, Default)]
pub struct ParsedDescriptors {
    pub features: Vec<Feature>,
    /// `true` when the area ended in the middle of a descriptor because the
    /// transfer was smaller than what the drive had to offer.
    pub truncated: bool,
}

/// Parses consecutive feature descriptors from `area`.
///
/// `more_available` says whether the drive declared more bytes than `area`
/// holds. In that case a descriptor cut off at the end of `area` stops the
/// parse; otherwise it is a protocol violation.
pub fn parse_descriptors(area: &[u8], more_available: bool) -> EngineResult<ParsedDescriptors> {
    let mut out = ParsedDescriptors::default();
    let mut off = 0usize;

    while off < area.len() {
        let rest = &area[off..];
        let fits = rest.len() >= FEATURE_HEADER_LEN
            && rest.len() >= FEATURE_HEADER_LEN + rest[3] as usize;
        if !fits {
            if more_available {
                out.truncated = true;
                break;
            }
            return Err(EngineError::protocol(format!(
                "feature descriptor at offset {off} overruns the declared data ({} bytes left)",
                rest.len()
            )));
        }

        let code = u16::from_be_bytes([rest[0], rest[1]]);
        let flags_byte = rest[2];
        let add_len = rest[3];
        let data = &rest[FEATURE_HEADER_LEN..FEATURE_HEADER_LEN + add_len as usize];

        out.features.push(Feature {
            feature_code: code,
            flags: FeatureFlags::from_bits_truncate(flags_byte),
            version: bits(flags_byte, 2, 0x0F),
            additional_length: add_len,
            payload: FeaturePayload::decode(code, data),
        });
        off += FEATURE_HEADER_LEN + add_len as usize;
    }

    Ok(out)
}

/// Human readable profile name (MMC-5 Table 89).
pub fn profile_name(profile: u16) -> &'static str {
    match profile {
        0x0000 => "No current profile",
        0x0001 => "Non-removable disk",
        0x0002 => "Removable disk",
        0x0008 => "CD-ROM",
        0x0009 => "CD-R",
        0x000A => "CD-RW",
        0x0010 => "DVD-ROM",
        0x0011 => "DVD-R sequential recording",
        0x0012 => "DVD-RAM",
        0x0013 => "DVD-RW restricted overwrite",
        0x0014 => "DVD-RW sequential recording",
        0x0015 => "DVD-R dual layer sequential recording",
        0x0016 => "DVD-R dual layer jump recording",
        0x001A => "DVD+RW",
        0x001B => "DVD+R",
        0x002A => "DVD+RW dual layer",
        0x002B => "DVD+R dual layer",
        0x0040 => "BD-ROM",
        0x0041 => "BD-R sequential recording",
        0x0042 => "BD-R random recording",
        0x0043 => "BD-RE",
        0x0050 => "HD DVD-ROM",
        0x0051 => "HD DVD-R",
        0x0052 => "HD DVD-RAM",
        0xFFFF => "Non-conforming",
        _ => "Unknown",
    }
}
