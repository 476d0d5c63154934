// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Standard INQUIRY data (EVPD=0).
//!
//! Layout (SPC):
//!   [0]      PERIPHERAL QUALIFIER(7..5) | DEVICE TYPE(4..0)
//!   [1]      RMB(7)
//!   [2]      VERSION
//!   [3]      NORMACA(5) | HISUP(4) | RESPONSE DATA FORMAT(3..0)
//!   [4]      ADDITIONAL LENGTH
//!   [5]      SCCS(7) | ACC(6) | TPGS(5..4) | 3PC(3) | PROTECT(0)
//!   [6]      ENCSERV(6) | VS(5) | MULTIP(4) | MCHNGR(3) | ADDR16(0)
//!   [7]      WBUS16(5) | SYNC(4) | LINKED(3) | CMDQUE(1) | VS(0)
//!   [8..16]  T10 VENDOR IDENTIFICATION
//!   [16..32] PRODUCT IDENTIFICATION
//!   [32..36] PRODUCT REVISION LEVEL
//!   [36..56] vendor specific
//!   [56]     CLOCKING(3..2) | QAS(1) | IUS(0)
//!   [58..74] VERSION DESCRIPTOR 1..8
//!
//! Drives are allowed to return less than the full block; every field past
//! the first five bytes is read from what is there and left empty/zero
//! otherwise.

use crate::{
    control_block::{inquiry::INQUIRY_PROBE_LEN, opcode},
    error::{EngineError, EngineResult},
    models::device::PeripheralDeviceType,
    response::ResponseHeader,
    utils::{bit, bits, clamp_slice, get_u16, get_u32, trim_ascii},
};

pub const VERSION_DESCRIPTOR_COUNT: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InquiryResponse {
    pub header: ResponseHeader,
    pub qualifier: u8,
    pub device_type: u8,
    pub rmb: bool,
    pub version: u8,
    pub normaca: bool,
    pub hisup: bool,
    pub response_data_format: u8,
    pub additional_length: u8,
    pub sccs: bool,
    pub acc: bool,
    pub tpgs: u8,
    pub third_party_copy: bool,
    pub protect: bool,
    pub encserv: bool,
    pub multip: bool,
    pub mchngr: bool,
    pub addr16: bool,
    pub wbus16: bool,
    pub sync: bool,
    pub linked: bool,
    pub cmdque: bool,
    pub vendor: String,
    pub product: String,
    pub revision: String,
    /// PRODUCT REVISION LEVEL as a big-endian number, 0 when cut short.
    pub revision_level: u32,
    pub vendor_string: String,
    pub clocking: u8,
    pub qas: bool,
    pub ius: bool,
    pub version_descriptors: [u16; VERSION_DESCRIPTOR_COUNT],
}

impl InquiryResponse {
    /// Total bytes the drive has, as the probe round computes it.
    pub fn required_length(probe: &[u8]) -> EngineResult<u16> {
        let additional = probe.get(4).copied().ok_or_else(|| {
            EngineError::protocol(format!(
                "INQUIRY probe returned {} bytes, need {INQUIRY_PROBE_LEN}",
                probe.len()
            ))
        })?;
        Ok(u16::from(additional) + 4)
    }

    pub fn parse(buf: &[u8]) -> EngineResult<Self> {
        if buf.len() < INQUIRY_PROBE_LEN as usize {
            return Err(EngineError::protocol(format!(
                "INQUIRY data too short: {} bytes",
                buf.len()
            )));
        }
        let byte = |i: usize| buf.get(i).copied().unwrap_or(0);
        let (b0, b1, b3, b5, b6, b7) = (buf[0], buf[1], buf[3], byte(5), byte(6), byte(7));

        let mut version_descriptors = [0u16; VERSION_DESCRIPTOR_COUNT];
        for (i, d) in version_descriptors.iter_mut().enumerate() {
            *d = get_u16(buf, 58 + 2 * i).unwrap_or(0);
        }

        Ok(Self {
            header: ResponseHeader::new(opcode::INQUIRY),
            qualifier: bits(b0, 5, 0x07),
            device_type: bits(b0, 0, 0x1F),
            rmb: bit(b1, 7),
            version: buf[2],
            normaca: bit(b3, 5),
            hisup: bit(b3, 4),
            response_data_format: bits(b3, 0, 0x0F),
            additional_length: buf[4],
            sccs: bit(b5, 7),
            acc: bit(b5, 6),
            tpgs: bits(b5, 4, 0x03),
            third_party_copy: bit(b5, 3),
            protect: bit(b5, 0),
            encserv: bit(b6, 6),
            multip: bit(b6, 4),
            mchngr: bit(b6, 3),
            addr16: bit(b6, 0),
            wbus16: bit(b7, 5),
            sync: bit(b7, 4),
            linked: bit(b7, 3),
            cmdque: bit(b7, 1),
            vendor: trim_ascii(clamp_slice(buf, 8, 16)),
            product: trim_ascii(clamp_slice(buf, 16, 32)),
            revision: trim_ascii(clamp_slice(buf, 32, 36)),
            revision_level: get_u32(buf, 32).unwrap_or(0),
            vendor_string: trim_ascii(clamp_slice(buf, 36, 56)),
            clocking: bits(byte(56), 2, 0x03),
            qas: bit(byte(56), 1),
            ius: bit(byte(56), 0),
            version_descriptors,
        })
    }

    pub fn peripheral_type(&self) -> PeripheralDeviceType {
        PeripheralDeviceType::new(self.device_type)
    }
}
