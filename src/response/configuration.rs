// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! GET CONFIGURATION response data.
//!
//! Every transfer starts with an 8-byte header:
//!   [0..4] DATA LENGTH (bytes that follow this field)
//!   [4..6] reserved
//!   [6..8] CURRENT PROFILE
//! followed by feature descriptors.

use zerocopy::{
    FromBytes, Immutable, KnownLayout,
    byteorder::{BigEndian, U16, U32},
};

use crate::{
    control_block::get_configuration::CONFIGURATION_HEADER_LEN,
    error::{EngineError, EngineResult},
    models::feature::{Feature, parse_descriptors},
    response::ResponseHeader,
};

/// Bytes of the header not counted by DATA LENGTH.
const DATA_LENGTH_FIELD_LEN: usize = 4;

#[repr(C)]
#[derive(FromBytes, KnownLayout, Immutable, Debug)]
pub struct ConfigurationHeader {
    pub data_length: U32<BigEndian>,
    reserved: [u8; 2],
    pub current_profile: U16<BigEndian>,
}

impl ConfigurationHeader {
    pub fn parse(buf: &[u8]) -> EngineResult<&Self> {
        let (hdr, _rest) = Self::ref_from_prefix(buf).map_err(|_| {
            EngineError::protocol(format!(
                "GET CONFIGURATION: need {CONFIGURATION_HEADER_LEN} header bytes, got {}",
                buf.len()
            ))
        })?;
        Ok(hdr)
    }
}

/// Decoded content of one transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationChunk {
    pub data_length: u32,
    pub current_profile: u16,
    pub features: Vec<Feature>,
    /// The last descriptor did not fit into this transfer.
    pub truncated: bool,
}

impl ConfigurationChunk {
    /// Parses one transfer.
    ///
    /// Descriptors are read up to what the header declares or what the
    /// buffer holds, whichever ends first. When the declaration exceeds the
    /// buffer a descriptor cut at the end is dropped; otherwise it is a
    /// protocol violation.
    pub fn parse(buf: &[u8]) -> EngineResult<Self> {
        let hdr = ConfigurationHeader::parse(buf)?;
        let data_length = hdr.data_length.get();
        let declared_end = (data_length as usize).saturating_add(DATA_LENGTH_FIELD_LEN);
        let more_available = declared_end > buf.len();
        let end = declared_end.min(buf.len());
        let start = CONFIGURATION_HEADER_LEN as usize;
        let area = if end > start { &buf[start..end] } else { &[][..] };

        let parsed = parse_descriptors(area, more_available)?;
        Ok(Self {
            data_length,
            current_profile: hdr.current_profile.get(),
            features: parsed.features,
            truncated: parsed.truncated,
        })
    }
}

/// Aggregated GET CONFIGURATION result: descriptors in arrival order and
/// the current profile reported by the final transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetConfigurationResponse {
    pub header: ResponseHeader,
    /// DATA LENGTH reported by the probe round.
    pub data_length: u32,
    pub current_profile: u16,
    pub features: Vec<Feature>,
}

impl GetConfigurationResponse {
    pub fn feature(&self, code: u16) -> Option<&Feature> {
        self.features.iter().rev().find(|f| f.feature_code() == code)
    }
}
