// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! GET PERFORMANCE response: an 8-byte header
//!   [0..4] PERFORMANCE DATA LENGTH
//!   [4]    WRITE(1) | EXCEPT(0)   (type 0 only)
//! and a run of fixed-size descriptors whose layout is selected by TYPE.

use crate::{
    control_block::{
        opcode,
        performance::{PERFORMANCE_HEADER_LEN, performance_descriptor_len, performance_type},
    },
    error::{EngineError, EngineResult},
    response::ResponseHeader,
    utils::{bit, bits, get_u16, get_u32},
};

/// Type 0 nominal descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NominalPerformance {
    pub start_lba: u32,
    pub start_performance: u32,
    pub end_lba: u32,
    pub end_performance: u32,
}

/// Type 0, EXCEPT = 10b.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceException {
    pub lba: u32,
    /// Expected additional delay, in tenths of milliseconds.
    pub time: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnusableArea {
    pub lba: u32,
    pub upb_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefectStatus {
    pub start_lba: u32,
    pub end_lba: u32,
    pub blocking_factor: u8,
    pub first_bit_offset: u8,
    pub statuses: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSpeed {
    pub wrc: u8,
    pub rdd: bool,
    pub exact: bool,
    pub mrw: bool,
    pub end_lba: u32,
    pub read_speed: u32,
    pub write_speed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbiEntry {
    pub start_lba: u32,
    pub blocks: u16,
    pub dbif: bool,
    pub error_level: u8,
}

/// Descriptor run, one variant per TYPE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PerformanceDescriptors {
    Nominal(Vec<NominalPerformance>),
    Exceptions(Vec<PerformanceException>),
    UnusableArea(Vec<UnusableArea>),
    DefectStatus(Vec<DefectStatus>),
    WriteSpeed(Vec<WriteSpeed>),
    Dbi(Vec<DbiEntry>),
    DbiCacheZone(Vec<u32>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformanceResponse {
    pub header: ResponseHeader,
    pub kind: u8,
    pub data_length: u32,
    pub write: bool,
    pub except: bool,
    pub descriptors: PerformanceDescriptors,
}

impl PerformanceResponse {
    /// Parses the data of a GET PERFORMANCE issued with `kind` and
    /// `data_type`. Trailing bytes shorter than one descriptor are ignored.
    pub fn parse(buf: &[u8], kind: u8, data_type: u8) -> EngineResult<Self> {
        let data_length = get_u32(buf, 0).ok_or_else(|| {
            EngineError::protocol(format!(
                "performance header needs {PERFORMANCE_HEADER_LEN} bytes, got {}",
                buf.len()
            ))
        })?;
        let flags = buf.get(4).copied().unwrap_or(0);
        let end = (data_length as usize).saturating_add(4).min(buf.len());
        let body = buf.get(PERFORMANCE_HEADER_LEN..end).unwrap_or_default();
        let chunks = body.chunks_exact(performance_descriptor_len(kind, data_type));

        let descriptors = match kind {
            performance_type::PERFORMANCE if data_type & 0x03 == 0x02 => {
                PerformanceDescriptors::Exceptions(
                    chunks
                        .map(|d| PerformanceException {
                            lba: be32(d, 0),
                            time: get_u16(d, 4).unwrap_or(0),
                        })
                        .collect(),
                )
            },
            performance_type::PERFORMANCE => PerformanceDescriptors::Nominal(
                chunks
                    .map(|d| NominalPerformance {
                        start_lba: be32(d, 0),
                        start_performance: be32(d, 4),
                        end_lba: be32(d, 8),
                        end_performance: be32(d, 12),
                    })
                    .collect(),
            ),
            performance_type::UNUSABLE_AREA => PerformanceDescriptors::UnusableArea(
                chunks
                    .map(|d| UnusableArea {
                        lba: be32(d, 0),
                        upb_count: be32(d, 4),
                    })
                    .collect(),
            ),
            performance_type::DEFECT_STATUS => PerformanceDescriptors::DefectStatus(
                chunks
                    .map(|d| DefectStatus {
                        start_lba: be32(d, 0),
                        end_lba: be32(d, 4),
                        blocking_factor: d[8],
                        first_bit_offset: bits(d[9], 0, 0x07),
                        statuses: d[10..].to_vec(),
                    })
                    .collect(),
            ),
            performance_type::WRITE_SPEED => PerformanceDescriptors::WriteSpeed(
                chunks
                    .map(|d| WriteSpeed {
                        wrc: bits(d[0], 3, 0x03),
                        rdd: bit(d[0], 2),
                        exact: bit(d[0], 1),
                        mrw: bit(d[0], 0),
                        end_lba: be32(d, 4),
                        read_speed: be32(d, 8),
                        write_speed: be32(d, 12),
                    })
                    .collect(),
            ),
            performance_type::DBI => PerformanceDescriptors::Dbi(
                chunks
                    .map(|d| DbiEntry {
                        start_lba: be32(d, 0),
                        blocks: get_u16(d, 4).unwrap_or(0),
                        dbif: bit(d[7], 3),
                        error_level: bits(d[7], 0, 0x07),
                    })
                    .collect(),
            ),
            performance_type::DBI_CACHE_ZONE => {
                PerformanceDescriptors::DbiCacheZone(chunks.map(|d| be32(d, 0)).collect())
            },
            other => {
                return Err(EngineError::invalid(format!(
                    "unknown performance type {other:#04x}"
                )));
            },
        };

        Ok(Self {
            header: ResponseHeader::new(opcode::GET_PERFORMANCE),
            kind,
            data_length,
            write: bit(flags, 1),
            except: bit(flags, 0),
            descriptors,
        })
    }
}

/// Descriptor sizes are fixed per type, so offsets are always in range.
#[inline]
fn be32(d: &[u8], off: usize) -> u32 {
    get_u32(d, off).unwrap_or(0)
}
