// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Speed and streaming control: GET PERFORMANCE (0xAC), SET STREAMING
//! (0xB6), SET CD SPEED (0xBB), SET READ AHEAD (0xA7). All 12-byte CDBs.

use std::borrow::Cow;

use crate::{
    control_block::{
        CDB_MAX_LEN, CdbEncoder, DataDirection, TransferLength, check_max, check_one_of, opcode,
    },
    error::EngineResult,
    utils::{field, flag, put_u16, put_u32},
};

/// GET PERFORMANCE TYPE field.
pub mod performance_type {
    pub const PERFORMANCE: u8 = 0x00;
    pub const UNUSABLE_AREA: u8 = 0x01;
    pub const DEFECT_STATUS: u8 = 0x02;
    pub const WRITE_SPEED: u8 = 0x03;
    pub const DBI: u8 = 0x04;
    pub const DBI_CACHE_ZONE: u8 = 0x05;
}

pub const PERFORMANCE_HEADER_LEN: usize = 8;

/// Descriptor size for a TYPE (and, for type 0, the EXCEPT bits of
/// DATA TYPE).
pub fn performance_descriptor_len(kind: u8, data_type: u8) -> usize {
    match kind {
        performance_type::PERFORMANCE if data_type & 0x03 == 0x02 => 6,
        performance_type::PERFORMANCE => 16,
        performance_type::DEFECT_STATUS => 2048,
        performance_type::WRITE_SPEED => 16,
        _ => 8,
    }
}

/// GET PERFORMANCE:
///   [1] DATA TYPE (4..0)
///   [2..6] STARTING LBA
///   [8..10] MAXIMUM NUMBER OF DESCRIPTORS
///   [10] TYPE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetPerformance {
    /// For TYPE 0: TOLERANCE(4..3) | WRITE(2) | EXCEPT(1..0).
    pub data_type: u8,
    pub start_lba: u32,
    pub max_descriptors: u16,
    pub kind: u8,
}

impl GetPerformance {
    /// Nominal read or write performance, tolerance 10%.
    pub fn nominal(write: bool, max_descriptors: u16) -> Self {
        Self {
            data_type: field(0x02, 3, 0x03) | flag(write, 2),
            start_lba: 0,
            max_descriptors,
            kind: performance_type::PERFORMANCE,
        }
    }

    pub fn write_speeds(max_descriptors: u16) -> Self {
        Self {
            data_type: 0,
            start_lba: 0,
            max_descriptors,
            kind: performance_type::WRITE_SPEED,
        }
    }
}

impl CdbEncoder for GetPerformance {
    fn opcode(&self) -> u8 {
        opcode::GET_PERFORMANCE
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        check_max("performance type", self.kind.into(), 0x05)?;
        check_max("data type", self.data_type.into(), 0x1F)?;
        cdb[0] = opcode::GET_PERFORMANCE;
        cdb[1] = self.data_type;
        put_u32(cdb, 2, self.start_lba);
        put_u16(cdb, 8, self.max_descriptors);
        cdb[10] = self.kind;
        Ok(12)
    }

    fn direction(&self) -> DataDirection {
        DataDirection::In
    }

    fn transfer_length(&self) -> TransferLength {
        TransferLength::Bytes(
            PERFORMANCE_HEADER_LEN
                + self.max_descriptors as usize
                    * performance_descriptor_len(self.kind, self.data_type),
        )
    }
}

/// SET CD SPEED:
///   [1] ROTATIONAL CONTROL (1..0)
///   [2..4] DRIVE READ SPEED (kB/s, 0xFFFF = maximum)
///   [4..6] DRIVE WRITE SPEED
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetCdSpeed {
    /// 0 = CLV and non-pure CAV, 1 = pure CAV.
    pub rotation_control: u8,
    pub read_speed: u16,
    pub write_speed: u16,
}

impl SetCdSpeed {
    pub const MAX_SPEED: u16 = 0xFFFF;
}

impl CdbEncoder for SetCdSpeed {
    fn opcode(&self) -> u8 {
        opcode::SET_CD_SPEED
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        check_max("rotational control", self.rotation_control.into(), 0x01)?;
        cdb[0] = opcode::SET_CD_SPEED;
        cdb[1] = field(self.rotation_control, 0, 0x03);
        put_u16(cdb, 2, self.read_speed);
        put_u16(cdb, 4, self.write_speed);
        Ok(12)
    }
}

/// SET READ AHEAD:
///   [2..6] TRIGGER LBA
///   [6..10] READ AHEAD LBA
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetReadAhead {
    pub trigger_lba: u32,
    pub read_ahead_lba: u32,
}

impl CdbEncoder for SetReadAhead {
    fn opcode(&self) -> u8 {
        opcode::SET_READ_AHEAD
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        cdb[0] = opcode::SET_READ_AHEAD;
        put_u32(cdb, 2, self.trigger_lba);
        put_u32(cdb, 6, self.read_ahead_lba);
        Ok(12)
    }
}

pub const PERFORMANCE_DESCRIPTOR_LEN: usize = 28;

/// Write rotation control values.
pub mod wrc {
    pub const DEFAULT: u8 = 0x00;
    pub const CAV: u8 = 0x01;
}

/// SET STREAMING performance descriptor (type 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerformanceDescriptor {
    pub wrc: u8,
    pub restore_drive_defaults: bool,
    pub exact: bool,
    pub random_access: bool,
    pub start_lba: u32,
    pub end_lba: u32,
    pub read_size: u32,
    pub read_time: u32,
    pub write_size: u32,
    pub write_time: u32,
}

impl PerformanceDescriptor {
    fn to_bytes(self) -> [u8; PERFORMANCE_DESCRIPTOR_LEN] {
        let mut d = [0u8; PERFORMANCE_DESCRIPTOR_LEN];
        d[0] = field(self.wrc, 3, 0x03)
            | flag(self.restore_drive_defaults, 2)
            | flag(self.exact, 1)
            | flag(self.random_access, 0);
        put_u32(&mut d, 4, self.start_lba);
        put_u32(&mut d, 8, self.end_lba);
        put_u32(&mut d, 12, self.read_size);
        put_u32(&mut d, 16, self.read_time);
        put_u32(&mut d, 20, self.write_size);
        put_u32(&mut d, 24, self.write_time);
        d
    }
}

/// SET STREAMING:
///   [8] TYPE (0 = performance descriptor)
///   [9..11] PARAMETER LIST LENGTH
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetStreaming {
    pub descriptor: PerformanceDescriptor,
}

impl CdbEncoder for SetStreaming {
    fn opcode(&self) -> u8 {
        opcode::SET_STREAMING
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        check_one_of("write rotation control", self.descriptor.wrc, &[wrc::DEFAULT, wrc::CAV])?;
        cdb[0] = opcode::SET_STREAMING;
        cdb[8] = performance_type::PERFORMANCE;
        put_u16(cdb, 9, PERFORMANCE_DESCRIPTOR_LEN as u16);
        Ok(12)
    }

    fn direction(&self) -> DataDirection {
        DataDirection::Out
    }

    fn transfer_length(&self) -> TransferLength {
        TransferLength::Bytes(PERFORMANCE_DESCRIPTOR_LEN)
    }

    fn parameter_list(&self) -> EngineResult<Cow<'_, [u8]>> {
        Ok(Cow::Owned(self.descriptor.to_bytes().to_vec()))
    }
}
