// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Track level commands: READ TRACK INFORMATION (0x52), RESERVE TRACK
//! (0x53), REPAIR TRACK (0x58). All 10-byte CDBs.

use crate::{
    control_block::{CDB_MAX_LEN, CdbEncoder, DataDirection, TransferLength, check_max, opcode},
    error::EngineResult,
    utils::{field, flag, put_u16, put_u32},
};

/// Track information block as defined by MMC-5.
pub const TRACK_INFORMATION_LEN: u16 = 48;

/// ADDRESS/NUMBER TYPE of READ TRACK INFORMATION.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackAddressType {
    Lba = 0x00,
    LogicalTrackNumber = 0x01,
    SessionNumber = 0x02,
}

impl From<TrackAddressType> for u8 {
    #[inline]
    fn from(t: TrackAddressType) -> u8 {
        t as u8
    }
}

/// READ TRACK INFORMATION:
///   [1] OPEN(2) | ADDRESS/NUMBER TYPE(1..0)
///   [2..6] LBA / TRACK / SESSION NUMBER
///   [7..9] ALLOCATION LENGTH
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadTrackInformation {
    pub open: bool,
    pub address_type: u8,
    pub address: u32,
    pub allocation_length: u16,
}

impl ReadTrackInformation {
    pub fn track(number: u32) -> Self {
        Self {
            open: false,
            address_type: TrackAddressType::LogicalTrackNumber.into(),
            address: number,
            allocation_length: TRACK_INFORMATION_LEN,
        }
    }
}

impl CdbEncoder for ReadTrackInformation {
    fn opcode(&self) -> u8 {
        opcode::READ_TRACK_INFORMATION
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        check_max("address/number type", self.address_type.into(), 0x02)?;
        cdb[0] = opcode::READ_TRACK_INFORMATION;
        cdb[1] = flag(self.open, 2) | field(self.address_type, 0, 0x03);
        put_u32(cdb, 2, self.address);
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

/// How RESERVE TRACK sizes the reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// ARSV=0: RESERVATION SIZE in blocks at bytes 5..9.
    Size(u32),
    /// ARSV=1: RESERVATION LBA at bytes 2..6.
    Lba(u32),
}

/// RESERVE TRACK:
///   [1] RMZ(1) | ARSV(0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReserveTrack {
    pub rmz: bool,
    pub reservation: Reservation,
}

impl CdbEncoder for ReserveTrack {
    fn opcode(&self) -> u8 {
        opcode::RESERVE_TRACK
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        cdb[0] = opcode::RESERVE_TRACK;
        match self.reservation {
            Reservation::Size(size) => {
                cdb[1] = flag(self.rmz, 1);
                put_u32(cdb, 5, size);
            },
            Reservation::Lba(lba) => {
                cdb[1] = flag(self.rmz, 1) | flag(true, 0);
                put_u32(cdb, 2, lba);
            },
        }
        Ok(10)
    }
}

/// REPAIR TRACK:
///   [1] IMMED(0)
///   [4..6] LOGICAL TRACK NUMBER
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairTrack {
    pub immed: bool,
    pub track_number: u16,
}

impl CdbEncoder for RepairTrack {
    fn opcode(&self) -> u8 {
        opcode::REPAIR_TRACK
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        cdb[0] = opcode::REPAIR_TRACK;
        cdb[1] = flag(self.immed, 0);
        put_u16(cdb, 4, self.track_number);
        Ok(10)
    }
}
