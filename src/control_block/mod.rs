// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! MMC-5 command encoders.
//!
//! Every operation is a plain struct implementing [`CdbEncoder`]; [`Command`]
//! closes the set. Encoding writes into a zeroed 16-byte array and returns
//! the used length (6, 10 or 12). Multi-byte fields are big-endian; flags
//! sit at the bit positions fixed by MMC-5 for each opcode.

use std::{borrow::Cow, fmt};

use enum_dispatch::enum_dispatch;

use crate::error::{EngineError, EngineResult};

pub mod blank;
pub mod buffer;
pub mod disc_structure;
pub mod event_status;
pub mod format_unit;
pub mod get_configuration;
pub mod inquiry;
pub mod medium;
pub mod mod_sense;
pub mod performance;
pub mod read;
pub mod read_capacity;
pub mod request_sense;
pub mod serial_number;
pub mod test_unit_ready;
pub mod track;
pub mod write;

use blank::{Blank, CloseTrackSession};
use buffer::{ReadBuffer, ReadBufferCapacity, WriteBuffer};
use disc_structure::{SendDiscStructure, SendOpcInformation};
use event_status::GetEventStatus;
use format_unit::FormatUnit;
use get_configuration::GetConfiguration;
use inquiry::Inquiry;
use medium::{LoadUnloadMedium, MechanismStatus, PreventAllowRemoval, StartStopUnit};
use mod_sense::{ModeSelect10, ModeSense10};
use performance::{GetPerformance, SetCdSpeed, SetReadAhead, SetStreaming};
use read::{Read10, Read12, ReadCd, Seek, Verify10};
use read_capacity::ReadCapacity;
use request_sense::RequestSense;
use serial_number::ReadMediaSerialNumber;
use test_unit_ready::TestUnitReady;
use track::{ReadTrackInformation, RepairTrack, ReserveTrack};
use write::{SynchronizeCache, Write10, Write12, WriteAndVerify10};

pub const CDB_MAX_LEN: usize = 16;

/// Operation codes (MMC-5 Table 5 plus the SPC commands MMC drives honor).
pub mod opcode {
    pub const TEST_UNIT_READY: u8 = 0x00;
    pub const REQUEST_SENSE: u8 = 0x03;
    pub const FORMAT_UNIT: u8 = 0x04;
    pub const INQUIRY: u8 = 0x12;
    pub const START_STOP_UNIT: u8 = 0x1B;
    pub const PREVENT_ALLOW_MEDIUM_REMOVAL: u8 = 0x1E;
    pub const READ_CAPACITY: u8 = 0x25;
    pub const READ_10: u8 = 0x28;
    pub const WRITE_10: u8 = 0x2A;
    pub const SEEK_10: u8 = 0x2B;
    pub const WRITE_AND_VERIFY_10: u8 = 0x2E;
    pub const VERIFY_10: u8 = 0x2F;
    pub const SYNCHRONIZE_CACHE: u8 = 0x35;
    pub const WRITE_BUFFER: u8 = 0x3B;
    pub const READ_BUFFER: u8 = 0x3C;
    pub const GET_CONFIGURATION: u8 = 0x46;
    pub const GET_EVENT_STATUS_NOTIFICATION: u8 = 0x4A;
    pub const READ_TRACK_INFORMATION: u8 = 0x52;
    pub const RESERVE_TRACK: u8 = 0x53;
    pub const SEND_OPC_INFORMATION: u8 = 0x54;
    pub const MODE_SELECT_10: u8 = 0x55;
    pub const REPAIR_TRACK: u8 = 0x58;
    pub const MODE_SENSE_10: u8 = 0x5A;
    pub const CLOSE_TRACK_SESSION: u8 = 0x5B;
    pub const READ_BUFFER_CAPACITY: u8 = 0x5C;
    pub const BLANK: u8 = 0xA1;
    pub const LOAD_UNLOAD_MEDIUM: u8 = 0xA6;
    pub const SET_READ_AHEAD: u8 = 0xA7;
    pub const READ_12: u8 = 0xA8;
    pub const WRITE_12: u8 = 0xAA;
    pub const READ_MEDIA_SERIAL_NUMBER: u8 = 0xAB;
    pub const GET_PERFORMANCE: u8 = 0xAC;
    pub const SET_STREAMING: u8 = 0xB6;
    pub const SET_CD_SPEED: u8 = 0xBB;
    pub const MECHANISM_STATUS: u8 = 0xBD;
    pub const READ_CD: u8 = 0xBE;
    pub const SEND_DISC_STRUCTURE: u8 = 0xBF;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataDirection {
    None,
    In,
    Out,
}

/// Size of the data phase as the command declares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferLength {
    Bytes(usize),
    /// Logical blocks; the engine multiplies by the configured block length.
    Blocks(u32),
}

impl TransferLength {
    pub fn bytes(self, block_length: u32) -> usize {
        match self {
            TransferLength::Bytes(n) => n,
            TransferLength::Blocks(n) => n as usize * block_length as usize,
        }
    }
}

#[enum_dispatch]
pub trait CdbEncoder {
    fn opcode(&self) -> u8;

    /// Writes the CDB into `cdb` (already zeroed) and returns its length.
    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize>;

    fn direction(&self) -> DataDirection {
        DataDirection::None
    }

    fn transfer_length(&self) -> TransferLength {
        TransferLength::Bytes(0)
    }

    /// Data-out payload.
    fn parameter_list(&self) -> EngineResult<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(&[]))
    }
}

/// Every supported operation.
#[enum_dispatch(CdbEncoder)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Blank(Blank),
    CloseTrackSession(CloseTrackSession),
    FormatUnit(FormatUnit),
    GetConfiguration(GetConfiguration),
    GetEventStatus(GetEventStatus),
    GetPerformance(GetPerformance),
    Inquiry(Inquiry),
    LoadUnloadMedium(LoadUnloadMedium),
    MechanismStatus(MechanismStatus),
    ModeSense10(ModeSense10),
    ModeSelect10(ModeSelect10),
    PreventAllowRemoval(PreventAllowRemoval),
    Read10(Read10),
    Read12(Read12),
    ReadBuffer(ReadBuffer),
    ReadBufferCapacity(ReadBufferCapacity),
    ReadCapacity(ReadCapacity),
    ReadCd(ReadCd),
    ReadMediaSerialNumber(ReadMediaSerialNumber),
    ReadTrackInformation(ReadTrackInformation),
    RepairTrack(RepairTrack),
    RequestSense(RequestSense),
    ReserveTrack(ReserveTrack),
    Seek(Seek),
    SendDiscStructure(SendDiscStructure),
    SendOpcInformation(SendOpcInformation),
    SetCdSpeed(SetCdSpeed),
    SetReadAhead(SetReadAhead),
    SetStreaming(SetStreaming),
    StartStopUnit(StartStopUnit),
    SynchronizeCache(SynchronizeCache),
    TestUnitReady(TestUnitReady),
    Verify10(Verify10),
    Write10(Write10),
    Write12(Write12),
    WriteAndVerify10(WriteAndVerify10),
    WriteBuffer(WriteBuffer),
}

/// A CDB ready for the transport.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EncodedCdb {
    bytes: [u8; CDB_MAX_LEN],
    len: usize,
    direction: DataDirection,
}

impl EncodedCdb {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn opcode(&self) -> u8 {
        self.bytes[0]
    }

    #[inline]
    pub fn direction(&self) -> DataDirection {
        self.direction
    }

    #[inline]
    pub fn expects_data_in(&self) -> bool {
        self.direction == DataDirection::In
    }

    #[inline]
    pub fn expects_data_out(&self) -> bool {
        self.direction == DataDirection::Out
    }
}

impl fmt::Debug for EncodedCdb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedCdb")
            .field("cdb", &hex::encode(self.as_bytes()))
            .field("direction", &self.direction)
            .finish()
    }
}

/// Encodes `command` into a CDB. Pure: no I/O.
pub fn encode(command: &Command) -> EngineResult<EncodedCdb> {
    let mut bytes = [0u8; CDB_MAX_LEN];
    let len = command.encode_into(&mut bytes)?;
    Ok(EncodedCdb {
        bytes,
        len,
        direction: command.direction(),
    })
}

/// `InvalidArgument` unless `value <= max`.
pub(crate) fn check_max(field: &str, value: u32, max: u32) -> EngineResult<()> {
    if value > max {
        return Err(EngineError::invalid(format!(
            "{field} = {value:#x} exceeds {max:#x}"
        )));
    }
    Ok(())
}

/// `InvalidArgument` unless `value` is one of `allowed`.
pub(crate) fn check_one_of(field: &str, value: u8, allowed: &[u8]) -> EngineResult<()> {
    if !allowed.contains(&value) {
        return Err(EngineError::invalid(format!(
            "{field} = {value:#x} is not one of {allowed:02x?}"
        )));
    }
    Ok(())
}

/// Write payload must be exactly `blocks * block_length` bytes.
pub(crate) fn check_block_payload(
    blocks: u32,
    block_length: u32,
    payload: usize,
) -> EngineResult<()> {
    if blocks > 0 && block_length == 0 {
        return Err(EngineError::invalid("block length must be non-zero"));
    }
    let expected = blocks as usize * block_length as usize;
    if payload != expected {
        return Err(EngineError::invalid(format!(
            "payload of {payload} bytes does not match {blocks} blocks of {block_length} bytes"
        )));
    }
    Ok(())
}
