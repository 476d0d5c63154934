// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Collaborators the engine drives but does not implement: the raw SCSI
//! pass-through call and device discovery.
//!
//! Both are synchronous. The engine never overlaps two calls on one
//! transport, so implementations need no internal locking unless they share
//! a physical device between several transports.

use std::{fmt, time::Duration};

use crate::{
    error::EngineResult,
    models::{adapter::Adapter, device::DevicePath},
};

/// SAM status byte.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScsiStatus {
    Good,
    CheckCondition,
    ConditionMet,
    Busy,
    ReservationConflict,
    TaskSetFull,
    AcaActive,
    TaskAborted,
    /// Any other status codes defined in SAM-x or reserved
    Other(u8),
}

impl From<u8> for ScsiStatus {
    fn from(b: u8) -> Self {
        match b {
            0x00 => ScsiStatus::Good,
            0x02 => ScsiStatus::CheckCondition,
            0x04 => ScsiStatus::ConditionMet,
            0x08 => ScsiStatus::Busy,
            0x18 => ScsiStatus::ReservationConflict,
            0x28 => ScsiStatus::TaskSetFull,
            0x30 => ScsiStatus::AcaActive,
            0x40 => ScsiStatus::TaskAborted,
            other => ScsiStatus::Other(other),
        }
    }
}

impl From<ScsiStatus> for u8 {
    fn from(s: ScsiStatus) -> Self {
        match s {
            ScsiStatus::Good => 0x00,
            ScsiStatus::CheckCondition => 0x02,
            ScsiStatus::ConditionMet => 0x04,
            ScsiStatus::Busy => 0x08,
            ScsiStatus::ReservationConflict => 0x18,
            ScsiStatus::TaskSetFull => 0x28,
            ScsiStatus::AcaActive => 0x30,
            ScsiStatus::TaskAborted => 0x40,
            ScsiStatus::Other(b) => b,
        }
    }
}

impl ScsiStatus {
    #[inline]
    pub fn is_good(self) -> bool {
        matches!(self, ScsiStatus::Good | ScsiStatus::ConditionMet)
    }
}

impl fmt::Debug for ScsiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScsiStatus::Other(b) => write!(f, "Other({b:#04x})"),
            ScsiStatus::Good => f.write_str("Good"),
            ScsiStatus::CheckCondition => f.write_str("CheckCondition"),
            ScsiStatus::ConditionMet => f.write_str("ConditionMet"),
            ScsiStatus::Busy => f.write_str("Busy"),
            ScsiStatus::ReservationConflict => f.write_str("ReservationConflict"),
            ScsiStatus::TaskSetFull => f.write_str("TaskSetFull"),
            ScsiStatus::AcaActive => f.write_str("AcaActive"),
            ScsiStatus::TaskAborted => f.write_str("TaskAborted"),
        }
    }
}

/// Data phase of one pass-through call.
///
/// Buffers are already aligned to the adapter's mask; their length may
/// exceed the CDB allocation length by the alignment padding.
#[derive(Debug)]
pub enum DataTransfer<'a> {
    None,
    In(&'a mut [u8]),
    Out(&'a [u8]),
}

impl DataTransfer<'_> {
    pub fn len(&self) -> usize {
        match self {
            DataTransfer::None => 0,
            DataTransfer::In(b) => b.len(),
            DataTransfer::Out(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything a transport needs for one round-trip.
#[derive(Debug)]
pub struct ScsiRequest<'a> {
    pub path: &'a DevicePath,
    pub cdb: &'a [u8],
    pub data: DataTransfer<'a>,
    pub timeout: Duration,
    /// Sense bytes the engine wants captured.
    pub sense_len: usize,
}

/// The call reached the device and it returned a status.
///
/// `sense` holds whatever sense bytes were captured, even with GOOD status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub status: ScsiStatus,
    pub bytes_transferred: usize,
    pub sense: Vec<u8>,
}

impl Completion {
    pub fn good(bytes_transferred: usize) -> Self {
        Self {
            status: ScsiStatus::Good,
            bytes_transferred,
            sense: Vec::new(),
        }
    }

    pub fn check_condition(sense: Vec<u8>) -> Self {
        Self {
            status: ScsiStatus::CheckCondition,
            bytes_transferred: 0,
            sense,
        }
    }
}

/// The OS-level call itself failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub os_code: i32,
    pub bytes_transferred: usize,
    pub sense: Vec<u8>,
}

impl TransportFailure {
    pub fn os(os_code: i32) -> Self {
        Self {
            os_code,
            bytes_transferred: 0,
            sense: Vec::new(),
        }
    }
}

/// Synchronous SCSI pass-through.
pub trait ScsiTransport {
    fn execute(&mut self, request: ScsiRequest<'_>) -> Result<Completion, TransportFailure>;

    /// Transfer constraints of the adapter behind `path`.
    fn adapter_limits(&mut self, path: &DevicePath) -> EngineResult<Adapter>;
}

impl<T: ScsiTransport + ?Sized> ScsiTransport for &mut T {
    fn execute(&mut self, request: ScsiRequest<'_>) -> Result<Completion, TransportFailure> {
        (**self).execute(request)
    }

    fn adapter_limits(&mut self, path: &DevicePath) -> EngineResult<Adapter> {
        (**self).adapter_limits(path)
    }
}

/// Yields the paths of all present optical drives, in a stable order.
pub trait DeviceEnumerator {
    fn enumerate(&mut self) -> EngineResult<Vec<DevicePath>>;
}
