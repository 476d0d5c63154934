// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Bus through which the host adapter reaches the drive.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusType {
    Unknown,
    Scsi,
    Atapi,
    Ata,
    Ieee1394,
    Ssa,
    Fibre,
    Usb,
    Raid,
    Iscsi,
    Sas,
    Sata,
    Sd,
    Mmc,
    Virtual,
    FileBackedVirtual,
    Other(u8),
}

impl From<u8> for BusType {
    fn from(value: u8) -> Self {
        match value {
            0x00 => BusType::Unknown,
            0x01 => BusType::Scsi,
            0x02 => BusType::Atapi,
            0x03 => BusType::Ata,
            0x04 => BusType::Ieee1394,
            0x05 => BusType::Ssa,
            0x06 => BusType::Fibre,
            0x07 => BusType::Usb,
            0x08 => BusType::Raid,
            0x09 => BusType::Iscsi,
            0x0A => BusType::Sas,
            0x0B => BusType::Sata,
            0x0C => BusType::Sd,
            0x0D => BusType::Mmc,
            0x0E => BusType::Virtual,
            0x0F => BusType::FileBackedVirtual,
            other => BusType::Other(other),
        }
    }
}

impl From<BusType> for u8 {
    fn from(value: BusType) -> Self {
        match value {
            BusType::Unknown => 0x00,
            BusType::Scsi => 0x01,
            BusType::Atapi => 0x02,
            BusType::Ata => 0x03,
            BusType::Ieee1394 => 0x04,
            BusType::Ssa => 0x05,
            BusType::Fibre => 0x06,
            BusType::Usb => 0x07,
            BusType::Raid => 0x08,
            BusType::Iscsi => 0x09,
            BusType::Sas => 0x0A,
            BusType::Sata => 0x0B,
            BusType::Sd => 0x0C,
            BusType::Mmc => 0x0D,
            BusType::Virtual => 0x0E,
            BusType::FileBackedVirtual => 0x0F,
            BusType::Other(v) => v,
        }
    }
}

impl fmt::Debug for BusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            BusType::Other(v) => write!(f, "Other({v:#04x})"),
            other => write!(f, "{}", other.name()),
        }
    }
}

impl BusType {
    fn name(self) -> &'static str {
        match self {
            BusType::Unknown => "Unknown",
            BusType::Scsi => "SCSI",
            BusType::Atapi => "ATAPI",
            BusType::Ata => "ATA",
            BusType::Ieee1394 => "IEEE1394",
            BusType::Ssa => "SSA",
            BusType::Fibre => "Fibre",
            BusType::Usb => "USB",
            BusType::Raid => "RAID",
            BusType::Iscsi => "iSCSI",
            BusType::Sas => "SAS",
            BusType::Sata => "SATA",
            BusType::Sd => "SD",
            BusType::Mmc => "MMC",
            BusType::Virtual => "Virtual",
            BusType::FileBackedVirtual => "FileBackedVirtual",
            BusType::Other(_) => "Other",
        }
    }
}

/// Transfer constraints of the host bus adapter a drive sits behind.
///
/// Immutable once built; the transport reports it and the [`Device`] keeps a
/// copy.
///
/// [`Device`]: crate::models::device::Device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adapter {
    bus_type: BusType,
    alignment_mask: u32,
    max_physical_pages: u32,
    max_transfer_length: u32,
}

impl Adapter {
    /// `alignment_mask` must have the form `2^n - 1` (0 = byte aligned).
    pub fn new(
        bus_type: BusType,
        alignment_mask: u32,
        max_physical_pages: u32,
        max_transfer_length: u32,
    ) -> EngineResult<Self> {
        if alignment_mask.checked_add(1).is_none_or(|a| !a.is_power_of_two()) {
            return Err(EngineError::invalid(format!(
                "alignment mask {alignment_mask:#x} is not of the form 2^n-1"
            )));
        }
        Ok(Self {
            bus_type,
            alignment_mask,
            max_physical_pages,
            max_transfer_length,
        })
    }

    #[inline]
    pub fn bus_type(&self) -> BusType {
        self.bus_type
    }

    #[inline]
    pub fn alignment_mask(&self) -> u32 {
        self.alignment_mask
    }

    #[inline]
    pub fn max_physical_pages(&self) -> u32 {
        self.max_physical_pages
    }

    #[inline]
    pub fn max_transfer_length(&self) -> u32 {
        self.max_transfer_length
    }

    /// Largest single transfer for a command whose own protocol limit is
    /// `protocol_max`.
    #[inline]
    pub fn chunk_cap(&self, protocol_max: u32) -> u32 {
        self.max_transfer_length.min(protocol_max)
    }
}
