// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    models::{
        adapter::Adapter,
        feature::{Feature, profile_name},
    },
    response::{GetConfigurationResponse, InquiryResponse},
};

/// Opaque identifier the transport understands (a device node, a
/// `\\.\CdRom0`-style name, a bus address...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DevicePath(String);

impl DevicePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DevicePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DevicePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// PERIPHERAL DEVICE TYPE, byte 0 bits 4..0 of standard INQUIRY data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeripheralDeviceType(u8);

impl PeripheralDeviceType {
    pub const DIRECT_ACCESS: Self = Self(0x00);
    pub const WORM: Self = Self(0x04);
    pub const MMC: Self = Self(0x05);
    pub const OPTICAL_MEMORY: Self = Self(0x07);
    pub const UNKNOWN: Self = Self(0x1F);

    pub const fn new(raw: u8) -> Self {
        Self(raw & 0x1F)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        match self.0 {
            0x00 => "Direct-access block (disk)",
            0x01 => "Sequential-access (tape)",
            0x02 => "Printer (obsolete)",
            0x03 => "Processor",
            0x04 => "WORM",
            0x05 => "CD/DVD",
            0x06 => "Scanner (obsolete)",
            0x07 => "Optical memory",
            0x08 => "Medium changer",
            0x09 => "Communications",
            0x0C => "Storage array controller",
            0x0D => "Enclosure services",
            0x0E => "RBC",
            0x0F => "Optical card",
            0x11 => "Object-based storage",
            0x12 => "Automation/Drive interface",
            0x1E => "Well-known LU",
            0x1F => "Unknown/No device",
            _ => "Reserved",
        }
    }
}

impl Default for PeripheralDeviceType {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

/// Identity and capabilities of one optical drive.
///
/// Identity comes from INQUIRY; the feature map from GET CONFIGURATION.
/// The map holds at most one entry per feature code.
#[derive(Clone, PartialEq, Eq)]
pub struct Device {
    path: DevicePath,
    adapter: Adapter,
    device_type: PeripheralDeviceType,
    vendor: String,
    product: String,
    vendor_string: String,
    revision: String,
    current_profile: u16,
    features: BTreeMap<u16, Feature>,
}

impl Device {
    pub fn new(path: DevicePath, adapter: Adapter) -> Self {
        Self {
            path,
            adapter,
            device_type: PeripheralDeviceType::default(),
            vendor: String::new(),
            product: String::new(),
            vendor_string: String::new(),
            revision: String::new(),
            current_profile: 0,
            features: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &DevicePath {
        &self.path
    }

    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    pub fn device_type(&self) -> PeripheralDeviceType {
        self.device_type
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn vendor_string(&self) -> &str {
        &self.vendor_string
    }

    pub fn revision(&self) -> &str {
        &self.revision
    }

    pub fn current_profile(&self) -> u16 {
        self.current_profile
    }

    pub fn features(&self) -> &BTreeMap<u16, Feature> {
        &self.features
    }

    pub fn feature(&self, code: u16) -> Option<&Feature> {
        self.features.get(&code)
    }

    pub fn has_feature(&self, code: u16) -> bool {
        self.features.contains_key(&code)
    }

    /// Copies identity fields out of standard INQUIRY data.
    pub fn apply_inquiry(&mut self, inquiry: &InquiryResponse) {
        self.device_type = PeripheralDeviceType::new(inquiry.device_type);
        self.vendor.clone_from(&inquiry.vendor);
        self.product.clone_from(&inquiry.product);
        self.vendor_string.clone_from(&inquiry.vendor_string);
        self.revision.clone_from(&inquiry.revision);
    }

    /// Inserts every descriptor in arrival order, overwriting entries with
    /// the same feature code. Applying the same response twice leaves the
    /// map as applying it once.
    pub fn ingest_configuration(&mut self, config: &GetConfigurationResponse) {
        for feature in &config.features {
            self.features.insert(feature.feature_code(), feature.clone());
        }
        self.current_profile = config.current_profile;
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("path", &self.path)
            .field("adapter", &self.adapter)
            .field("device_type", &self.device_type.name())
            .field("vendor", &self.vendor)
            .field("product", &self.product)
            .field("revision", &self.revision)
            .field(
                "current_profile",
                &format_args!(
                    "{:#06x} ({})",
                    self.current_profile,
                    profile_name(self.current_profile)
                ),
            )
            .field("features", &self.features.keys().collect::<Vec<_>>())
            .finish()
    }
}
