// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::models::sense::FIXED_MIN_LEN;

/// Largest GET CONFIGURATION transfer the engine asks for in one round.
pub const DEFAULT_MAX_GET_CONFIG_TRANSFER: u32 = 65530;

/// Bytes per logical block when neither the command nor the file says.
pub const DEFAULT_BLOCK_LENGTH: u32 = 2048;

/// Layout of a configuration file: the engine reads the `engine` section and
/// ignores the rest (the `logger` section is read by
/// [`init_logger`](crate::cfg::logger::init_logger)).
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
struct ConfigFile {
    #[serde(default)]
    engine: EngineConfig,
}

/// Tunables of [`MmcEngine`](crate::engine::MmcEngine).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    #[serde(rename = "CommandTimeout", with = "serde_secs")]
    /// Timeout handed to the transport for every round.
    pub command_timeout: Duration,

    #[serde(rename = "MaxGetConfigTransfer")]
    /// Protocol chunk cap for GET CONFIGURATION; the adapter limit may lower
    /// it further.
    pub max_get_config_transfer: u32,

    #[serde(rename = "SenseBufferLength")]
    /// Sense bytes the transport is asked to capture.
    pub sense_buffer_length: usize,

    #[serde(rename = "RequestSenseLength")]
    /// Allocation length of REQUEST SENSE.
    pub request_sense_length: u8,

    #[serde(rename = "DefaultBlockLength")]
    /// Bytes per logical block for commands sized in blocks.
    pub default_block_length: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(30),
            max_get_config_transfer: DEFAULT_MAX_GET_CONFIG_TRANSFER,
            sense_buffer_length: 32,
            request_sense_length: 252,
            default_block_length: DEFAULT_BLOCK_LENGTH,
        }
    }
}

impl EngineConfig {
    /// Loads the `engine` section from YAML, validates it, and returns the
    /// ready-to-use value. A missing section yields the defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {path:?}"))?;
        let file: ConfigFile =
            serde_yaml::from_str(&s).context("failed to parse config YAML")?;
        let mut cfg = file.engine;
        cfg.validate_and_normalize()?;
        Ok(cfg)
    }

    /// Validates invariants and normalizes derived fields.
    pub fn validate_and_normalize(&mut self) -> Result<()> {
        ensure!(
            (8..=DEFAULT_MAX_GET_CONFIG_TRANSFER).contains(&self.max_get_config_transfer),
            "MaxGetConfigTransfer must be within 8..={DEFAULT_MAX_GET_CONFIG_TRANSFER}, got {}",
            self.max_get_config_transfer
        );
        ensure!(
            self.sense_buffer_length >= FIXED_MIN_LEN,
            "SenseBufferLength must be >= {FIXED_MIN_LEN}"
        );
        ensure!(self.default_block_length > 0, "DefaultBlockLength must be > 0");
        ensure!(
            !self.command_timeout.is_zero(),
            "CommandTimeout must be at least one second"
        );

        // A fixed-format block never fits below 18 bytes.
        if usize::from(self.request_sense_length) < FIXED_MIN_LEN {
            self.request_sense_length = FIXED_MIN_LEN as u8;
        }

        Ok(())
    }
}

/// Serde helpers for representing `Duration` as a number of seconds.
mod serde_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(d)?;
        Ok(Duration::from_secs(secs))
    }
}
