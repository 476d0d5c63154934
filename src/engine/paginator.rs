// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! GET CONFIGURATION retrieval in bounded chunks.
//!
//! The probe round asks for the 8-byte header and reads DATA LENGTH. Chunk
//! rounds then ask for `min(remaining, cap)` bytes each, where `cap` is the
//! smaller of the adapter limit and `MaxGetConfigTransfer`. `remaining`
//! drops by `cap` per chunk, so a length of `L` takes `ceil(L / cap)`
//! chunks. The first chunk keeps the caller's RT; later ones use FROM with
//! the start code one past the last complete descriptor.
//!
//! Descriptors are collected in a local vector. A failing round drops it
//! and nothing reaches the [`Device`]; [`MmcEngine::load_features`] commits
//! only a complete response.

use tracing::{debug, warn};

use crate::{
    control_block::{
        Command, opcode,
        get_configuration::{CONFIGURATION_HEADER_LEN, GetConfiguration, RequestType},
    },
    engine::MmcEngine,
    error::{EngineError, EngineResult},
    models::device::Device,
    response::{ConfigurationChunk, ConfigurationHeader, GetConfigurationResponse, ResponseHeader},
    transport::ScsiTransport,
};

impl<T: ScsiTransport> MmcEngine<T> {
    /// Every descriptor from `start_feature` on, as the drive reports them
    /// for `rt`.
    pub fn get_configuration(
        &mut self,
        device: &Device,
        rt: RequestType,
        start_feature: u16,
    ) -> EngineResult<GetConfigurationResponse> {
        self.scoped(|engine| engine.paginate_configuration(device, rt, start_feature))
    }

    /// Reads the full feature set (RT = ALL from feature 0) and ingests it
    /// into `device`. On error `device` is left untouched.
    pub fn load_features(&mut self, device: &mut Device) -> EngineResult<()> {
        let config = self.get_configuration(device, RequestType::All, 0)?;
        device.ingest_configuration(&config);
        Ok(())
    }

    pub(crate) fn paginate_configuration(
        &mut self,
        device: &Device,
        rt: RequestType,
        start_feature: u16,
    ) -> EngineResult<GetConfigurationResponse> {
        let header_len = u32::from(CONFIGURATION_HEADER_LEN);
        let cap = device
            .adapter()
            .chunk_cap(self.config.max_get_config_transfer)
            .min(u32::from(u16::MAX));
        if cap < header_len {
            return Err(EngineError::invalid(format!(
                "adapter transfer limit of {cap} bytes cannot hold the configuration header"
            )));
        }

        let probe = GetConfiguration::new(rt, start_feature)
            .with_allocation_length(CONFIGURATION_HEADER_LEN);
        let (data_length, mut current_profile) = self.round(device, &probe.into(), |buf| {
            let hdr = ConfigurationHeader::parse(buf)?;
            Ok((hdr.data_length.get(), hdr.current_profile.get()))
        })?;
        debug!(data_length, cap, "GET CONFIGURATION probe");

        let mut features = Vec::new();
        let mut remaining = i64::from(data_length);
        let mut request = GetConfiguration::new(rt, start_feature);
        let mut chunks = 0u32;

        while remaining > 0 {
            // bounded by cap, which fits in u16; never below the header
            let transfer = remaining.min(i64::from(cap)).max(i64::from(header_len)) as u16;
            request = request.with_allocation_length(transfer);
            let chunk = self
                .round(device, &Command::from(request), ConfigurationChunk::parse)
                .inspect_err(|e| {
                    debug!(
                        chunk = chunks,
                        discarded = features.len(),
                        error = %e,
                        "GET CONFIGURATION chunk failed"
                    );
                })?;
            chunks += 1;
            remaining -= i64::from(cap);
            current_profile = chunk.current_profile;

            let Some(last) = chunk.features.last().map(|f| f.feature_code()) else {
                // a cut-off descriptor ends the last chunk; earlier it means
                // no chunk of this size can ever make progress
                if chunk.truncated && remaining > 0 {
                    return Err(EngineError::protocol(format!(
                        "GET CONFIGURATION chunk of {transfer} bytes at feature {:#06x} holds no complete descriptor",
                        request.start_feature
                    )));
                }
                debug!(chunk = chunks, truncated = chunk.truncated, "no complete descriptor in chunk");
                break;
            };
            features.extend(chunk.features);

            let Some(next) = last.checked_add(1) else {
                if remaining > 0 {
                    warn!(remaining, "feature code space exhausted before DATA LENGTH");
                }
                break;
            };
            request = GetConfiguration {
                rt: RequestType::From.into(),
                start_feature: next,
                allocation_length: 0,
            };
        }

        debug!(chunks, features = features.len(), current_profile, "GET CONFIGURATION done");
        Ok(GetConfigurationResponse {
            header: ResponseHeader::new(opcode::GET_CONFIGURATION),
            data_length,
            current_profile,
            features,
        })
    }
}
