// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Probe-then-fetch: a first round with a header-sized allocation learns
//! how much data the drive has, a second round fetches exactly that much.
//! The second round is only issued when the first one succeeded.

use tracing::debug;

use crate::{
    control_block::{
        Command,
        inquiry::{INQUIRY_PROBE_LEN, Inquiry},
        medium::{MECHANISM_STATUS_HEADER_LEN, MechanismStatus},
        mod_sense::{MODE_HEADER_LEN, ModeSense10},
        serial_number::{MSN_HEADER_LEN, ReadMediaSerialNumber},
    },
    engine::MmcEngine,
    error::{EngineError, EngineResult},
    models::device::Device,
    response::{
        InquiryResponse, MechanismStatusResponse, MediaSerialNumberResponse, ModeSenseResponse,
    },
    transport::ScsiTransport,
};

impl<T: ScsiTransport> MmcEngine<T> {
    /// Standard INQUIRY in two rounds: 5 bytes, then ADDITIONAL LENGTH + 4.
    pub fn inquiry(&mut self, device: &Device) -> EngineResult<InquiryResponse> {
        self.scoped(|engine| engine.fetch_inquiry(device, Inquiry::standard()))
    }

    /// INQUIRY and copy of its identity fields into `device`.
    pub fn identify(&mut self, device: &mut Device) -> EngineResult<()> {
        let inquiry = self.inquiry(device)?;
        device.apply_inquiry(&inquiry);
        Ok(())
    }

    /// MODE SENSE (10) for the current values of `page_code`.
    pub fn mode_sense(&mut self, device: &Device, page_code: u8) -> EngineResult<ModeSenseResponse> {
        self.scoped(|engine| engine.fetch_mode_sense(device, ModeSense10::current(page_code)))
    }

    pub fn mechanism_status(&mut self, device: &Device) -> EngineResult<MechanismStatusResponse> {
        self.scoped(|engine| engine.fetch_mechanism_status(device))
    }

    pub fn media_serial_number(
        &mut self,
        device: &Device,
    ) -> EngineResult<MediaSerialNumberResponse> {
        self.scoped(|engine| engine.fetch_media_serial_number(device))
    }

    pub(crate) fn fetch_inquiry(
        &mut self,
        device: &Device,
        inquiry: Inquiry,
    ) -> EngineResult<InquiryResponse> {
        let probe = inquiry.with_allocation_length(INQUIRY_PROBE_LEN);
        let required = self.round(device, &probe.into(), InquiryResponse::required_length)?;
        debug!(required, "INQUIRY probe");
        check_reported(device, "INQUIRY", required.into())?;

        let fetch = inquiry.with_allocation_length(required);
        self.round(device, &fetch.into(), InquiryResponse::parse)
    }

    pub(crate) fn fetch_mode_sense(
        &mut self,
        device: &Device,
        mode_sense: ModeSense10,
    ) -> EngineResult<ModeSenseResponse> {
        let probe = mode_sense.with_allocation_length(MODE_HEADER_LEN);
        let required = self.round(device, &probe.into(), ModeSenseResponse::required_length)?;
        debug!(required, page = mode_sense.page_code, "MODE SENSE probe");
        check_reported(device, "MODE SENSE", required.into())?;

        let fetch = mode_sense.with_allocation_length(required);
        self.round(device, &fetch.into(), ModeSenseResponse::parse)
    }

    pub(crate) fn fetch_mechanism_status(
        &mut self,
        device: &Device,
    ) -> EngineResult<MechanismStatusResponse> {
        let probe = Command::from(MechanismStatus {
            allocation_length: MECHANISM_STATUS_HEADER_LEN,
        });
        let required = self.round(device, &probe, MechanismStatusResponse::required_length)?;
        debug!(required, "MECHANISM STATUS probe");
        check_reported(device, "MECHANISM STATUS", required)?;

        let allocation_length = u16::try_from(required).map_err(|_| {
            EngineError::protocol(format!(
                "mechanism status of {required} bytes exceeds the 16-bit allocation length"
            ))
        })?;
        let fetch = Command::from(MechanismStatus { allocation_length });
        self.round(device, &fetch, MechanismStatusResponse::parse)
    }

    pub(crate) fn fetch_media_serial_number(
        &mut self,
        device: &Device,
    ) -> EngineResult<MediaSerialNumberResponse> {
        let probe = Command::from(ReadMediaSerialNumber {
            allocation_length: MSN_HEADER_LEN,
        });
        let required = self.round(device, &probe, MediaSerialNumberResponse::required_length)?;
        debug!(required, "READ MEDIA SERIAL NUMBER probe");
        check_reported(device, "READ MEDIA SERIAL NUMBER", required)?;

        let fetch = Command::from(ReadMediaSerialNumber {
            allocation_length: required,
        });
        self.round(device, &fetch, MediaSerialNumberResponse::parse)
    }
}

/// A length reported by the drive must fit the adapter before it sizes a
/// buffer.
fn check_reported(device: &Device, what: &str, required: u32) -> EngineResult<()> {
    let limit = device.adapter().max_transfer_length();
    if required > limit {
        return Err(EngineError::protocol(format!(
            "{what} reports {required} bytes, adapter transfers at most {limit}"
        )));
    }
    Ok(())
}
