// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Typed responses.
//!
//! Parsers here are pure: they take the bytes a transport round produced
//! and return a typed value or `ProtocolViolation`. Multi-round choreography
//! (probe-then-fetch, pagination) lives in the engine.

use bytes::Bytes;

pub mod buffer;
pub mod capacity;
pub mod configuration;
pub mod event_status;
pub mod inquiry;
pub mod mechanism;
pub mod mode_page;
pub mod performance;
pub mod sense;
pub mod serial_number;
pub mod track;

pub use buffer::{ReadBufferData, ReadBufferResponse};
pub use capacity::{BufferCapacity, BufferCapacityResponse, CapacityResponse};
pub use configuration::{ConfigurationChunk, ConfigurationHeader, GetConfigurationResponse};
pub use event_status::{EventDescriptor, EventStatusResponse};
pub use inquiry::InquiryResponse;
pub use mechanism::{MechanismStatusResponse, SlotEntry};
pub use mode_page::{ModePage, ModeSenseResponse};
pub use performance::{PerformanceDescriptors, PerformanceResponse};
pub use sense::RequestSenseResponse;
pub use serial_number::MediaSerialNumberResponse;
pub use track::TrackInformationResponse;

/// Fields every response carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    /// Opcode of the command that produced the response.
    pub opcode: u8,
}

impl ResponseHeader {
    pub const fn new(opcode: u8) -> Self {
        Self { opcode }
    }
}

/// Raw data-in payload (READ (10)/(12), READ CD).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataResponse {
    pub header: ResponseHeader,
    pub data: Bytes,
}

/// One variant per response shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Commands without a data-in phase.
    Completion(ResponseHeader),
    Inquiry(Box<InquiryResponse>),
    GetConfiguration(GetConfigurationResponse),
    EventStatus(EventStatusResponse),
    Performance(PerformanceResponse),
    MechanismStatus(MechanismStatusResponse),
    ModeSense(ModeSenseResponse),
    ReadBuffer(ReadBufferResponse),
    BufferCapacity(BufferCapacityResponse),
    Capacity(CapacityResponse),
    MediaSerialNumber(MediaSerialNumberResponse),
    TrackInformation(Box<TrackInformationResponse>),
    RequestSense(RequestSenseResponse),
    Data(DataResponse),
}

impl Response {
    pub fn header(&self) -> &ResponseHeader {
        match self {
            Response::Completion(h) => h,
            Response::Inquiry(r) => &r.header,
            Response::GetConfiguration(r) => &r.header,
            Response::EventStatus(r) => &r.header,
            Response::Performance(r) => &r.header,
            Response::MechanismStatus(r) => &r.header,
            Response::ModeSense(r) => &r.header,
            Response::ReadBuffer(r) => &r.header,
            Response::BufferCapacity(r) => &r.header,
            Response::Capacity(r) => &r.header,
            Response::MediaSerialNumber(r) => &r.header,
            Response::TrackInformation(r) => &r.header,
            Response::RequestSense(r) => &r.header,
            Response::Data(r) => &r.header,
        }
    }

    #[inline]
    pub fn opcode(&self) -> u8 {
        self.header().opcode
    }
}
