// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! GET EVENT STATUS NOTIFICATION response.
//!
//! Header, 4 bytes:
//!   [0..2] EVENT DESCRIPTOR LENGTH
//!   [2]    NEA(7) | NOTIFICATION CLASS(2..0)
//!   [3]    SUPPORTED EVENT CLASSES
//! followed by at most one 4-byte event descriptor whose layout depends on
//! the notification class.

use crate::{
    control_block::{event_status::EventClass, opcode},
    error::{EngineError, EngineResult},
    response::ResponseHeader,
    utils::{bit, bits, get_u16},
};

pub const EVENT_HEADER_LEN: usize = 4;
const EVENT_DESCRIPTOR_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDescriptor {
    OperationalChange {
        event_code: u8,
        persistent_prevented: bool,
        status: u8,
        change: u16,
    },
    PowerManagement {
        event_code: u8,
        power_status: u8,
    },
    ExternalRequest {
        event_code: u8,
        persistent_prevented: bool,
        status: u8,
        request: u16,
    },
    Media {
        event_code: u8,
        media_present: bool,
        tray_open: bool,
        start_slot: u8,
        end_slot: u8,
    },
    MultiHost {
        event_code: u8,
        persistent_prevented: bool,
        status: u8,
        priority: u16,
    },
    DeviceBusy {
        event_code: u8,
        busy_status: u8,
        time: u16,
    },
}

impl EventDescriptor {
    fn decode(class: u8, d: &[u8]) -> Option<Self> {
        let [b0, b1, ..] = *d else { return None };
        let word = get_u16(d, 2)?;
        let event_code = bits(b0, 0, 0x0F);
        Some(match class {
            1 => EventDescriptor::OperationalChange {
                event_code,
                persistent_prevented: bit(b1, 7),
                status: bits(b1, 0, 0x0F),
                change: word,
            },
            2 => EventDescriptor::PowerManagement {
                event_code,
                power_status: b1,
            },
            3 => EventDescriptor::ExternalRequest {
                event_code,
                persistent_prevented: bit(b1, 7),
                status: bits(b1, 0, 0x0F),
                request: word,
            },
            4 => EventDescriptor::Media {
                event_code,
                media_present: bit(b1, 1),
                tray_open: bit(b1, 0),
                start_slot: d[2],
                end_slot: d[3],
            },
            5 => EventDescriptor::MultiHost {
                event_code,
                persistent_prevented: bit(b1, 7),
                status: bits(b1, 0, 0x0F),
                priority: word,
            },
            6 => EventDescriptor::DeviceBusy {
                event_code,
                busy_status: b1,
                time: word,
            },
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventStatusResponse {
    pub header: ResponseHeader,
    pub descriptor_length: u16,
    /// No event available.
    pub nea: bool,
    pub notification_class: u8,
    pub supported_classes: EventClass,
    pub event: Option<EventDescriptor>,
}

impl EventStatusResponse {
    pub fn parse(buf: &[u8]) -> EngineResult<Self> {
        if buf.len() < EVENT_HEADER_LEN {
            return Err(EngineError::protocol(format!(
                "event status header needs {EVENT_HEADER_LEN} bytes, got {}",
                buf.len()
            )));
        }
        let descriptor_length = u16::from_be_bytes([buf[0], buf[1]]);
        let nea = bit(buf[2], 7);
        let notification_class = bits(buf[2], 0, 0x07);

        let end = (EVENT_HEADER_LEN - 2 + descriptor_length as usize).min(buf.len());
        let body = buf.get(EVENT_HEADER_LEN..end).unwrap_or_default();
        let event = if nea || body.len() < EVENT_DESCRIPTOR_LEN {
            None
        } else {
            EventDescriptor::decode(notification_class, body)
        };

        Ok(Self {
            header: ResponseHeader::new(opcode::GET_EVENT_STATUS_NOTIFICATION),
            descriptor_length,
            nea,
            notification_class,
            supported_classes: EventClass::from_bits_truncate(buf[3]),
            event,
        })
    }
}
