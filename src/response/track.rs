// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Track Information Block returned by READ TRACK INFORMATION.
//!
//!   [0..2]   DATA LENGTH
//!   [2]      TRACK NUMBER (LSB)
//!   [3]      SESSION NUMBER (LSB)
//!   [5]      LJRS(7..6) | DAMAGE(5) | COPY(4) | TRACK MODE(3..0)
//!   [6]      RT(7) | BLANK(6) | PACKET/INC(5) | FP(4) | DATA MODE(3..0)
//!   [7]      LRA_V(1) | NWA_V(0)
//!   [8..12]  TRACK START ADDRESS
//!   [12..16] NEXT WRITABLE ADDRESS
//!   [16..20] FREE BLOCKS
//!   [20..24] FIXED PACKET SIZE / BLOCKING FACTOR
//!   [24..28] TRACK SIZE
//!   [28..32] LAST RECORDED ADDRESS
//!   [32]     TRACK NUMBER (MSB)
//!   [33]     SESSION NUMBER (MSB)
//!   [36..40] READ COMPATIBILITY LBA
//!   [40..44] NEXT LAYER JUMP ADDRESS
//!   [44..48] LAST LAYER JUMP ADDRESS
//!
//! Older drives stop after byte 35; the remaining fields read as zero.

use crate::{
    control_block::opcode,
    error::{EngineError, EngineResult},
    response::ResponseHeader,
    utils::{bit, bits, get_u32},
};

/// Bytes every drive returns.
const TRACK_INFO_MIN_LEN: usize = 28;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInformationResponse {
    pub header: ResponseHeader,
    pub data_length: u16,
    pub track_number: u16,
    pub session_number: u16,
    pub layer_jump_recording_status: u8,
    pub damage: bool,
    pub copy: bool,
    pub track_mode: u8,
    pub reserved_track: bool,
    pub blank: bool,
    pub packet_incremental: bool,
    pub fixed_packet: bool,
    pub data_mode: u8,
    pub last_recorded_address_valid: bool,
    pub next_writable_address_valid: bool,
    pub track_start_address: u32,
    pub next_writable_address: u32,
    pub free_blocks: u32,
    pub fixed_packet_size: u32,
    pub track_size: u32,
    pub last_recorded_address: u32,
    pub read_compatibility_lba: u32,
    pub next_layer_jump_address: u32,
    pub last_layer_jump_address: u32,
}

impl TrackInformationResponse {
    pub fn parse(buf: &[u8]) -> EngineResult<Self> {
        if buf.len() < TRACK_INFO_MIN_LEN {
            return Err(EngineError::protocol(format!(
                "track information needs {TRACK_INFO_MIN_LEN} bytes, got {}",
                buf.len()
            )));
        }
        let byte = |i: usize| buf.get(i).copied().unwrap_or(0);
        let word = |off: usize| get_u32(buf, off).unwrap_or(0);
        let (b5, b6, b7) = (buf[5], buf[6], buf[7]);

        Ok(Self {
            header: ResponseHeader::new(opcode::READ_TRACK_INFORMATION),
            data_length: u16::from_be_bytes([buf[0], buf[1]]),
            track_number: u16::from_be_bytes([byte(32), buf[2]]),
            session_number: u16::from_be_bytes([byte(33), buf[3]]),
            layer_jump_recording_status: bits(b5, 6, 0x03),
            damage: bit(b5, 5),
            copy: bit(b5, 4),
            track_mode: bits(b5, 0, 0x0F),
            reserved_track: bit(b6, 7),
            blank: bit(b6, 6),
            packet_incremental: bit(b6, 5),
            fixed_packet: bit(b6, 4),
            data_mode: bits(b6, 0, 0x0F),
            last_recorded_address_valid: bit(b7, 1),
            next_writable_address_valid: bit(b7, 0),
            track_start_address: word(8),
            next_writable_address: word(12),
            free_blocks: word(16),
            fixed_packet_size: word(20),
            track_size: word(24),
            last_recorded_address: word(28),
            read_compatibility_lba: word(36),
            next_layer_jump_address: word(40),
            last_layer_jump_address: word(44),
        })
    }
}
