// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Big-endian field access and sub-byte flag packing for CDBs and MMC
//! parameter data.
//!
//! SCSI puts the most significant byte first regardless of host order, and
//! packs flags into single bytes at bit positions fixed per opcode. The
//! helpers below never panic: reads past the end of a slice yield `None`,
//! writes past the end are the caller's bug and are rejected by the encoder
//! before they happen (CDBs are always 16-byte arrays).

use std::fmt::Write;

/// Largest value a 24-bit big-endian field can hold.
pub const U24_MAX: u32 = 0x00FF_FFFF;

#[inline]
pub fn put_u16(buf: &mut [u8], off: usize, v: u16) {
    buf[off..off + 2].copy_from_slice(&v.to_be_bytes());
}

/// Writes the low 24 bits of `v` big-endian at `off`.
#[inline]
pub fn put_u24(buf: &mut [u8], off: usize, v: u32) {
    let [_, b1, b2, b3] = v.to_be_bytes();
    buf[off] = b1;
    buf[off + 1] = b2;
    buf[off + 2] = b3;
}

#[inline]
pub fn put_u32(buf: &mut [u8], off: usize, v: u32) {
    buf[off..off + 4].copy_from_slice(&v.to_be_bytes());
}

#[inline]
pub fn get_u16(buf: &[u8], off: usize) -> Option<u16> {
    let b = buf.get(off..off + 2)?;
    Some(u16::from_be_bytes([b[0], b[1]]))
}

#[inline]
pub fn get_u24(buf: &[u8], off: usize) -> Option<u32> {
    let b = buf.get(off..off + 3)?;
    Some(u32::from_be_bytes([0, b[0], b[1], b[2]]))
}

#[inline]
pub fn get_u32(buf: &[u8], off: usize) -> Option<u32> {
    let b = buf.get(off..off + 4)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

/// `true` -> `1 << bit`, `false` -> 0.
#[inline]
pub const fn flag(on: bool, bit: u8) -> u8 {
    (on as u8) << bit
}

/// Places `value & mask` at `shift` inside a byte.
#[inline]
pub const fn field(value: u8, shift: u8, mask: u8) -> u8 {
    (value & mask) << shift
}

/// Tests a single bit of a byte.
#[inline]
pub const fn bit(byte: u8, bit: u8) -> bool {
    byte & (1 << bit) != 0
}

/// Extracts `(byte >> shift) & mask`.
#[inline]
pub const fn bits(byte: u8, shift: u8, mask: u8) -> u8 {
    (byte >> shift) & mask
}

/// ASCII field as returned by INQUIRY and friends: non-ASCII bytes become
/// `?`, NULs and trailing/leading blanks are dropped.
pub fn trim_ascii(bytes: &[u8]) -> String {
    let s: String = bytes
        .iter()
        .filter(|&&b| b != 0)
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect();
    s.trim().to_string()
}

/// Takes `buf[start..end]`, clamped to what is actually there.
#[inline]
pub fn clamp_slice(buf: &[u8], start: usize, end: usize) -> &[u8] {
    let end = end.min(buf.len());
    let start = start.min(end);
    &buf[start..end]
}

/// Compact `0a, ff, ..` dump used by trace logging.
pub fn hex_dump(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "null".to_string();
    }
    let mut s = String::with_capacity(bytes.len() * 4);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            s.push_str(", ");
        }
        let _ = write!(&mut s, "{b:02x}");
    }
    s
}
