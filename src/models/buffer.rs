// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Transfer buffers honoring the adapter alignment mask.
//!
//! Both the base address and the length of the slice handed to the
//! transport are multiples of `alignment_mask + 1`. The buffer owns its
//! storage and releases it on drop, so one round's buffer never outlives the
//! round that allocated it.

use std::fmt;

use crate::error::{EngineError, EngineResult};

pub struct AlignedBuffer {
    storage: Vec<u8>,
    offset: usize,
    padded: usize,
    requested: usize,
}

impl AlignedBuffer {
    /// Zero-filled buffer of at least `requested` bytes.
    pub fn new(requested: usize, alignment_mask: u32) -> EngineResult<Self> {
        let mask = alignment_mask as usize;
        if mask.checked_add(1).is_none_or(|a| !a.is_power_of_two()) {
            return Err(EngineError::invalid(format!(
                "alignment mask {alignment_mask:#x} is not of the form 2^n-1"
            )));
        }

        let padded = requested
            .checked_add(mask)
            .map(|n| n & !mask)
            .ok_or(EngineError::OutOfMemory)?;
        let total = padded.checked_add(mask).ok_or(EngineError::OutOfMemory)?;

        let mut storage = Vec::new();
        storage
            .try_reserve_exact(total)
            .map_err(|_| EngineError::OutOfMemory)?;
        storage.resize(total, 0);

        // storage is never grown again, so the heap address stays put
        let addr = storage.as_ptr() as usize;
        let offset = (mask + 1 - (addr & mask)) & mask;

        Ok(Self {
            storage,
            offset,
            padded,
            requested,
        })
    }

    /// Aligned buffer holding a copy of `data` (data-out phase).
    pub fn from_slice(data: &[u8], alignment_mask: u32) -> EngineResult<Self> {
        let mut buf = Self::new(data.len(), alignment_mask)?;
        buf.as_mut_slice()[..data.len()].copy_from_slice(data);
        Ok(buf)
    }

    /// Bytes the caller asked for.
    #[inline]
    pub fn requested_len(&self) -> usize {
        self.requested
    }

    /// Bytes handed to the transport (`requested` rounded up).
    #[inline]
    pub fn len(&self) -> usize {
        self.padded
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.padded == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.storage[self.offset..self.offset + self.padded]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.storage[self.offset..self.offset + self.padded]
    }

    /// The first `requested_len()` bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.as_slice()[..self.requested]
    }
}

impl fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("requested", &self.requested)
            .field("padded", &self.padded)
            .field("addr", &format_args!("{:p}", self.as_slice().as_ptr()))
            .finish()
    }
}
