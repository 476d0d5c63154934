//! Data model: adapters, devices, feature descriptors, sense data and
//! transfer buffers.

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// Host bus adapter transfer constraints.
pub mod adapter;
/// Alignment-aware transfer buffers.
pub mod buffer;
/// Drive identity and feature map.
pub mod device;
/// GET CONFIGURATION feature descriptors.
pub mod feature;
/// Sense data parsing and translation.
pub mod sense;
