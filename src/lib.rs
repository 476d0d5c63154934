//! This crate provides a host-side MMC-5 command/response engine for optical
//! drives: CDB encoding, execution over a pluggable SCSI pass-through, and
//! decoding of the returned data into typed responses.
// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// Handles configuration, config path resolution, and logging.
pub mod cfg;
/// Implements the MMC-5 commands (control blocks).
pub mod control_block;
/// Runs commands through a transport: single rounds, probes, pagination.
pub mod engine;
/// Error taxonomy and unified sense codes.
pub mod error;
/// Defines the data model: adapters, devices, features, sense data.
pub mod models;
/// Typed responses and their parsers.
pub mod response;
/// Interfaces of the SCSI pass-through and device discovery.
pub mod transport;
/// Provides utility functions used throughout the crate.
pub mod utils;

pub use engine::{MmcEngine, enumerate_devices};
pub use error::{EngineError, EngineResult, UnifiedCode};
