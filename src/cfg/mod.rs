//! This module handles configuration, config path resolution, and logging.

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// Config path resolution for host programs and tests.
pub mod cli;
/// Engine configuration file parsing and validation.
pub mod config;
/// Enumerations used in configuration.
pub mod enums;
/// Logging sink construction.
pub mod logger;
