// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::{
    control_block::{CDB_MAX_LEN, CdbEncoder, opcode},
    error::EngineResult,
};

/// TEST UNIT READY(6): all zero, no data phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TestUnitReady;

impl CdbEncoder for TestUnitReady {
    fn opcode(&self) -> u8 {
        opcode::TEST_UNIT_READY
    }

    fn encode_into(&self, cdb: &mut [u8; CDB_MAX_LEN]) -> EngineResult<usize> {
        cdb[0] = opcode::TEST_UNIT_READY;
        Ok(6)
    }
}
