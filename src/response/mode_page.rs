// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! MODE SENSE(10) parameter data and the mode pages MMC drives report.
//!
//! Header, 8 bytes:
//!   [0..2] MODE DATA LENGTH (bytes that follow this field)
//!   [6..8] BLOCK DESCRIPTOR LENGTH
//! Pages follow the block descriptors; each is
//!   [0] PS(7) | SPF(6) | PAGE CODE(5..0)
//!   [1] PAGE LENGTH
//! and PAGE LENGTH bytes of page data.

use crate::{
    control_block::{
        mod_sense::{MODE_HEADER_LEN, mode_page},
        opcode,
    },
    error::{EngineError, EngineResult},
    response::ResponseHeader,
    utils::{bit, bits, get_u16, get_u24, get_u32},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModePage {
    ReadWriteErrorRecovery {
        ps: bool,
        awre: bool,
        arre: bool,
        tb: bool,
        rc: bool,
        per: bool,
        dte: bool,
        dcr: bool,
        emcdr: u8,
        read_retry_count: u8,
        write_retry_count: u8,
        window_size: u32,
    },
    Mrw {
        ps: bool,
        lba_space: bool,
    },
    WriteParameters(Box<WriteParameters>),
    Caching {
        ps: bool,
        wce: bool,
        rcd: bool,
    },
    PowerCondition {
        ps: bool,
        spf: bool,
        idle: bool,
        standby: bool,
        idle_timer: u32,
        standby_timer: u32,
    },
    InformationalExceptions {
        ps: bool,
        spf: bool,
        perf: bool,
        ebf: bool,
        ewasc: bool,
        dexcpt: bool,
        test: bool,
        logerr: bool,
        mrie: u8,
        interval_timer: u32,
        report_count: u32,
    },
    TimeoutProtect {
        ps: bool,
        g3_enable: bool,
        tmoe: bool,
        disp: bool,
        swpp: bool,
        group1_min_timeout: u16,
        group2_min_timeout: u16,
        group3_min_timeout: u16,
    },
    /// Vendor pages, the capabilities page and anything too short for its
    /// typed layout.
    Other {
        page_code: u8,
        ps: bool,
        data: Vec<u8>,
    },
}

/// Write Parameters page (0x05).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteParameters {
    pub ps: bool,
    pub bufe: bool,
    pub ls_v: bool,
    pub test_write: bool,
    pub write_type: u8,
    pub multi_session: u8,
    pub fp: bool,
    pub copy: bool,
    pub track_mode: u8,
    pub data_block_type: u8,
    pub link_size: u8,
    pub host_application_code: u8,
    pub session_format: u8,
    pub packet_size: u32,
    pub audio_pause_length: u16,
    pub mcn: [u8; 16],
    pub isrc: [u8; 16],
    pub subheader: [u8; 4],
}

impl ModePage {
    pub fn page_code(&self) -> u8 {
        match self {
            ModePage::ReadWriteErrorRecovery { .. } => mode_page::READ_WRITE_ERROR_RECOVERY,
            ModePage::Mrw { .. } => mode_page::MRW,
            ModePage::WriteParameters(_) => mode_page::WRITE_PARAMETERS,
            ModePage::Caching { .. } => mode_page::CACHING,
            ModePage::PowerCondition { .. } => mode_page::POWER_CONDITION,
            ModePage::InformationalExceptions { .. } => mode_page::INFORMATIONAL_EXCEPTIONS,
            ModePage::TimeoutProtect { .. } => mode_page::TIMEOUT_PROTECT,
            ModePage::Other { page_code, .. } => *page_code,
        }
    }

    /// `page` includes the two header bytes.
    fn decode(page: &[u8]) -> Self {
        let code = bits(page[0], 0, 0x3F);
        let ps = bit(page[0], 7);
        Self::decode_typed(code, ps, page).unwrap_or_else(|| ModePage::Other {
            page_code: code,
            ps,
            data: page[2..].to_vec(),
        })
    }

    fn decode_typed(code: u8, ps: bool, p: &[u8]) -> Option<Self> {
        let spf = bit(p[0], 6);
        Some(match code {
            mode_page::READ_WRITE_ERROR_RECOVERY => {
                let b2 = *p.get(2)?;
                ModePage::ReadWriteErrorRecovery {
                    ps,
                    awre: bit(b2, 7),
                    arre: bit(b2, 6),
                    tb: bit(b2, 5),
                    rc: bit(b2, 4),
                    per: bit(b2, 2),
                    dte: bit(b2, 1),
                    dcr: bit(b2, 0),
                    read_retry_count: *p.get(3)?,
                    emcdr: bits(*p.get(7)?, 0, 0x03),
                    write_retry_count: *p.get(8)?,
                    window_size: get_u24(p, 9)?,
                }
            },
            mode_page::MRW => ModePage::Mrw {
                ps,
                lba_space: bit(*p.get(3)?, 0),
            },
            mode_page::WRITE_PARAMETERS => {
                let (b2, b3) = (*p.get(2)?, *p.get(3)?);
                ModePage::WriteParameters(Box::new(WriteParameters {
                    ps,
                    bufe: bit(b2, 6),
                    ls_v: bit(b2, 5),
                    test_write: bit(b2, 4),
                    write_type: bits(b2, 0, 0x0F),
                    multi_session: bits(b3, 6, 0x03),
                    fp: bit(b3, 5),
                    copy: bit(b3, 4),
                    track_mode: bits(b3, 0, 0x0F),
                    data_block_type: bits(*p.get(4)?, 0, 0x0F),
                    link_size: *p.get(5)?,
                    host_application_code: bits(*p.get(7)?, 0, 0x3F),
                    session_format: *p.get(8)?,
                    packet_size: get_u32(p, 10)?,
                    audio_pause_length: get_u16(p, 14)?,
                    mcn: p.get(16..32)?.try_into().ok()?,
                    isrc: p.get(32..48)?.try_into().ok()?,
                    subheader: p.get(48..52)?.try_into().ok()?,
                }))
            },
            mode_page::CACHING => {
                let b2 = *p.get(2)?;
                ModePage::Caching {
                    ps,
                    wce: bit(b2, 2),
                    rcd: bit(b2, 0),
                }
            },
            mode_page::POWER_CONDITION => {
                let b3 = *p.get(3)?;
                ModePage::PowerCondition {
                    ps,
                    spf,
                    idle: bit(b3, 1),
                    standby: bit(b3, 0),
                    idle_timer: get_u32(p, 4)?,
                    standby_timer: get_u32(p, 8)?,
                }
            },
            mode_page::INFORMATIONAL_EXCEPTIONS => {
                let b2 = *p.get(2)?;
                ModePage::InformationalExceptions {
                    ps,
                    spf,
                    perf: bit(b2, 7),
                    ebf: bit(b2, 5),
                    ewasc: bit(b2, 4),
                    dexcpt: bit(b2, 3),
                    test: bit(b2, 2),
                    logerr: bit(b2, 0),
                    mrie: bits(*p.get(3)?, 0, 0x0F),
                    interval_timer: get_u32(p, 4)?,
                    report_count: get_u32(p, 8)?,
                }
            },
            mode_page::TIMEOUT_PROTECT => {
                let b4 = *p.get(4)?;
                ModePage::TimeoutProtect {
                    ps,
                    g3_enable: bit(b4, 3),
                    tmoe: bit(b4, 2),
                    disp: bit(b4, 1),
                    swpp: bit(b4, 0),
                    group1_min_timeout: get_u16(p, 6)?,
                    group2_min_timeout: get_u16(p, 8)?,
                    group3_min_timeout: get_u16(p, 10)?,
                }
            },
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSenseResponse {
    pub header: ResponseHeader,
    pub mode_data_length: u16,
    pub block_descriptor_length: u16,
    pub pages: Vec<ModePage>,
}

impl ModeSenseResponse {
    /// Total bytes the drive has, read off the probe header.
    pub fn required_length(probe: &[u8]) -> EngineResult<u16> {
        let len = get_u16(probe, 0).ok_or_else(|| {
            EngineError::protocol(format!(
                "mode parameter header truncated: {} bytes",
                probe.len()
            ))
        })?;
        Ok(len.saturating_add(2))
    }

    pub fn parse(buf: &[u8]) -> EngineResult<Self> {
        if buf.len() < MODE_HEADER_LEN as usize {
            return Err(EngineError::protocol(format!(
                "mode parameter header needs {MODE_HEADER_LEN} bytes, got {}",
                buf.len()
            )));
        }
        let mode_data_length = u16::from_be_bytes([buf[0], buf[1]]);
        let block_descriptor_length = u16::from_be_bytes([buf[6], buf[7]]);
        let end = (mode_data_length as usize + 2).min(buf.len());
        let mut off = MODE_HEADER_LEN as usize + block_descriptor_length as usize;

        let mut pages = Vec::new();
        while off + 2 <= end {
            let page_end = off + 2 + buf[off + 1] as usize;
            if page_end > end {
                return Err(EngineError::protocol(format!(
                    "mode page {:#04x} at offset {off} overruns the mode data",
                    buf[off] & 0x3F
                )));
            }
            pages.push(ModePage::decode(&buf[off..page_end]));
            off = page_end;
        }

        Ok(Self {
            header: ResponseHeader::new(opcode::MODE_SENSE_10),
            mode_data_length,
            block_descriptor_length,
            pages,
        })
    }

    pub fn page(&self, code: u8) -> Option<&ModePage> {
        self.pages.iter().find(|p| p.page_code() == code)
    }
}
