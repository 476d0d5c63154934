// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{collections::VecDeque, fs};

use anyhow::Result;
use hex::FromHex;
use mmc_engine::{
    error::EngineResult,
    models::{
        adapter::{Adapter, BusType},
        device::{Device, DevicePath},
    },
    transport::{
        Completion, DataTransfer, DeviceEnumerator, ScsiRequest, ScsiStatus, ScsiTransport,
        TransportFailure,
    },
};

pub fn load_fixture(path: &str) -> Result<Vec<u8>> {
    let s = fs::read_to_string(path)?;
    let cleaned = s.trim().replace(|c: char| c.is_whitespace(), "");
    Ok(Vec::from_hex(&cleaned)?)
}

pub fn adapter(alignment_mask: u32, max_transfer_length: u32) -> Adapter {
    Adapter::new(BusType::Sata, alignment_mask, 17, max_transfer_length).expect("adapter")
}

pub fn device(adapter: Adapter) -> Device {
    Device::new(DevicePath::new("/dev/sr0"), adapter)
}

/// What the simulated drive does with one request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// GOOD; data-in receives as much of the bytes as fits.
    Data(Vec<u8>),
    /// GOOD; every byte of the data phase moved.
    Good,
    /// CHECK CONDITION with sense.
    CheckCondition(Vec<u8>),
    /// GOOD status with sense attached.
    GoodWithSense(Vec<u8>),
    Status(ScsiStatus),
    Failure(TransportFailure),
}

/// One recorded pass-through call.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub path: DevicePath,
    pub cdb: Vec<u8>,
    pub buffer_addr: usize,
    pub buffer_len: usize,
    pub data_out: Vec<u8>,
    pub sense_len: usize,
}

impl Exchange {
    pub fn opcode(&self) -> u8 {
        self.cdb[0]
    }
}

type Model = Box<dyn FnMut(&[u8]) -> Reply>;

/// `ScsiTransport` backed by a closure that plays the drive.
pub struct SimulatedDrive {
    adapter: Adapter,
    model: Model,
    pub exchanges: Vec<Exchange>,
}

impl SimulatedDrive {
    pub fn new(adapter: Adapter, model: impl FnMut(&[u8]) -> Reply + 'static) -> Self {
        Self {
            adapter,
            model: Box::new(model),
            exchanges: Vec::new(),
        }
    }

    /// Answers requests from `replies` in order; an exhausted script fails
    /// the call.
    pub fn scripted(adapter: Adapter, replies: impl IntoIterator<Item = Reply>) -> Self {
        let mut queue: VecDeque<Reply> = replies.into_iter().collect();
        Self::new(adapter, move |_| {
            queue
                .pop_front()
                .unwrap_or(Reply::Failure(TransportFailure::os(-1)))
        })
    }

    pub fn cdbs(&self) -> Vec<Vec<u8>> {
        self.exchanges.iter().map(|e| e.cdb.clone()).collect()
    }
}

impl ScsiTransport for SimulatedDrive {
    fn execute(&mut self, request: ScsiRequest<'_>) -> Result<Completion, TransportFailure> {
        let (buffer_addr, buffer_len, data_out) = match &request.data {
            DataTransfer::None => (0, 0, Vec::new()),
            DataTransfer::In(b) => (b.as_ptr() as usize, b.len(), Vec::new()),
            DataTransfer::Out(b) => (b.as_ptr() as usize, b.len(), b.to_vec()),
        };
        self.exchanges.push(Exchange {
            path: request.path.clone(),
            cdb: request.cdb.to_vec(),
            buffer_addr,
            buffer_len,
            data_out,
            sense_len: request.sense_len,
        });

        match (self.model)(request.cdb) {
            Reply::Data(bytes) => {
                let n = match request.data {
                    DataTransfer::In(buf) => {
                        let n = bytes.len().min(buf.len());
                        buf[..n].copy_from_slice(&bytes[..n]);
                        n
                    },
                    _ => 0,
                };
                Ok(Completion::good(n))
            },
            Reply::Good => Ok(Completion::good(request.data.len())),
            Reply::CheckCondition(sense) => Ok(Completion::check_condition(sense)),
            Reply::GoodWithSense(sense) => Ok(Completion {
                status: ScsiStatus::Good,
                bytes_transferred: request.data.len(),
                sense,
            }),
            Reply::Status(status) => Ok(Completion {
                status,
                bytes_transferred: 0,
                sense: Vec::new(),
            }),
            Reply::Failure(f) => Err(f),
        }
    }

    fn adapter_limits(&mut self, _path: &DevicePath) -> EngineResult<Adapter> {
        Ok(self.adapter)
    }
}

pub struct FixedEnumerator(pub Vec<DevicePath>);

impl DeviceEnumerator for FixedEnumerator {
    fn enumerate(&mut self) -> EngineResult<Vec<DevicePath>> {
        Ok(self.0.clone())
    }
}

/// ALLOCATION LENGTH of the CDBs the engine sizes itself.
pub fn allocation_length(cdb: &[u8]) -> usize {
    let be16 = |i: usize| u16::from_be_bytes([cdb[i], cdb[i + 1]]) as usize;
    match cdb[0] {
        0x12 => be16(3),
        0x46 | 0x5A => be16(7),
        0xBD => be16(8),
        0xAB => u32::from_be_bytes([cdb[6], cdb[7], cdb[8], cdb[9]]) as usize,
        0x03 => cdb[4] as usize,
        other => panic!("no allocation length for opcode {other:#04x}"),
    }
}

/// Replies with `data` cut to the CDB's allocation length, as a drive does.
pub fn honoring_allocation(cdb: &[u8], data: &[u8]) -> Reply {
    let n = allocation_length(cdb).min(data.len());
    Reply::Data(data[..n].to_vec())
}

/// Feature descriptor with CURRENT set and a payload of `len` bytes.
pub fn feature_descriptor(code: u16, len: u8) -> Vec<u8> {
    let mut d = Vec::with_capacity(4 + len as usize);
    d.extend_from_slice(&code.to_be_bytes());
    d.push(0x01);
    d.push(len);
    d.extend((0..len).map(|i| i.wrapping_mul(7)));
    d
}

/// GET CONFIGURATION transfer: header, then `descriptors`, then zeros up
/// to `total` bytes.
pub fn configuration_data(
    data_length: u32,
    current_profile: u16,
    descriptors: &[Vec<u8>],
    total: usize,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(total);
    buf.extend_from_slice(&data_length.to_be_bytes());
    buf.extend_from_slice(&[0, 0]);
    buf.extend_from_slice(&current_profile.to_be_bytes());
    for d in descriptors {
        buf.extend_from_slice(d);
    }
    if buf.len() < total {
        buf.resize(total, 0);
    }
    buf
}

pub fn fixed_sense(sense_key: u8, asc: u8, ascq: u8) -> Vec<u8> {
    let mut s = vec![0u8; 18];
    s[0] = 0x70;
    s[2] = sense_key;
    s[7] = 10;
    s[12] = asc;
    s[13] = ascq;
    s
}

pub fn descriptor_sense(sense_key: u8, asc: u8, ascq: u8) -> Vec<u8> {
    vec![0x72, sense_key, asc, ascq, 0, 0, 0, 0]
}
