// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Execution of commands against a [`ScsiTransport`].
//!
//! Every command runs as one or more *rounds*. A round encodes one CDB,
//! allocates the data buffer at the adapter's alignment, calls the
//! transport once, folds the completion into an [`EngineResult`] and hands
//! the data-in bytes to a parser. The buffer is dropped before the round
//! returns, on every path.
//!
//! Completion rules of a round, in order:
//! * sense bytes that decode to anything but NO SENSE are a `SenseError`,
//!   even with GOOD status;
//! * a non-GOOD status without usable sense is a `DeviceIoFailure` carrying
//!   the status byte;
//! * fewer bytes than requested is an `UnexpectedShortTransfer`, except
//!   for commands whose allocation length is only an upper bound;
//! * a failed transport call without sense is an `UnexpectedShortTransfer`
//!   when some bytes moved, a `DeviceIoFailure` with the OS code otherwise.

use bytes::Bytes;
use tracing::{Dispatch, debug, debug_span, trace};

use crate::{
    cfg::config::EngineConfig,
    control_block::{self, CdbEncoder, Command, DataDirection, opcode},
    error::{EngineError, EngineResult},
    models::{buffer::AlignedBuffer, device::Device, sense},
    response::{
        BufferCapacityResponse, CapacityResponse, DataResponse, EventStatusResponse,
        PerformanceResponse, ReadBufferResponse, RequestSenseResponse, Response,
        ResponseHeader, TrackInformationResponse,
    },
    transport::{Completion, DataTransfer, ScsiRequest, ScsiTransport, TransportFailure},
    utils::hex_dump,
};

pub mod enumerate;
pub mod paginator;
pub mod probe;

pub use enumerate::enumerate_devices;

/// Synchronous MMC command engine over one transport.
///
/// The engine keeps no per-device state; a [`Device`] is passed to every
/// call. Calls on one engine never overlap since they all take `&mut self`.
pub struct MmcEngine<T> {
    transport: T,
    config: EngineConfig,
    sink: Option<Dispatch>,
}

impl<T: ScsiTransport> MmcEngine<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, EngineConfig::default())
    }

    pub fn with_config(transport: T, config: EngineConfig) -> Self {
        Self {
            transport,
            config,
            sink: None,
        }
    }

    /// Routes the engine's log records to `sink` instead of the host's
    /// default subscriber.
    pub fn with_sink(mut self, sink: Dispatch) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Runs `f` with the engine's sink as the thread's default dispatcher.
    pub(crate) fn scoped<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        match self.sink.clone() {
            Some(sink) => tracing::dispatcher::with_default(&sink, || f(self)),
            None => f(self),
        }
    }

    /// Executes `command` on `device` and returns its typed response.
    ///
    /// INQUIRY, MODE SENSE, MECHANISM STATUS and READ MEDIA SERIAL NUMBER
    /// run as probe-then-fetch; GET CONFIGURATION runs through the
    /// paginator. The allocation length given in those commands is ignored.
    pub fn execute(&mut self, device: &Device, command: &Command) -> EngineResult<Response> {
        self.scoped(|engine| {
            let span = debug_span!(
                "command",
                device = %device.path(),
                op = opcode_name(command.opcode()),
            );
            let _enter = span.enter();
            engine.dispatch(device, command)
        })
    }

    fn dispatch(&mut self, device: &Device, command: &Command) -> EngineResult<Response> {
        let response = match command {
            Command::Inquiry(inquiry) => {
                Response::Inquiry(Box::new(self.fetch_inquiry(device, *inquiry)?))
            },
            Command::GetConfiguration(gc) => Response::GetConfiguration(
                self.paginate_configuration(device, gc.rt.try_into()?, gc.start_feature)?,
            ),
            Command::ModeSense10(ms) => Response::ModeSense(self.fetch_mode_sense(device, *ms)?),
            Command::MechanismStatus(_) => {
                Response::MechanismStatus(self.fetch_mechanism_status(device)?)
            },
            Command::ReadMediaSerialNumber(_) => {
                Response::MediaSerialNumber(self.fetch_media_serial_number(device)?)
            },
            Command::GetEventStatus(_) => {
                Response::EventStatus(self.round(device, command, EventStatusResponse::parse)?)
            },
            Command::GetPerformance(gp) => {
                let (kind, data_type) = (gp.kind, gp.data_type);
                Response::Performance(self.round(device, command, |buf| {
                    PerformanceResponse::parse(buf, kind, data_type)
                })?)
            },
            Command::ReadBuffer(rb) => {
                let mode = rb.mode;
                Response::ReadBuffer(
                    self.round(device, command, |buf| ReadBufferResponse::parse(mode, buf))?,
                )
            },
            Command::ReadBufferCapacity(_) => Response::BufferCapacity(self.round(
                device,
                command,
                BufferCapacityResponse::parse,
            )?),
            Command::ReadCapacity(_) => {
                Response::Capacity(self.round(device, command, CapacityResponse::parse)?)
            },
            Command::ReadTrackInformation(_) => Response::TrackInformation(Box::new(
                self.round(device, command, TrackInformationResponse::parse)?,
            )),
            Command::RequestSense(_) => {
                Response::RequestSense(self.round(device, command, RequestSenseResponse::parse)?)
            },
            Command::Read10(_) | Command::Read12(_) | Command::ReadCd(_) => {
                let header = ResponseHeader::new(command.opcode());
                Response::Data(self.round(device, command, |buf| {
                    Ok(DataResponse {
                        header,
                        data: Bytes::copy_from_slice(buf),
                    })
                })?)
            },
            Command::Blank(_)
            | Command::CloseTrackSession(_)
            | Command::FormatUnit(_)
            | Command::LoadUnloadMedium(_)
            | Command::ModeSelect10(_)
            | Command::PreventAllowRemoval(_)
            | Command::RepairTrack(_)
            | Command::ReserveTrack(_)
            | Command::Seek(_)
            | Command::SendDiscStructure(_)
            | Command::SendOpcInformation(_)
            | Command::SetCdSpeed(_)
            | Command::SetReadAhead(_)
            | Command::SetStreaming(_)
            | Command::StartStopUnit(_)
            | Command::SynchronizeCache(_)
            | Command::TestUnitReady(_)
            | Command::Verify10(_)
            | Command::Write10(_)
            | Command::Write12(_)
            | Command::WriteAndVerify10(_)
            | Command::WriteBuffer(_) => {
                self.round(device, command, |_| Ok(()))?;
                Response::Completion(ResponseHeader::new(command.opcode()))
            },
        };
        Ok(response)
    }

    /// REQUEST SENSE with the configured allocation length.
    pub fn request_sense(&mut self, device: &Device) -> EngineResult<RequestSenseResponse> {
        let command = Command::from(control_block::request_sense::RequestSense::fixed(
            self.config.request_sense_length,
        ));
        self.scoped(|engine| engine.round(device, &command, RequestSenseResponse::parse))
    }

    /// TEST UNIT READY; `Ok(())` when the drive is ready with a medium.
    pub fn test_unit_ready(&mut self, device: &Device) -> EngineResult<()> {
        let command = Command::from(control_block::test_unit_ready::TestUnitReady);
        self.scoped(|engine| engine.round(device, &command, |_| Ok(())))
    }

    /// One transport round-trip.
    ///
    /// A data phase longer than the adapter's `max_transfer_length` is
    /// rejected before any buffer is allocated. `parse` sees exactly the bytes the CDB asked for (empty for commands
    /// without a data-in phase).
    pub(crate) fn round<R>(
        &mut self,
        device: &Device,
        command: &Command,
        parse: impl FnOnce(&[u8]) -> EngineResult<R>,
    ) -> EngineResult<R> {
        let cdb = control_block::encode(command)?;
        let mask = device.adapter().alignment_mask();
        let limit = device.adapter().max_transfer_length() as usize;
        let check_limit = |len: usize| {
            if len > limit {
                return Err(EngineError::invalid(format!(
                    "{len}-byte data phase exceeds the adapter limit of {limit} bytes"
                )));
            }
            Ok(())
        };

        let mut buffer = match cdb.direction() {
            DataDirection::None => None,
            DataDirection::In => {
                let len = command
                    .transfer_length()
                    .bytes(self.config.default_block_length);
                check_limit(len)?;
                Some(AlignedBuffer::new(len, mask)?)
            },
            DataDirection::Out => {
                let payload = command.parameter_list()?;
                check_limit(payload.len())?;
                trace!(len = payload.len(), data = %hex_dump(&payload), "data out");
                Some(AlignedBuffer::from_slice(&payload, mask)?)
            },
        };
        let expected = buffer.as_ref().map_or(0, AlignedBuffer::requested_len);

        debug!(
            cdb = %hex_dump(cdb.as_bytes()),
            direction = ?cdb.direction(),
            len = expected,
            "issuing CDB"
        );

        let data = match (cdb.direction(), buffer.as_mut()) {
            (DataDirection::In, Some(b)) => DataTransfer::In(b.as_mut_slice()),
            (DataDirection::Out, Some(b)) => DataTransfer::Out(b.as_slice()),
            _ => DataTransfer::None,
        };
        let outcome = self.transport.execute(ScsiRequest {
            path: device.path(),
            cdb: cdb.as_bytes(),
            data,
            timeout: self.config.command_timeout,
            sense_len: self.config.sense_buffer_length,
        });
        let residual_ok = accepts_residual(command);
        let transferred = check_completion(outcome, expected, residual_ok).inspect_err(|e| {
            debug!(opcode = cdb.opcode(), error = %e, "round failed");
        })?;

        match buffer {
            Some(b) if cdb.expects_data_in() => {
                let valid = if residual_ok {
                    transferred.min(expected)
                } else {
                    expected
                };
                let data = &b.payload()[..valid];
                trace!(data = %hex_dump(data), "data in");
                parse(data)
            },
            _ => parse(&[]),
        }
    }
}

/// Commands whose allocation length is only an upper bound: the drive may
/// return less and the parser sees what arrived.
fn accepts_residual(command: &Command) -> bool {
    matches!(
        command,
        Command::RequestSense(_)
            | Command::GetEventStatus(_)
            | Command::GetPerformance(_)
            | Command::ReadTrackInformation(_)
            | Command::ReadBuffer(_)
            | Command::ReadBufferCapacity(_)
    )
}

/// Folds a transport outcome into the engine's result domain.
fn check_completion(
    outcome: Result<Completion, TransportFailure>,
    expected: usize,
    residual_ok: bool,
) -> EngineResult<usize> {
    match outcome {
        Ok(c) => {
            if !c.sense.is_empty() {
                trace!(sense = %hex_dump(&c.sense), status = ?c.status, "sense returned");
            }
            sense::translate(&c.sense)?;
            if !c.status.is_good() {
                return Err(EngineError::DeviceIoFailure {
                    os_code: i32::from(u8::from(c.status)),
                });
            }
            if !residual_ok && c.bytes_transferred < expected {
                return Err(EngineError::UnexpectedShortTransfer {
                    expected,
                    transferred: c.bytes_transferred,
                });
            }
            Ok(c.bytes_transferred)
        },
        Err(f) => {
            if !f.sense.is_empty() {
                trace!(sense = %hex_dump(&f.sense), os_code = f.os_code, "sense returned");
            }
            sense::translate(&f.sense)?;
            if f.bytes_transferred > 0 {
                return Err(EngineError::UnexpectedShortTransfer {
                    expected,
                    transferred: f.bytes_transferred,
                });
            }
            Err(EngineError::DeviceIoFailure { os_code: f.os_code })
        },
    }
}

/// Human-readable name of an operation code, for logs.
pub fn opcode_name(op: u8) -> &'static str {
    match op {
        opcode::TEST_UNIT_READY => "TEST UNIT READY",
        opcode::REQUEST_SENSE => "REQUEST SENSE",
        opcode::FORMAT_UNIT => "FORMAT UNIT",
        opcode::INQUIRY => "INQUIRY",
        opcode::START_STOP_UNIT => "START STOP UNIT",
        opcode::PREVENT_ALLOW_MEDIUM_REMOVAL => "PREVENT ALLOW MEDIUM REMOVAL",
        opcode::READ_CAPACITY => "READ CAPACITY",
        opcode::READ_10 => "READ (10)",
        opcode::WRITE_10 => "WRITE (10)",
        opcode::SEEK_10 => "SEEK (10)",
        opcode::WRITE_AND_VERIFY_10 => "WRITE AND VERIFY (10)",
        opcode::VERIFY_10 => "VERIFY (10)",
        opcode::SYNCHRONIZE_CACHE => "SYNCHRONIZE CACHE",
        opcode::WRITE_BUFFER => "WRITE BUFFER",
        opcode::READ_BUFFER => "READ BUFFER",
        opcode::GET_CONFIGURATION => "GET CONFIGURATION",
        opcode::GET_EVENT_STATUS_NOTIFICATION => "GET EVENT STATUS NOTIFICATION",
        opcode::READ_TRACK_INFORMATION => "READ TRACK INFORMATION",
        opcode::RESERVE_TRACK => "RESERVE TRACK",
        opcode::SEND_OPC_INFORMATION => "SEND OPC INFORMATION",
        opcode::MODE_SELECT_10 => "MODE SELECT (10)",
        opcode::REPAIR_TRACK => "REPAIR TRACK",
        opcode::MODE_SENSE_10 => "MODE SENSE (10)",
        opcode::CLOSE_TRACK_SESSION => "CLOSE TRACK/SESSION",
        opcode::READ_BUFFER_CAPACITY => "READ BUFFER CAPACITY",
        opcode::BLANK => "BLANK",
        opcode::LOAD_UNLOAD_MEDIUM => "LOAD/UNLOAD MEDIUM",
        opcode::SET_READ_AHEAD => "SET READ AHEAD",
        opcode::READ_12 => "READ (12)",
        opcode::WRITE_12 => "WRITE (12)",
        opcode::READ_MEDIA_SERIAL_NUMBER => "READ MEDIA SERIAL NUMBER",
        opcode::GET_PERFORMANCE => "GET PERFORMANCE",
        opcode::SET_STREAMING => "SET STREAMING",
        opcode::SET_CD_SPEED => "SET CD SPEED",
        opcode::MECHANISM_STATUS => "MECHANISM STATUS",
        opcode::READ_CD => "READ CD",
        opcode::SEND_DISC_STRUCTURE => "SEND DISC STRUCTURE",
        _ => "UNKNOWN",
    }
}
