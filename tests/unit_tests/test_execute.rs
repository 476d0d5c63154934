use anyhow::Result;
use hex_literal::hex;
use mmc_engine::{
    MmcEngine,
    control_block::{
        CdbEncoder, Command,
        blank::{Blank, BlankingType},
        event_status::{EventClass, GetEventStatus},
        medium::{MechanismStatus, StartStopUnit},
        mod_sense::ModeSense10,
        opcode,
        read::Read10,
        read_capacity::ReadCapacity,
        request_sense::RequestSense,
        serial_number::ReadMediaSerialNumber,
        test_unit_ready::TestUnitReady,
        write::Write10,
    },
    error::EngineError,
    response::Response,
    transport::ScsiStatus,
};

use crate::unit_tests::common::{
    Reply, SimulatedDrive, adapter, allocation_length, device, fixed_sense, honoring_allocation,
};

fn engine_with(replies: impl IntoIterator<Item = Reply>) -> MmcEngine<SimulatedDrive> {
    MmcEngine::new(SimulatedDrive::scripted(adapter(0, 65536), replies))
}

#[test]
fn test_non_data_commands_complete() -> Result<()> {
    let commands = [
        Command::from(TestUnitReady),
        Command::from(StartStopUnit::eject()),
        Command::from(Blank::new(BlankingType::MinimalBlankDisc, true)),
    ];
    let mut engine = engine_with(commands.iter().map(|_| Reply::Good));
    let dev = device(adapter(0, 65536));

    for command in &commands {
        let response = engine.execute(&dev, command)?;
        assert!(matches!(response, Response::Completion(_)));
        assert_eq!(response.opcode(), command.opcode());
    }
    let exchanges = &engine.transport().exchanges;
    assert_eq!(exchanges.len(), 3);
    assert!(exchanges.iter().all(|e| e.buffer_len == 0));
    assert_eq!(exchanges[1].cdb, vec![opcode::START_STOP_UNIT, 0, 0, 0, 0x02, 0]);
    Ok(())
}

#[test]
fn test_write_sends_payload() -> Result<()> {
    let mut engine = engine_with([Reply::Good]);
    let dev = device(adapter(0, 65536));
    let data = vec![0x5A; 4096];

    let write = Write10 {
        fua: true,
        ..Write10::new(0x0102_0304, 2, data.clone())
    };
    engine.execute(&dev, &Command::from(write))?;

    let e = &engine.transport().exchanges[0];
    assert_eq!(e.cdb, hex!("2a 08 01020304 00 0002 00").to_vec());
    assert_eq!(e.data_out, data);
    Ok(())
}

#[test]
fn test_read_capacity() -> Result<()> {
    let mut engine = engine_with([Reply::Data(hex!("0023 0fff 0000 0800").to_vec())]);
    let dev = device(adapter(0, 65536));

    let Response::Capacity(cap) = engine.execute(&dev, &Command::from(ReadCapacity))? else {
        panic!("expected READ CAPACITY data");
    };
    assert_eq!(cap.last_lba, 0x0023_0FFF);
    assert_eq!(cap.block_length, 2048);
    assert_eq!(cap.total_bytes(), (0x0023_0FFF + 1) * 2048);
    Ok(())
}

#[test]
fn test_read_blocks_and_short_read() -> Result<()> {
    let mut engine = engine_with([Reply::Data(vec![0x11; 2048]), Reply::Data(vec![0x22; 1000])]);
    let dev = device(adapter(0, 65536));
    let read = Command::from(Read10 {
        fua: false,
        lba: 32,
        blocks: 1,
    });

    let Response::Data(data) = engine.execute(&dev, &read)? else {
        panic!("expected block data");
    };
    assert_eq!(data.header.opcode, opcode::READ_10);
    assert_eq!(&data.data[..], &[0x11; 2048][..]);

    assert_eq!(
        engine.execute(&dev, &read),
        Err(EngineError::UnexpectedShortTransfer {
            expected: 2048,
            transferred: 1000,
        })
    );
    Ok(())
}

#[test]
fn test_request_sense_accepts_residual() -> Result<()> {
    let mut engine = engine_with([Reply::Data(fixed_sense(0x02, 0x04, 0x04))]);
    let dev = device(adapter(0, 65536));

    let sense = engine.request_sense(&dev)?;
    assert_eq!(sense.code().raw(), 0x02_04_04);
    assert!(sense.fixed.is_some());

    let cdb = &engine.transport().exchanges[0].cdb;
    assert_eq!(allocation_length(cdb), 252);
    Ok(())
}

#[test]
fn test_request_sense_through_execute() -> Result<()> {
    let mut engine = engine_with([Reply::Data(vec![0x72, 0x06, 0x29, 0x00, 0, 0, 0, 0])]);
    let dev = device(adapter(0, 65536));

    let Response::RequestSense(sense) = engine.execute(&dev, &Command::from(RequestSense::fixed(96)))?
    else {
        panic!("expected sense data");
    };
    assert_eq!(sense.code().asc(), 0x29);
    assert!(sense.fixed.is_none(), "descriptor format has no fixed block");
    Ok(())
}

#[test]
fn test_event_status_without_event() -> Result<()> {
    let mut engine = engine_with([Reply::Data(hex!("0002 80 5e").to_vec())]);
    let dev = device(adapter(0, 65536));

    let command = Command::from(GetEventStatus::polled(EventClass::MEDIA));
    let Response::EventStatus(status) = engine.execute(&dev, &command)? else {
        panic!("expected event status");
    };
    assert!(status.nea);
    assert!(status.event.is_none());
    Ok(())
}

#[test]
fn test_mode_sense_probe_then_fetch() -> Result<()> {
    let data = hex!("000c 0000 0000 0000 2a04 01020304").to_vec();
    let drive = SimulatedDrive::new(adapter(0, 65536), move |cdb| honoring_allocation(cdb, &data));
    let mut engine = MmcEngine::new(drive);
    let dev = device(adapter(0, 65536));

    let command = Command::from(ModeSense10::current(0x2A));
    let Response::ModeSense(mode) = engine.execute(&dev, &command)? else {
        panic!("expected mode data");
    };
    assert_eq!(mode.mode_data_length, 12);
    assert!(mode.page(0x2A).is_some());

    let allocs: Vec<usize> = engine
        .transport()
        .exchanges
        .iter()
        .map(|e| allocation_length(&e.cdb))
        .collect();
    assert_eq!(allocs, vec![8, 14]);
    Ok(())
}

#[test]
fn test_mechanism_status_probe_then_fetch() -> Result<()> {
    let data = hex!("21 a1 000123 02 0008 80000000 01030000").to_vec();
    let drive = SimulatedDrive::new(adapter(0, 65536), move |cdb| honoring_allocation(cdb, &data));
    let mut engine = MmcEngine::new(drive);
    let dev = device(adapter(0, 65536));

    let Response::MechanismStatus(status) =
        engine.execute(&dev, &Command::from(MechanismStatus::default()))?
    else {
        panic!("expected mechanism status");
    };
    assert_eq!(status.slots.len(), 2);
    assert!(status.slots[0].disc_present);

    let allocs: Vec<usize> = engine
        .transport()
        .cdbs()
        .iter()
        .map(|cdb| allocation_length(cdb))
        .collect();
    assert_eq!(allocs, vec![8, 16]);
    Ok(())
}

#[test]
fn test_media_serial_number_probe_then_fetch() -> Result<()> {
    let mut data = vec![0, 0, 0, 6];
    data.extend_from_slice(b"SN1234");
    let drive = SimulatedDrive::new(adapter(0, 65536), move |cdb| honoring_allocation(cdb, &data));
    let mut engine = MmcEngine::new(drive);
    let dev = device(adapter(0, 65536));

    let msn = engine.media_serial_number(&dev)?;
    assert_eq!(msn.as_ascii(), Some("SN1234"));

    let response = engine.execute(&dev, &Command::from(ReadMediaSerialNumber::default()))?;
    assert_eq!(response.opcode(), opcode::READ_MEDIA_SERIAL_NUMBER);

    let allocs: Vec<usize> = engine
        .transport()
        .cdbs()
        .iter()
        .map(|cdb| allocation_length(cdb))
        .collect();
    assert_eq!(allocs, vec![4, 10, 4, 10]);
    Ok(())
}

#[test]
fn test_busy_status_is_io_failure() {
    let mut engine = engine_with([Reply::Status(ScsiStatus::Busy)]);
    let dev = device(adapter(0, 65536));

    assert_eq!(
        engine.execute(&dev, &Command::from(TestUnitReady)),
        Err(EngineError::DeviceIoFailure { os_code: 0x08 })
    );
}

#[test]
fn test_invalid_commands_never_reach_the_drive() {
    let mut engine = engine_with([]);
    let dev = device(adapter(0, 65536));

    let bad_blank = Blank {
        immed: false,
        blanking_type: 0x07,
        start_address: 0,
    };
    // 3000 bytes is two 1500-byte blocks, not two 2048-byte ones
    let bad_writes = [3000, 3001, 2048].map(|len| Write10::new(0, 2, vec![0; len]));
    let commands = std::iter::once(Command::from(bad_blank))
        .chain(bad_writes.into_iter().map(Command::from));
    for command in commands {
        assert!(matches!(
            engine.execute(&dev, &command),
            Err(EngineError::InvalidArgument(_))
        ));
    }
    assert!(engine.transport().exchanges.is_empty());
}

#[test]
fn test_timeout_and_sense_length_come_from_config() -> Result<()> {
    let mut engine = engine_with([Reply::Good]);
    let dev = device(adapter(0, 65536));

    engine.test_unit_ready(&dev)?;
    let e = &engine.transport().exchanges[0];
    assert_eq!(e.sense_len, engine.config().sense_buffer_length);
    assert_eq!(e.path, *dev.path());
    Ok(())
}

#[test]
fn test_reported_length_beyond_adapter_limit() {
    // serial number length of 1 MiB against a 64 KiB adapter
    let header = hex!("00100000").to_vec();
    let drive = SimulatedDrive::new(adapter(0, 65536), move |cdb| honoring_allocation(cdb, &header));
    let mut engine = MmcEngine::new(drive);
    let dev = device(adapter(0, 65536));

    assert!(matches!(
        engine.media_serial_number(&dev),
        Err(EngineError::ProtocolViolation(_))
    ));
    assert_eq!(engine.transport().exchanges.len(), 1, "only the header round");
}

#[test]
fn test_requested_length_beyond_adapter_limit() {
    let mut engine = engine_with([]);
    let dev = device(adapter(0, 4096));

    let read = Command::from(Read10 {
        fua: false,
        lba: 0,
        blocks: 3,
    });
    let write = Command::from(Write10::new(0, 3, vec![0; 3 * 2048]));
    for command in [read, write] {
        assert!(matches!(
            engine.execute(&dev, &command),
            Err(EngineError::InvalidArgument(_))
        ));
    }
    assert!(engine.transport().exchanges.is_empty());
}
