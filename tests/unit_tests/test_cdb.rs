use std::collections::BTreeSet;

use anyhow::Result;
use hex_literal::hex;
use mmc_engine::{
    EngineError,
    control_block::{
        CdbEncoder, Command, DataDirection, TransferLength,
        blank::{Blank, CloseTrackSession, close_function},
        buffer::{ReadBuffer, ReadBufferCapacity, WriteBuffer, buffer_mode},
        disc_structure::{OpcEntry, SendDiscStructure, SendOpcInformation},
        encode,
        event_status::{EventClass, GetEventStatus},
        format_unit::FormatUnit,
        get_configuration::{GetConfiguration, RequestType},
        inquiry::Inquiry,
        medium::{LoadUnloadMedium, MechanismStatus, PreventAllowRemoval, StartStopUnit},
        mod_sense::{ModeSelect10, ModeSense10},
        performance::{
            GetPerformance, PerformanceDescriptor, SetCdSpeed, SetReadAhead, SetStreaming,
        },
        read::{Read10, Read12, ReadCd, Seek, Verify10},
        read_capacity::ReadCapacity,
        request_sense::RequestSense,
        serial_number::ReadMediaSerialNumber,
        test_unit_ready::TestUnitReady,
        track::{ReadTrackInformation, RepairTrack, Reservation, ReserveTrack},
        write::{SynchronizeCache, Write10, Write12, WriteAndVerify10},
    },
};

#[test]
fn test_get_configuration_fields() -> Result<()> {
    let cmd = Command::from(
        GetConfiguration::new(RequestType::From, 0x002D).with_allocation_length(0x0200),
    );
    let cdb = encode(&cmd)?;
    assert_eq!(cdb.as_bytes(), &hex!("46 02 002d 000000 0200 00"));
    assert_eq!(cdb.direction(), DataDirection::In);
    assert_eq!(cmd.transfer_length(), TransferLength::Bytes(512));
    Ok(())
}

#[test]
fn test_reserved_request_type_is_rejected() {
    let cmd = Command::from(GetConfiguration {
        rt: 3,
        start_feature: 0,
        allocation_length: 8,
    });
    assert!(matches!(encode(&cmd), Err(EngineError::InvalidArgument(_))));
}

#[test]
fn test_inquiry_allocation_length() -> Result<()> {
    let cdb = encode(&Command::from(Inquiry::standard().with_allocation_length(35)))?;
    assert_eq!(cdb.as_bytes(), &hex!("12 00 00 0023 00"));
    assert_eq!(cdb.len(), 6);
    Ok(())
}

#[test]
fn test_read_cd_raw_sectors() -> Result<()> {
    let cmd = Command::from(ReadCd::raw(16, 2));
    let cdb = encode(&cmd)?;
    assert_eq!(cdb.as_bytes(), &hex!("be 00 00000010 000002 f8 00 00"));
    assert_eq!(cmd.transfer_length().bytes(2048), 2 * 2352);
    Ok(())
}

#[test]
fn test_read12_is_sized_in_blocks() -> Result<()> {
    let cmd = Command::from(Read12 {
        fua: false,
        lba: 0x10,
        blocks: 4,
        streaming: true,
    });
    let cdb = encode(&cmd)?;
    assert_eq!(cdb.opcode(), 0xA8);
    assert_eq!(&cdb.as_bytes()[6..10], &[0, 0, 0, 4]);
    assert_eq!(cdb.as_bytes()[10] & 0x80, 0x80);
    assert_eq!(cmd.transfer_length().bytes(2048), 8192);
    Ok(())
}

#[test]
fn test_track_information_by_number() -> Result<()> {
    let cdb = encode(&Command::from(ReadTrackInformation::track(1)))?;
    assert_eq!(cdb.as_bytes(), &hex!("52 01 00000001 00 0030 00"));
    Ok(())
}

#[test]
fn test_set_cd_speed_has_no_data_phase() -> Result<()> {
    let cmd = Command::from(SetCdSpeed {
        rotation_control: 0,
        read_speed: SetCdSpeed::MAX_SPEED,
        write_speed: 1764,
    });
    let cdb = encode(&cmd)?;
    assert_eq!(cdb.as_bytes(), &hex!("bb 00 ffff 06e4 000000000000"));
    assert_eq!(cdb.direction(), DataDirection::None);
    assert!(!cdb.expects_data_in() && !cdb.expects_data_out());
    Ok(())
}

#[test]
fn test_write_payload_must_match_blocks() {
    let empty = Write10::new(0, 0, Vec::new());
    assert!(encode(&Command::from(empty.clone())).is_ok());

    let orphan = Write10 {
        data: vec![0; 2048],
        ..empty
    };
    assert!(matches!(
        encode(&Command::from(orphan)),
        Err(EngineError::InvalidArgument(_))
    ));

    for len in [3000, 2048, 6144] {
        let wrong = Write10::new(0, 2, vec![0; len]);
        assert!(
            matches!(encode(&Command::from(wrong)), Err(EngineError::InvalidArgument(_))),
            "{len} bytes for two blocks"
        );
    }

    let raw = Write10 {
        block_length: 2352,
        ..Write10::new(0, 2, vec![0; 2 * 2352])
    };
    assert!(encode(&Command::from(raw)).is_ok());
}

/// Name of the variant; exhaustive so a new command cannot skip the table.
fn variant(command: &Command) -> &'static str {
    match command {
        Command::Blank(_) => "Blank",
        Command::CloseTrackSession(_) => "CloseTrackSession",
        Command::FormatUnit(_) => "FormatUnit",
        Command::GetConfiguration(_) => "GetConfiguration",
        Command::GetEventStatus(_) => "GetEventStatus",
        Command::GetPerformance(_) => "GetPerformance",
        Command::Inquiry(_) => "Inquiry",
        Command::LoadUnloadMedium(_) => "LoadUnloadMedium",
        Command::MechanismStatus(_) => "MechanismStatus",
        Command::ModeSense10(_) => "ModeSense10",
        Command::ModeSelect10(_) => "ModeSelect10",
        Command::PreventAllowRemoval(_) => "PreventAllowRemoval",
        Command::Read10(_) => "Read10",
        Command::Read12(_) => "Read12",
        Command::ReadBuffer(_) => "ReadBuffer",
        Command::ReadBufferCapacity(_) => "ReadBufferCapacity",
        Command::ReadCapacity(_) => "ReadCapacity",
        Command::ReadCd(_) => "ReadCd",
        Command::ReadMediaSerialNumber(_) => "ReadMediaSerialNumber",
        Command::ReadTrackInformation(_) => "ReadTrackInformation",
        Command::RepairTrack(_) => "RepairTrack",
        Command::RequestSense(_) => "RequestSense",
        Command::ReserveTrack(_) => "ReserveTrack",
        Command::Seek(_) => "Seek",
        Command::SendDiscStructure(_) => "SendDiscStructure",
        Command::SendOpcInformation(_) => "SendOpcInformation",
        Command::SetCdSpeed(_) => "SetCdSpeed",
        Command::SetReadAhead(_) => "SetReadAhead",
        Command::SetStreaming(_) => "SetStreaming",
        Command::StartStopUnit(_) => "StartStopUnit",
        Command::SynchronizeCache(_) => "SynchronizeCache",
        Command::TestUnitReady(_) => "TestUnitReady",
        Command::Verify10(_) => "Verify10",
        Command::Write10(_) => "Write10",
        Command::Write12(_) => "Write12",
        Command::WriteAndVerify10(_) => "WriteAndVerify10",
        Command::WriteBuffer(_) => "WriteBuffer",
    }
}

/// One entry per command: the command, its CDB and its data direction.
fn cdb_table() -> Vec<(Command, Vec<u8>, DataDirection)> {
    use DataDirection as D;

    vec![
        (
            Blank {
                immed: true,
                blanking_type: 0x02,
                start_address: 0x0001_2345,
            }
            .into(),
            hex!("a1 12 00012345 000000000000").to_vec(),
            D::None,
        ),
        (
            CloseTrackSession {
                immed: true,
                close_function: close_function::CLOSE_SESSION,
                number: 0x0102,
            }
            .into(),
            hex!("5b 01 02 00 0102 00000000").to_vec(),
            D::None,
        ),
        (
            FormatUnit {
                cmplist: true,
                ..FormatUnit::default()
            }
            .into(),
            hex!("04 19 00000000").to_vec(),
            D::Out,
        ),
        (
            GetConfiguration::new(RequestType::Current, 0x0107)
                .with_allocation_length(0x0020)
                .into(),
            hex!("46 01 0107 000000 0020 00").to_vec(),
            D::In,
        ),
        (
            GetEventStatus::polled(EventClass::MEDIA).into(),
            hex!("4a 01 0000 10 0000 0008 00").to_vec(),
            D::In,
        ),
        (
            GetPerformance::write_speeds(4).into(),
            hex!("ac 00 00000000 0000 0004 03 00").to_vec(),
            D::In,
        ),
        (
            Inquiry::standard().with_allocation_length(0x24).into(),
            hex!("12 00 00 0024 00").to_vec(),
            D::In,
        ),
        (
            LoadUnloadMedium {
                immed: true,
                load_unload: true,
                start: false,
                slot: 3,
            }
            .into(),
            hex!("a6 01 0000 02 000000 03 000000").to_vec(),
            D::None,
        ),
        (
            MechanismStatus {
                allocation_length: 0x0010,
            }
            .into(),
            hex!("bd 00 00000000 0000 0010 0000").to_vec(),
            D::In,
        ),
        (
            ModeSense10 {
                dbd: true,
                page_control: 0x02,
                page_code: 0x2A,
                allocation_length: 0x00FF,
            }
            .into(),
            hex!("5a 08 aa 00000000 00ff 00").to_vec(),
            D::In,
        ),
        (
            ModeSelect10 {
                pf: true,
                sp: false,
                pages: vec![0x05, 0x02, 0xAA, 0xBB],
            }
            .into(),
            hex!("55 10 0000000000 000c 00").to_vec(),
            D::Out,
        ),
        (
            PreventAllowRemoval {
                persistent: false,
                prevent: true,
            }
            .into(),
            hex!("1e 000000 01 00").to_vec(),
            D::None,
        ),
        (
            Read10 {
                fua: true,
                lba: 0x0102_0304,
                blocks: 0x0010,
            }
            .into(),
            hex!("28 08 01020304 00 0010 00").to_vec(),
            D::In,
        ),
        (
            Read12 {
                fua: false,
                lba: 0x10,
                blocks: 0x20,
                streaming: true,
            }
            .into(),
            hex!("a8 00 00000010 00000020 80 00").to_vec(),
            D::In,
        ),
        (
            ReadBuffer {
                mode: buffer_mode::DATA,
                buffer_id: 1,
                buffer_offset: 0x000100,
                allocation_length: 0x001000,
            }
            .into(),
            hex!("3c 02 01 000100 001000 00").to_vec(),
            D::In,
        ),
        (
            ReadBufferCapacity { block: true }.into(),
            hex!("5c 01 0000000000 000c 00").to_vec(),
            D::In,
        ),
        (
            ReadCapacity.into(),
            hex!("25 000000000000000000").to_vec(),
            D::In,
        ),
        (
            ReadCd::raw(0x10, 2).into(),
            hex!("be 00 00000010 000002 f8 00 00").to_vec(),
            D::In,
        ),
        (
            ReadMediaSerialNumber {
                allocation_length: 0x0104,
            }
            .into(),
            hex!("ab 01 00000000 00000104 0000").to_vec(),
            D::In,
        ),
        (
            ReadTrackInformation {
                open: true,
                address_type: 0x00,
                address: 0x1000,
                allocation_length: 0x30,
            }
            .into(),
            hex!("52 04 00001000 00 0030 00").to_vec(),
            D::In,
        ),
        (
            RepairTrack {
                immed: true,
                track_number: 5,
            }
            .into(),
            hex!("58 01 0000 0005 00000000").to_vec(),
            D::None,
        ),
        (
            RequestSense {
                desc: true,
                allocation_length: 0xFC,
            }
            .into(),
            hex!("03 01 0000 fc 00").to_vec(),
            D::In,
        ),
        (
            ReserveTrack {
                rmz: false,
                reservation: Reservation::Size(0x0001_2000),
            }
            .into(),
            hex!("53 00 000000 00012000 00").to_vec(),
            D::None,
        ),
        (
            ReserveTrack {
                rmz: true,
                reservation: Reservation::Lba(0x1234),
            }
            .into(),
            hex!("53 03 00001234 00000000").to_vec(),
            D::None,
        ),
        (
            Seek { lba: 0x00AB_CDEF }.into(),
            hex!("2b 00 00abcdef 00 0000 00").to_vec(),
            D::None,
        ),
        (
            SendDiscStructure::write_protection(true).into(),
            hex!("bf 00 0000000000 c0 0008 0000").to_vec(),
            D::Out,
        ),
        (
            SendOpcInformation {
                do_opc: true,
                exclude0: true,
                exclude1: false,
                entries: vec![OpcEntry {
                    speed: 0x0010,
                    values: [1, 2, 3, 4, 5, 6],
                }],
            }
            .into(),
            hex!("54 01 01 00000000 0008 00").to_vec(),
            D::Out,
        ),
        (
            SetCdSpeed {
                rotation_control: 1,
                read_speed: 0x02C2,
                write_speed: SetCdSpeed::MAX_SPEED,
            }
            .into(),
            hex!("bb 01 02c2 ffff 000000000000").to_vec(),
            D::None,
        ),
        (
            SetReadAhead {
                trigger_lba: 0x100,
                read_ahead_lba: 0x200,
            }
            .into(),
            hex!("a7 00 00000100 00000200 0000").to_vec(),
            D::None,
        ),
        (
            SetStreaming {
                descriptor: PerformanceDescriptor::default(),
            }
            .into(),
            hex!("b6 00 00000000 0000 00 001c 00").to_vec(),
            D::Out,
        ),
        (
            StartStopUnit::load().into(),
            hex!("1b 000000 03 00").to_vec(),
            D::None,
        ),
        (
            SynchronizeCache {
                immed: true,
                lba: 0x40,
                blocks: 8,
            }
            .into(),
            hex!("35 02 00000040 00 0008 00").to_vec(),
            D::None,
        ),
        (TestUnitReady.into(), hex!("00 0000000000").to_vec(), D::None),
        (
            Verify10 {
                lba: 0x20,
                g3_timeout: true,
                blocks: 3,
            }
            .into(),
            hex!("2f 00 00000020 01 0003 00").to_vec(),
            D::None,
        ),
        (
            Write10 {
                fua: true,
                ..Write10::new(0x30, 1, vec![0; 2048])
            }
            .into(),
            hex!("2a 08 00000030 00 0001 00").to_vec(),
            D::Out,
        ),
        (
            Write12 {
                fua: false,
                tsr: true,
                lba: 0x31,
                blocks: 2,
                streaming: true,
                block_length: 2048,
                data: vec![0; 4096],
            }
            .into(),
            hex!("aa 04 00000031 00000002 80 00").to_vec(),
            D::Out,
        ),
        (
            WriteAndVerify10 {
                lba: 0x32,
                blocks: 1,
                block_length: 2048,
                data: vec![0; 2048],
            }
            .into(),
            hex!("2e 00 00000032 00 0001 00").to_vec(),
            D::Out,
        ),
        (
            WriteBuffer {
                mode: buffer_mode::DATA,
                buffer_id: 0,
                buffer_offset: 0x10,
                data: vec![0xEE; 0x20],
            }
            .into(),
            hex!("3b 02 00 000010 000020 00").to_vec(),
            D::Out,
        ),
    ]
}

#[test]
fn test_every_command_encodes_exactly() -> Result<()> {
    let mut covered = BTreeSet::new();
    for (command, expected, direction) in cdb_table() {
        let name = variant(&command);
        let cdb = encode(&command)?;

        assert_eq!(cdb.as_bytes(), &expected[..], "{name}");
        assert!(matches!(cdb.len(), 6 | 10 | 12), "{name}");
        assert_eq!(cdb.opcode(), command.opcode(), "{name}");
        assert_eq!(cdb.direction(), direction, "{name}");
        if direction == DataDirection::Out {
            assert_eq!(
                command.parameter_list()?.len(),
                command.transfer_length().bytes(2048),
                "{name}"
            );
        }
        covered.insert(name);
    }
    assert_eq!(covered.len(), 37, "commands without a table entry");
    Ok(())
}

#[test]
fn test_big_endian_fields_decode_back() -> Result<()> {
    let be32 = |b: &[u8], i: usize| u32::from_be_bytes([b[i], b[i + 1], b[i + 2], b[i + 3]]);
    let be16 = |b: &[u8], i: usize| u16::from_be_bytes([b[i], b[i + 1]]);

    for lba in [0, 1, 0x0000_FFFF, 0x0102_0304, u32::MAX] {
        for blocks in [0u16, 1, 0x1234, u16::MAX] {
            let fua = blocks % 2 == 1;
            let cdb = encode(&Command::from(Read10 { fua, lba, blocks }))?;
            assert_eq!(be32(cdb.as_bytes(), 2), lba);
            assert_eq!(be16(cdb.as_bytes(), 7), blocks);
            assert_eq!(cdb.as_bytes()[1] & 0x08 != 0, fua);

            let cdb = encode(&Command::from(Verify10 {
                lba,
                g3_timeout: fua,
                blocks,
            }))?;
            assert_eq!(be32(cdb.as_bytes(), 2), lba);
            assert_eq!(be16(cdb.as_bytes(), 7), blocks);
            assert_eq!(cdb.as_bytes()[6] & 0x01 != 0, fua);
        }

        let cdb = encode(&Command::from(SetReadAhead {
            trigger_lba: lba,
            read_ahead_lba: !lba,
        }))?;
        assert_eq!(be32(cdb.as_bytes(), 2), lba);
        assert_eq!(be32(cdb.as_bytes(), 6), !lba);

        let cdb = encode(&Command::from(Seek { lba }))?;
        assert_eq!(be32(cdb.as_bytes(), 2), lba);
    }
    Ok(())
}
