use anyhow::Result;
use mmc_engine::{
    MmcEngine,
    control_block::{Command, inquiry::Inquiry, opcode},
    error::EngineError,
    models::device::PeripheralDeviceType,
    response::Response,
};

use crate::unit_tests::common::{
    Reply, SimulatedDrive, adapter, device, fixed_sense, honoring_allocation, load_fixture,
};

const INQUIRY_FIXTURE: &str = "tests/unit_tests/fixtures/inquiry_standard.hex";

#[test]
fn test_inquiry_probe_then_fetch_35_bytes() -> Result<()> {
    let data = load_fixture(INQUIRY_FIXTURE)?;
    assert_eq!(data[4], 31);

    let model_data = data.clone();
    let drive = SimulatedDrive::new(adapter(0, 65536), move |cdb| {
        honoring_allocation(cdb, &model_data)
    });
    let mut engine = MmcEngine::new(drive);
    let dev = device(adapter(0, 65536));

    let inquiry = engine.inquiry(&dev)?;

    let cdbs = engine.transport().cdbs();
    assert_eq!(cdbs.len(), 2, "exactly one probe and one fetch");
    assert_eq!(cdbs[0], vec![opcode::INQUIRY, 0, 0, 0, 5, 0]);
    assert_eq!(cdbs[1], vec![opcode::INQUIRY, 0, 0, 0, 35, 0]);
    assert_eq!(engine.transport().exchanges[1].buffer_len, 35);

    assert_eq!(inquiry.device_type, 0x05);
    assert!(inquiry.rmb);
    assert_eq!(inquiry.additional_length, 31);
    assert_eq!(inquiry.vendor, "HL-DT-ST");
    assert_eq!(inquiry.product, "DVDRAM GH24NSD1");
    // byte 35 is not part of the fetched 35 bytes
    assert_eq!(inquiry.revision, "1.0");
    assert_eq!(inquiry.peripheral_type(), PeripheralDeviceType::MMC);
    Ok(())
}

#[test]
fn test_inquiry_through_execute() -> Result<()> {
    let data = load_fixture(INQUIRY_FIXTURE)?;
    let drive = SimulatedDrive::new(adapter(3, 65536), move |cdb| honoring_allocation(cdb, &data));
    let mut engine = MmcEngine::new(drive);
    let dev = device(adapter(3, 65536));

    let response = engine.execute(&dev, &Command::from(Inquiry::standard()))?;
    assert_eq!(response.opcode(), opcode::INQUIRY);
    let Response::Inquiry(inquiry) = response else {
        panic!("expected an INQUIRY response, got {response:?}");
    };
    assert_eq!(inquiry.vendor, "HL-DT-ST");

    // aligned buffers are rounded up: 5 -> 8, 35 -> 36
    let lens: Vec<usize> = engine
        .transport()
        .exchanges
        .iter()
        .map(|e| e.buffer_len)
        .collect();
    assert_eq!(lens, vec![8, 36]);
    Ok(())
}

#[test]
fn test_identify_fills_device() -> Result<()> {
    let data = load_fixture(INQUIRY_FIXTURE)?;
    let drive = SimulatedDrive::new(adapter(0, 65536), move |cdb| honoring_allocation(cdb, &data));
    let mut engine = MmcEngine::new(drive);
    let mut dev = device(adapter(0, 65536));

    engine.identify(&mut dev)?;
    assert_eq!(dev.vendor(), "HL-DT-ST");
    assert_eq!(dev.product(), "DVDRAM GH24NSD1");
    assert_eq!(dev.revision(), "1.0");
    assert_eq!(dev.device_type(), PeripheralDeviceType::MMC);
    Ok(())
}

#[test]
fn test_inquiry_probe_failure_skips_fetch() {
    let drive = SimulatedDrive::scripted(
        adapter(0, 65536),
        [Reply::CheckCondition(fixed_sense(0x02, 0x04, 0x01))],
    );
    let mut engine = MmcEngine::new(drive);
    let dev = device(adapter(0, 65536));

    let err = engine.inquiry(&dev).expect_err("probe fails");
    let code = err.sense_code().expect("sense error");
    assert_eq!((code.sense_key(), code.asc(), code.ascq()), (0x02, 0x04, 0x01));
    assert_eq!(engine.transport().exchanges.len(), 1);
}

#[test]
fn test_inquiry_short_fetch() {
    // probe says 31 more bytes, the fetch only delivers 20
    let mut probe = vec![0u8; 5];
    probe[0] = 0x05;
    probe[4] = 31;
    let drive = SimulatedDrive::scripted(
        adapter(0, 65536),
        [Reply::Data(probe), Reply::Data(vec![0x05; 20])],
    );
    let mut engine = MmcEngine::new(drive);
    let dev = device(adapter(0, 65536));

    assert_eq!(
        engine.inquiry(&dev).expect_err("short"),
        EngineError::UnexpectedShortTransfer {
            expected: 35,
            transferred: 20,
        }
    );
}
