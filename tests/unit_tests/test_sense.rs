use anyhow::Result;
use mmc_engine::{
    MmcEngine, UnifiedCode,
    control_block::{Command, read_capacity::ReadCapacity},
    error::EngineError,
    models::sense::{SenseKey, SenseRecord, translate},
    transport::TransportFailure,
};

use crate::unit_tests::common::{
    Reply, SimulatedDrive, adapter, descriptor_sense, device, fixed_sense, load_fixture,
};

const NO_MEDIUM_FIXTURE: &str = "tests/unit_tests/fixtures/sense_not_ready_no_medium.hex";

#[test]
fn test_fixture_decodes_to_medium_not_present() -> Result<()> {
    let sense = load_fixture(NO_MEDIUM_FIXTURE)?;
    let rec = SenseRecord::parse(&sense).expect("fixed sense");
    assert_eq!(rec.key(), SenseKey::NotReady);

    let err = translate(&sense).expect_err("not ready");
    let code = err.sense_code().expect("sense error");
    assert_eq!(code, UnifiedCode::new(0x02, 0x3A, 0x01));
    assert_eq!(code.raw(), 0x02_3A_01);
    Ok(())
}

#[test]
fn test_both_formats_fold_to_same_code() {
    for (sk, asc, ascq) in [(0x02, 0x3A, 0x00), (0x05, 0x24, 0x00), (0x06, 0x28, 0x00), (0x03, 0x11, 0x05)] {
        let fixed = translate(&fixed_sense(sk, asc, ascq));
        let descriptor = translate(&descriptor_sense(sk, asc, ascq));
        assert_eq!(fixed, descriptor, "{sk:x}/{asc:02x}/{ascq:02x}");
        assert_eq!(fixed, Err(EngineError::SenseError(UnifiedCode::new(sk, asc, ascq))));
    }
}

#[test]
fn test_translation_is_deterministic() {
    let sense = fixed_sense(0x04, 0x44, 0x00);
    let first = translate(&sense);
    for _ in 0..8 {
        assert_eq!(translate(&sense), first);
    }
}

#[test]
fn test_no_sense_is_success() {
    assert_eq!(translate(&[]), Ok(()));
    assert_eq!(translate(&fixed_sense(0, 0, 0)), Ok(()));
    assert_eq!(translate(&descriptor_sense(0, 0, 0)), Ok(()));
    // not a sense response code at all
    assert_eq!(translate(&[0x00; 18]), Ok(()));
}

#[test]
fn test_sense_wins_over_good_status() {
    let drive = SimulatedDrive::scripted(
        adapter(0, 65536),
        [Reply::GoodWithSense(fixed_sense(0x01, 0x17, 0x01))],
    );
    let mut engine = MmcEngine::new(drive);
    let dev = device(adapter(0, 65536));

    let err = engine
        .execute(&dev, &Command::from(ReadCapacity))
        .expect_err("recovered error still reported");
    assert_eq!(err.sense_code(), Some(UnifiedCode::new(0x01, 0x17, 0x01)));
}

#[test]
fn test_check_condition_through_engine() -> Result<()> {
    let sense = load_fixture(NO_MEDIUM_FIXTURE)?;
    let drive = SimulatedDrive::scripted(adapter(0, 65536), [Reply::CheckCondition(sense)]);
    let mut engine = MmcEngine::new(drive);
    let dev = device(adapter(0, 65536));

    let err = engine.test_unit_ready(&dev).expect_err("no medium");
    let code = err.sense_code().expect("sense error");
    assert_eq!((code.sense_key(), code.asc(), code.ascq()), (0x02, 0x3A, 0x01));
    assert!(!code.description().is_empty());
    Ok(())
}

#[test]
fn test_transport_failure_with_sense_is_sense_error() {
    let failure = TransportFailure {
        os_code: 121,
        bytes_transferred: 0,
        sense: descriptor_sense(0x0B, 0x47, 0x00),
    };
    let drive = SimulatedDrive::scripted(adapter(0, 65536), [Reply::Failure(failure)]);
    let mut engine = MmcEngine::new(drive);
    let dev = device(adapter(0, 65536));

    assert_eq!(
        engine.test_unit_ready(&dev),
        Err(EngineError::SenseError(UnifiedCode::new(0x0B, 0x47, 0x00)))
    );
}

#[test]
fn test_transport_failure_without_sense_keeps_os_code() {
    let drive = SimulatedDrive::scripted(
        adapter(0, 65536),
        [Reply::Failure(TransportFailure::os(5))],
    );
    let mut engine = MmcEngine::new(drive);
    let dev = device(adapter(0, 65536));

    assert_eq!(
        engine.test_unit_ready(&dev),
        Err(EngineError::DeviceIoFailure { os_code: 5 })
    );
}
