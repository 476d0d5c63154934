use std::{
    io,
    sync::{Arc, Mutex},
};

use anyhow::Result;
use mmc_engine::{
    EngineError, MmcEngine, enumerate_devices,
    error::EngineResult,
    models::device::{DevicePath, PeripheralDeviceType},
    transport::DeviceEnumerator,
};
use tracing::{Dispatch, Level};
use tracing_subscriber::fmt::MakeWriter;

use crate::unit_tests::common::{
    FixedEnumerator, Reply, SimulatedDrive, adapter, allocation_length, configuration_data,
    feature_descriptor, fixed_sense, honoring_allocation, load_fixture,
};

/// Answers like a ready drive, except that the `failing`-th INQUIRY probe
/// reports NOT READY.
fn drive_failing_probe(failing: usize) -> Result<SimulatedDrive> {
    let inquiry = load_fixture("tests/unit_tests/fixtures/inquiry_standard.hex")?;
    let descriptors = [feature_descriptor(0x0001, 8), feature_descriptor(0x0003, 4)];
    // DATA LENGTH counts 4 bytes of padding after the two descriptors
    let config = configuration_data(28, 0x0010, &descriptors, 32);

    let mut probes = 0;
    Ok(SimulatedDrive::new(adapter(3, 65536), move |cdb| match cdb[0] {
        0x12 => {
            if allocation_length(cdb) == 5 {
                probes += 1;
                if probes == failing {
                    return Reply::CheckCondition(fixed_sense(0x02, 0x04, 0x01));
                }
            }
            honoring_allocation(cdb, &inquiry)
        },
        0x46 => honoring_allocation(cdb, &config),
        other => panic!("unexpected opcode {other:#04x}"),
    }))
}

fn paths(names: &[&str]) -> Vec<DevicePath> {
    names.iter().copied().map(DevicePath::from).collect()
}

#[test]
fn test_failing_drive_is_skipped() -> Result<()> {
    let mut engine = MmcEngine::new(drive_failing_probe(2)?);
    let mut enumerator = FixedEnumerator(paths(&["/dev/sr0", "/dev/sr1", "/dev/sr2"]));

    let devices = enumerate_devices(&mut engine, &mut enumerator)?;

    let found: Vec<&str> = devices.iter().map(|d| d.path().as_str()).collect();
    assert_eq!(found, vec!["/dev/sr0", "/dev/sr2"]);
    for d in &devices {
        assert_eq!(d.vendor(), "HL-DT-ST");
        assert_eq!(d.device_type(), PeripheralDeviceType::MMC);
        assert!(d.has_feature(0x0001));
        assert!(d.has_feature(0x0003));
        assert_eq!(d.current_profile(), 0x0010);
        assert_eq!(d.adapter().alignment_mask(), 3);
    }

    // sr1 stopped after its probe
    let sr1: Vec<u8> = engine
        .transport()
        .exchanges
        .iter()
        .filter(|e| e.path.as_str() == "/dev/sr1")
        .map(|e| e.opcode())
        .collect();
    assert_eq!(sr1, vec![0x12]);
    Ok(())
}

#[test]
fn test_no_drives() -> Result<()> {
    let mut engine = MmcEngine::new(drive_failing_probe(0)?);
    let devices = enumerate_devices(&mut engine, &mut FixedEnumerator(Vec::new()))?;
    assert!(devices.is_empty());
    assert!(engine.transport().exchanges.is_empty());
    Ok(())
}

struct BrokenEnumerator;

impl DeviceEnumerator for BrokenEnumerator {
    fn enumerate(&mut self) -> EngineResult<Vec<DevicePath>> {
        Err(EngineError::DeviceIoFailure { os_code: 2 })
    }
}

#[test]
fn test_enumerator_failure_propagates() -> Result<()> {
    let mut engine = MmcEngine::new(drive_failing_probe(0)?);
    assert_eq!(
        enumerate_devices(&mut engine, &mut BrokenEnumerator),
        Err(EngineError::DeviceIoFailure { os_code: 2 })
    );
    Ok(())
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        let buf = self.0.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if let Ok(mut b) = self.0.lock() {
            b.extend_from_slice(data);
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn test_records_go_to_the_engine_sink() -> Result<()> {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(captured.clone())
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .finish();

    let mut engine = MmcEngine::new(drive_failing_probe(1)?).with_sink(Dispatch::new(subscriber));
    let mut enumerator = FixedEnumerator(paths(&["/dev/sr0", "/dev/sr1"]));
    let devices = enumerate_devices(&mut engine, &mut enumerator)?;
    assert_eq!(devices.len(), 1);

    let text = captured.text();
    assert!(text.contains("skipping drive"), "{text}");
    assert!(text.contains("drive ready"), "{text}");
    assert!(text.contains("GET CONFIGURATION done"), "{text}");
    Ok(())
}
