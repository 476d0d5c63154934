use std::time::Duration;

use anyhow::{Context, Result};
use mmc_engine::{
    MmcEngine,
    cfg::{cli::resolve_config_path, config::EngineConfig, logger::init_logger},
};

use crate::unit_tests::common::{Reply, SimulatedDrive, adapter, device};

const CONFIG: &str = "tests/config.yaml";

#[test]
fn test_engine_section_loads() -> Result<()> {
    let cfg = resolve_config_path(CONFIG)
        .and_then(EngineConfig::load_from_file)
        .context("failed to resolve or load config")?;

    assert_eq!(cfg.command_timeout, Duration::from_secs(10));
    assert_eq!(cfg.max_get_config_transfer, 65530);
    assert_eq!(cfg.sense_buffer_length, 32);
    assert_eq!(cfg.request_sense_length, 252);
    assert_eq!(cfg.default_block_length, 2048);
    Ok(())
}

#[test]
fn test_missing_config_file() {
    assert!(resolve_config_path("tests/does_not_exist.yaml").is_err());
}

#[test]
fn test_engine_runs_with_file_config_and_sink() -> Result<()> {
    let cfg = resolve_config_path(CONFIG).and_then(EngineConfig::load_from_file)?;
    let (sink, _guard) = init_logger(CONFIG)?;

    let drive = SimulatedDrive::scripted(adapter(0, 65536), [Reply::Good]);
    let mut engine = MmcEngine::with_config(drive, cfg).with_sink(sink);
    let dev = device(adapter(0, 65536));

    engine.test_unit_ready(&dev)?;
    assert_eq!(engine.transport().exchanges.len(), 1);
    assert_eq!(engine.config().command_timeout, Duration::from_secs(10));
    Ok(())
}
