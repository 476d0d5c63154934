// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use tracing::{info, warn};

use crate::{
    engine::MmcEngine,
    error::EngineResult,
    models::device::{Device, DevicePath},
    transport::{DeviceEnumerator, ScsiTransport},
};

impl<T: ScsiTransport> MmcEngine<T> {
    /// Builds a fully populated [`Device`] for `path`: adapter limits,
    /// INQUIRY identity, then the feature set.
    pub fn materialize(&mut self, path: DevicePath) -> EngineResult<Device> {
        let adapter = self.transport_mut().adapter_limits(&path)?;
        let mut device = Device::new(path, adapter);
        self.identify(&mut device)?;
        self.load_features(&mut device)?;
        Ok(device)
    }
}

/// Materializes every drive `enumerator` reports, in its order.
///
/// A drive that fails is logged and left out; the call fails only when the
/// enumerator itself does.
pub fn enumerate_devices<T, E>(
    engine: &mut MmcEngine<T>,
    enumerator: &mut E,
) -> EngineResult<Vec<Device>>
where
    T: ScsiTransport,
    E: DeviceEnumerator + ?Sized,
{
    let paths = enumerator.enumerate()?;
    engine.scoped(|engine| {
        let mut devices = Vec::with_capacity(paths.len());
        for path in paths {
            match engine.materialize(path.clone()) {
                Ok(device) => {
                    info!(
                        device = %path,
                        vendor = device.vendor(),
                        product = device.product(),
                        features = device.features().len(),
                        "drive ready"
                    );
                    devices.push(device);
                },
                Err(e) => warn!(device = %path, error = %e, "skipping drive"),
            }
        }
        Ok(devices)
    })
}
