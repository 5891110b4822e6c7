use crate::{device::Device, error::DeviceError};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Serialize, Deserialize)]
struct DeviceList<D> {
    devices: D,
}

/// Accepts either a bare array of devices or `{"devices": [...]}`.
pub fn parse_snapshot(raw: &str) -> Result<Vec<Device>, DeviceError> {
    if raw.trim_start().starts_with('[') {
        Ok(serde_json::from_str(raw)?)
    } else {
        let list: DeviceList<Vec<Device>> = serde_json::from_str(raw)?;
        Ok(list.devices)
    }
}

pub fn load_snapshot(path: &Path) -> Result<Vec<Device>, DeviceError> {
    let raw = fs::read_to_string(path).map_err(|source| DeviceError::SnapshotRead {
        path: path.to_path_buf(),
        source,
    })?;
    let devices = parse_snapshot(&raw)?;
    log::info!("Loaded {} devices from {}", devices.len(), path.display());
    Ok(devices)
}

pub fn save_snapshot(path: &Path, devices: &[Device]) -> Result<(), DeviceError> {
    let raw = serde_json::to_string_pretty(&DeviceList { devices })?;
    fs::write(path, raw).map_err(|source| DeviceError::SnapshotWrite {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Saved {} devices to {}", devices.len(), path.display());
    Ok(())
}
