//! Device discovery: thin dispatchers onto [`platform::current`].
//!
//! `Device` carries just `name` and `path`; richer driver metadata
//! (manufacturer, driver version, ...) is not part of this record.

use crate::error::{Error, Result};
use crate::platform;
use crate::types::Device;

/// Enumerate all present video-input devices.
///
/// Returns an empty vector if none are attached; never `DeviceNotFound`
/// for an empty list. Fails only if the platform enumeration framework
/// itself is unavailable.
pub fn list_devices() -> Result<Vec<Device>> {
    platform::current().enumerate_devices()
}

/// Re-enumerate and check whether `device` is still present, matched by
/// path (case-insensitive) falling back to name, then attempt a
/// lightweight bind probe to rule out a stale enumeration entry. A
/// presence check, not an exclusive-access check — a device held open by
/// another process still counts as "connected" here, since the probe
/// connection is opened and immediately dropped without touching any
/// property.
///
/// Never fails; any enumeration or probe error collapses to `false`,
/// except `DeviceBusy`, which still confirms presence.
#[must_use]
pub fn is_device_connected(device: &Device) -> bool {
    let devices = match list_devices() {
        Ok(devices) => devices,
        Err(_) => return false,
    };
    if !contains(&devices, device) {
        return false;
    }
    match platform::current().open(device) {
        Ok(_) => true,
        Err(err) => err.kind() == crate::error::ErrorKind::DeviceBusy,
    }
}

/// Look up a device by path (case-insensitive).
pub fn find_device_by_path(path: &str) -> Result<Device> {
    let devices = list_devices()?;
    find_by_path(&devices, path).ok_or_else(|| Error::device_not_found(format!("no device with path '{path}'")))
}

fn contains(devices: &[Device], needle: &Device) -> bool {
    devices.iter().any(|d| d == needle)
}

fn find_by_path(devices: &[Device], path: &str) -> Option<Device> {
    devices.iter().find(|d| d.path.eq_ignore_ascii_case(path)).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devices() -> Vec<Device> {
        vec![Device::new("Front Camera", "usb://front"), Device::new("Rear Camera", "usb://rear")]
    }

    #[test]
    fn contains_matches_case_insensitively() {
        assert!(contains(&devices(), &Device::new("anything", "USB://FRONT")));
        assert!(!contains(&devices(), &Device::new("anything", "usb://missing")));
    }

    #[test]
    fn find_by_path_is_case_insensitive() {
        let found = find_by_path(&devices(), "USB://REAR").unwrap();
        assert_eq!(found.name, "Rear Camera");
        assert!(find_by_path(&devices(), "usb://missing").is_none());
    }
}
