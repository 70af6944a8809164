//! Non-Windows fallback backend.
//!
//! Lets the crate compile off-target instead of failing the build. Every
//! method here returns `Err(ErrorKind::NotImplemented)` without touching
//! any OS API.

use crate::error::{Error, Result};
use crate::platform::{Backend, ConnectionBackend, HotplugBackend, HotplugCallback, HotplugHandle};
use crate::types::{CamProp, Device, Guid, Range, Setting, VidProp};

fn not_implemented(operation: &str) -> Error {
    Error::not_implemented(format!(
        "{operation}: duvc-ctl's DirectShow backend is only available on Windows"
    ))
}

pub struct StubBackend;

impl Backend for StubBackend {
    fn enumerate_devices(&self) -> Result<Vec<Device>> {
        Err(not_implemented("enumerate_devices"))
    }

    fn open(&self, _device: &Device) -> Result<Box<dyn ConnectionBackend>> {
        Err(not_implemented("open"))
    }
}

#[derive(Debug)]
struct StubConnection;

impl ConnectionBackend for StubConnection {
    fn get_camera_property(&self, _prop: CamProp) -> Result<Setting> {
        Err(not_implemented("get_camera_property"))
    }

    fn set_camera_property(&self, _prop: CamProp, _setting: Setting) -> Result<()> {
        Err(not_implemented("set_camera_property"))
    }

    fn get_camera_property_range(&self, _prop: CamProp) -> Result<Range> {
        Err(not_implemented("get_camera_property_range"))
    }

    fn get_video_property(&self, _prop: VidProp) -> Result<Setting> {
        Err(not_implemented("get_video_property"))
    }

    fn set_video_property(&self, _prop: VidProp, _setting: Setting) -> Result<()> {
        Err(not_implemented("set_video_property"))
    }

    fn get_video_property_range(&self, _prop: VidProp) -> Result<Range> {
        Err(not_implemented("get_video_property_range"))
    }

    fn is_valid(&self) -> bool {
        false
    }

    fn vendor_get(&self, _guid: Guid, _property_id: u32) -> Result<Vec<u8>> {
        Err(not_implemented("vendor_get"))
    }

    fn vendor_set(&self, _guid: Guid, _property_id: u32, _bytes: &[u8]) -> Result<()> {
        Err(not_implemented("vendor_set"))
    }
}

pub fn backend() -> &'static dyn Backend {
    &StubBackend
}

struct StubHotplugBackend;

impl HotplugBackend for StubHotplugBackend {
    fn register(&self, _callback: HotplugCallback) -> Result<Box<dyn HotplugHandle>> {
        Err(not_implemented("register_device_change_callback"))
    }
}

pub fn hotplug_backend() -> &'static dyn HotplugBackend {
    &StubHotplugBackend
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn enumerate_devices_is_not_implemented() {
        let err = StubBackend.enumerate_devices().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
    }

    #[test]
    fn open_is_not_implemented() {
        let err = StubBackend.open(&Device::new("x", "y")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
    }
}
