//! In-memory backend used by this crate's own tests and, via the
//! `test-util` feature, by downstream integration tests that want to
//! exercise [`crate::connection::Connection`] / [`crate::camera::Camera`]
//! without real hardware.
//!
//! Grounded in the same `Backend`/`ConnectionBackend` split as
//! [`crate::platform::windows`] and [`crate::platform::stub`] — a test
//! double rather than a parallel API.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::platform::{Backend, ConnectionBackend, HotplugBackend, HotplugCallback, HotplugHandle};
use crate::types::{CamProp, Device, Guid, Range, Setting, VidProp};

/// One property's simulated range and current value.
#[derive(Debug, Clone)]
pub struct MockProperty {
    pub range: Range,
    pub value: Setting,
}

struct MockState {
    camera: HashMap<CamProp, MockProperty>,
    video: HashMap<VidProp, MockProperty>,
    vendor: HashMap<(Guid, u32), Vec<u8>>,
    valid: bool,
    hotplug: Option<HotplugCallback>,
}

impl Default for MockState {
    fn default() -> Self {
        Self { camera: HashMap::new(), video: HashMap::new(), vendor: HashMap::new(), valid: false, hotplug: None }
    }
}

impl std::fmt::Debug for MockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockState")
            .field("camera", &self.camera)
            .field("video", &self.video)
            .field("vendor", &self.vendor)
            .field("valid", &self.valid)
            .field("hotplug", &self.hotplug.is_some())
            .finish()
    }
}

/// A single simulated device plus the backend that can open it.
///
/// Built with the same method-chaining shape the rest of the crate favors
/// (`with_device`), then mutated in place with `set_*_support` once a test
/// needs a particular property to exist.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    device: Option<Device>,
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the one device this backend will enumerate and open.
    #[must_use]
    pub fn with_device(mut self, device: Device) -> Self {
        self.state.lock().unwrap().valid = true;
        self.device = Some(device);
        self
    }

    /// Make `prop` appear supported on the registered device with the given
    /// range and current value.
    pub fn set_camera_property_support(&mut self, prop: CamProp, property: MockProperty) {
        self.state.lock().unwrap().camera.insert(prop, property);
    }

    /// Make `prop` appear supported on the registered device with the given
    /// range and current value.
    pub fn set_video_property_support(&mut self, prop: VidProp, property: MockProperty) {
        self.state.lock().unwrap().video.insert(prop, property);
    }

    /// Pre-load a vendor-extension response for `(guid, property_id)`.
    pub fn set_vendor_property(&mut self, guid: Guid, property_id: u32, bytes: Vec<u8>) {
        self.state.lock().unwrap().vendor.insert((guid, property_id), bytes);
    }

    /// Force subsequent [`ConnectionBackend::is_valid`] calls to fail,
    /// simulating a device that was unplugged after it was opened.
    pub fn set_valid(&self, valid: bool) {
        self.state.lock().unwrap().valid = valid;
    }

    fn matches(&self, device: &Device) -> bool {
        self.device.as_ref().is_some_and(|d| d == device)
    }
}

impl Backend for MockBackend {
    fn enumerate_devices(&self) -> Result<Vec<Device>> {
        Ok(self.device.iter().cloned().collect())
    }

    fn open(&self, device: &Device) -> Result<Box<dyn ConnectionBackend>> {
        if !self.matches(device) {
            return Err(Error::device_not_found(format!("no mock device at '{}'", device.path)));
        }
        Ok(Box::new(MockConnection { state: Arc::clone(&self.state) }))
    }
}

impl HotplugBackend for MockBackend {
    fn register(&self, callback: HotplugCallback) -> Result<Box<dyn HotplugHandle>> {
        self.state.lock().unwrap().hotplug = Some(callback);
        Ok(Box::new(MockHotplugHandle { state: Arc::clone(&self.state) }))
    }
}

impl MockBackend {
    /// Simulate the platform reporting a device attach/detach event,
    /// invoking whatever callback is currently registered (if any).
    pub fn emit_device_change(&self, added: bool, device_path: &str) {
        let callback = self.state.lock().unwrap().hotplug.clone();
        if let Some(callback) = callback {
            callback(added, device_path);
        }
    }
}

struct MockHotplugHandle {
    state: Arc<Mutex<MockState>>,
}

impl HotplugHandle for MockHotplugHandle {}

impl Drop for MockHotplugHandle {
    fn drop(&mut self) {
        self.state.lock().unwrap().clear_hotplug();
    }
}

impl MockState {
    fn clear_hotplug(&mut self) {
        self.hotplug = None;
    }
}

struct MockConnection {
    state: Arc<Mutex<MockState>>,
}

impl std::fmt::Debug for MockConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockConnection").finish_non_exhaustive()
    }
}

impl ConnectionBackend for MockConnection {
    fn get_camera_property(&self, prop: CamProp) -> Result<Setting> {
        self.state
            .lock()
            .unwrap()
            .camera
            .get(&prop)
            .map(|p| p.value)
            .ok_or_else(|| Error::property_not_supported(prop.to_string()))
    }

    fn set_camera_property(&self, prop: CamProp, setting: Setting) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let entry = state
            .camera
            .get_mut(&prop)
            .ok_or_else(|| Error::property_not_supported(prop.to_string()))?;
        if !entry.range.is_valid(setting.value) {
            return Err(Error::invalid_value(format!("{setting:?} out of range for {prop}")));
        }
        entry.value = setting;
        Ok(())
    }

    fn get_camera_property_range(&self, prop: CamProp) -> Result<Range> {
        self.state
            .lock()
            .unwrap()
            .camera
            .get(&prop)
            .map(|p| p.range)
            .ok_or_else(|| Error::property_not_supported(prop.to_string()))
    }

    fn get_video_property(&self, prop: VidProp) -> Result<Setting> {
        self.state
            .lock()
            .unwrap()
            .video
            .get(&prop)
            .map(|p| p.value)
            .ok_or_else(|| Error::property_not_supported(prop.to_string()))
    }

    fn set_video_property(&self, prop: VidProp, setting: Setting) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let entry = state
            .video
            .get_mut(&prop)
            .ok_or_else(|| Error::property_not_supported(prop.to_string()))?;
        if !entry.range.is_valid(setting.value) {
            return Err(Error::invalid_value(format!("{setting:?} out of range for {prop}")));
        }
        entry.value = setting;
        Ok(())
    }

    fn get_video_property_range(&self, prop: VidProp) -> Result<Range> {
        self.state
            .lock()
            .unwrap()
            .video
            .get(&prop)
            .map(|p| p.range)
            .ok_or_else(|| Error::property_not_supported(prop.to_string()))
    }

    fn is_valid(&self) -> bool {
        self.state.lock().unwrap().valid
    }

    fn vendor_get(&self, guid: Guid, property_id: u32) -> Result<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .vendor
            .get(&(guid, property_id))
            .cloned()
            .ok_or_else(|| Error::property_not_supported(format!("vendor property {property_id}")))
    }

    fn vendor_set(&self, guid: Guid, property_id: u32, bytes: &[u8]) -> Result<()> {
        self.state.lock().unwrap().vendor.insert((guid, property_id), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Mode;

    fn device() -> Device {
        Device::new("Mock Cam", "mock://a")
    }

    #[test]
    fn open_unknown_device_fails() {
        let backend = MockBackend::new().with_device(device());
        let other = Device::new("Other", "mock://b");
        let err = backend.open(&other).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::DeviceNotFound);
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut backend = MockBackend::new().with_device(device());
        backend.set_camera_property_support(
            CamProp::Zoom,
            MockProperty { range: Range::new(0, 100, 1, 0, Mode::Manual), value: Setting::manual(0) },
        );
        let conn = backend.open(&device()).unwrap();
        conn.set_camera_property(CamProp::Zoom, Setting::manual(50)).unwrap();
        assert_eq!(conn.get_camera_property(CamProp::Zoom).unwrap().value, 50);
    }

    #[test]
    fn set_out_of_range_is_rejected() {
        let mut backend = MockBackend::new().with_device(device());
        backend.set_camera_property_support(
            CamProp::Zoom,
            MockProperty { range: Range::new(0, 100, 1, 0, Mode::Manual), value: Setting::manual(0) },
        );
        let conn = backend.open(&device()).unwrap();
        let err = conn.set_camera_property(CamProp::Zoom, Setting::manual(500)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn unplugged_device_reports_invalid() {
        let backend = MockBackend::new().with_device(device());
        backend.set_valid(false);
        let conn = backend.open(&device()).unwrap();
        assert!(!conn.is_valid());
    }

    #[test]
    fn registered_hotplug_callback_receives_emitted_events() {
        use std::sync::{Arc, Mutex as StdMutex};
        let backend = MockBackend::new().with_device(device());
        let events = Arc::new(StdMutex::new(Vec::new()));
        let events_clone = Arc::clone(&events);
        let handle = backend
            .register(Arc::new(move |added: bool, path: &str| {
                events_clone.lock().unwrap().push((added, path.to_string()));
            }))
            .unwrap();
        backend.emit_device_change(true, "dev://A");
        backend.emit_device_change(false, "dev://A");
        assert_eq!(*events.lock().unwrap(), vec![(true, "dev://A".to_string()), (false, "dev://A".to_string())]);

        drop(handle);
        backend.emit_device_change(true, "dev://B");
        assert_eq!(events.lock().unwrap().len(), 2);
    }
}
