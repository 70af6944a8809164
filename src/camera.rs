//! The `Camera` facade: composes the device enumerator, the connection,
//! and the capability scanner into the primary public surface.
//! Move-only, lazily-connected — opening is deferred until the first
//! property operation, without exposing `Connection` construction
//! directly to most callers.

use crate::capability::CapabilitySnapshot;
use crate::connection::Connection;
use crate::device;
use crate::error::{catch_unwind_to_result, Error, Result};
use crate::types::{CamProp, Device, PropertyKind, Range, Setting, VidProp};

/// An owned, lazily-connected handle to one video-input device.
///
/// Constructing a `Camera` never opens a platform connection; the first
/// property operation does, on whichever thread made that call, and that
/// thread becomes the connection's owner (see [`crate::connection`]).
pub struct Camera {
    device: Device,
    connection: Option<Connection>,
}

impl Camera {
    /// Build a camera handle for `device` without opening it.
    #[must_use]
    pub fn new(device: Device) -> Self {
        Self { device, connection: None }
    }

    /// Build a camera handle for the device at `index` in
    /// [`device::list_devices`]'s current result.
    pub fn from_index(index: usize) -> Result<Self> {
        let devices = device::list_devices()?;
        let device = devices
            .into_iter()
            .nth(index)
            .ok_or_else(|| Error::invalid_argument(format!("no device at index {index}")))?;
        Ok(Self::new(device))
    }

    /// The device record this camera was constructed from.
    #[must_use]
    pub fn device(&self) -> &Device {
        &self.device
    }

    fn connection(&mut self) -> Result<&Connection> {
        if self.connection.is_none() {
            self.connection = Some(Connection::open(&self.device)?);
        }
        Ok(self.connection.as_ref().expect("just inserted"))
    }

    /// Cheap liveness probe via the underlying connection. Opens the
    /// connection on first call, same as any other operation.
    pub fn is_valid(&mut self) -> bool {
        catch_unwind_to_result(std::panic::AssertUnwindSafe(|| Ok(self.connection().map(Connection::is_valid).unwrap_or(false))))
            .unwrap_or(false)
    }

    /// Read a camera-control or video-proc-amp property, dispatched by
    /// [`PropertyKind`].
    pub fn get(&mut self, kind: PropertyKind) -> Result<Setting> {
        catch_unwind_to_result(std::panic::AssertUnwindSafe(|| {
            let conn = self.connection()?;
            match kind {
                PropertyKind::Camera(prop) => conn.get_camera_property(prop),
                PropertyKind::Video(prop) => conn.get_video_property(prop),
            }
        }))
    }

    /// Write a camera-control or video-proc-amp property. Rejects
    /// out-of-range values with `InvalidValue`; never clamps.
    pub fn set(&mut self, kind: PropertyKind, setting: Setting) -> Result<()> {
        catch_unwind_to_result(std::panic::AssertUnwindSafe(|| {
            let conn = self.connection()?;
            match kind {
                PropertyKind::Camera(prop) => conn.set_camera_property(prop, setting),
                PropertyKind::Video(prop) => conn.set_video_property(prop, setting),
            }
        }))
    }

    /// Query a property's valid range.
    pub fn get_range(&mut self, kind: PropertyKind) -> Result<Range> {
        catch_unwind_to_result(std::panic::AssertUnwindSafe(|| {
            let conn = self.connection()?;
            match kind {
                PropertyKind::Camera(prop) => conn.get_camera_property_range(prop),
                PropertyKind::Video(prop) => conn.get_video_property_range(prop),
            }
        }))
    }

    /// Convenience wrapper over [`PropertyKind::Camera`].
    pub fn get_camera_property(&mut self, prop: CamProp) -> Result<Setting> {
        self.get(PropertyKind::Camera(prop))
    }

    /// Convenience wrapper over [`PropertyKind::Camera`].
    pub fn set_camera_property(&mut self, prop: CamProp, setting: Setting) -> Result<()> {
        self.set(PropertyKind::Camera(prop), setting)
    }

    /// Convenience wrapper over [`PropertyKind::Video`].
    pub fn get_video_property(&mut self, prop: VidProp) -> Result<Setting> {
        self.get(PropertyKind::Video(prop))
    }

    /// Convenience wrapper over [`PropertyKind::Video`].
    pub fn set_video_property(&mut self, prop: VidProp, setting: Setting) -> Result<()> {
        self.set(PropertyKind::Video(prop), setting)
    }

    /// Scan every property this device supports into a
    /// [`CapabilitySnapshot`]. Opens the connection if needed; never
    /// fails — an unopenable connection yields an
    /// [`CapabilitySnapshot::is_inaccessible`] snapshot.
    pub fn capabilities(&mut self) -> CapabilitySnapshot {
        let path = self.device.path.clone();
        match self.connection() {
            Ok(conn) => CapabilitySnapshot::scan(conn, path),
            Err(_) => CapabilitySnapshot::scan(&Connection::open_with_backend(&self.device, unreachable_backend()), path),
        }
    }
}

/// A backend whose every call fails, used only to build an
/// already-inaccessible snapshot when [`Camera::connection`] itself could
/// not be opened — `CapabilitySnapshot::scan` needs a `&Connection` even
/// in that case, so this stands in for one that was never really opened.
fn unreachable_backend() -> Box<dyn crate::platform::ConnectionBackend> {
    #[derive(Debug)]
    struct Unreachable;
    impl crate::platform::ConnectionBackend for Unreachable {
        fn get_camera_property(&self, _: CamProp) -> Result<Setting> {
            Err(Error::device_not_found("connection was never opened"))
        }
        fn set_camera_property(&self, _: CamProp, _: Setting) -> Result<()> {
            Err(Error::device_not_found("connection was never opened"))
        }
        fn get_camera_property_range(&self, _: CamProp) -> Result<Range> {
            Err(Error::device_not_found("connection was never opened"))
        }
        fn get_video_property(&self, _: VidProp) -> Result<Setting> {
            Err(Error::device_not_found("connection was never opened"))
        }
        fn set_video_property(&self, _: VidProp, _: Setting) -> Result<()> {
            Err(Error::device_not_found("connection was never opened"))
        }
        fn get_video_property_range(&self, _: VidProp) -> Result<Range> {
            Err(Error::device_not_found("connection was never opened"))
        }
        fn is_valid(&self) -> bool {
            false
        }
        fn vendor_get(&self, _: crate::types::Guid, _: u32) -> Result<Vec<u8>> {
            Err(Error::device_not_found("connection was never opened"))
        }
        fn vendor_set(&self, _: crate::types::Guid, _: u32, _: &[u8]) -> Result<()> {
            Err(Error::device_not_found("connection was never opened"))
        }
    }
    Box::new(Unreachable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Backend;
    use crate::platform::mock::{MockBackend, MockProperty};
    use crate::types::Mode;

    fn device() -> Device {
        Device::new("Mock Cam", "mock://a")
    }

    fn camera_with_brightness() -> (Camera, MockBackend) {
        let mut backend = MockBackend::new().with_device(device());
        backend.set_video_property_support(
            VidProp::Brightness,
            MockProperty { range: Range::new(0, 255, 1, 128, Mode::Manual), value: Setting::manual(128) },
        );
        let connection = Connection::open_with_backend(&device(), backend.open(&device()).unwrap());
        let mut camera = Camera::new(device());
        camera.connection = Some(connection);
        (camera, backend)
    }

    #[test]
    fn round_trip_brightness() {
        let (mut camera, _backend) = camera_with_brightness();
        assert_eq!(camera.get_video_property(VidProp::Brightness).unwrap(), Setting::manual(128));
        camera.set_video_property(VidProp::Brightness, Setting::manual(200)).unwrap();
        assert_eq!(camera.get_video_property(VidProp::Brightness).unwrap(), Setting::manual(200));
    }

    #[test]
    fn out_of_range_set_does_not_mutate() {
        let (mut camera, _backend) = camera_with_brightness();
        let err = camera.set_video_property(VidProp::Brightness, Setting::manual(999)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidValue);
        assert_eq!(camera.get_video_property(VidProp::Brightness).unwrap(), Setting::manual(128));
    }

    #[test]
    fn unsupported_camera_property_is_reported_in_capabilities() {
        let (mut camera, _backend) = camera_with_brightness();
        let snapshot = camera.capabilities();
        assert!(!snapshot.supports_camera_property(CamProp::Pan));
    }
}
