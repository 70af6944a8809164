//! Capability scanning: a point-in-time snapshot of every property a
//! device supports, its range, and its current value.

use indexmap::IndexMap;
use strum::IntoEnumIterator;

use crate::connection::Connection;
use crate::error::{ErrorKind, Result};
use crate::types::{CamProp, Capability, PropertyKind, VidProp};

/// A scan of every [`CamProp`] and [`VidProp`] on one device.
///
/// Built by [`CapabilitySnapshot::scan`]. Never mutated after construction
/// except through [`CapabilitySnapshot::refresh`] — a snapshot is a value,
/// not a live view.
#[derive(Debug, Clone)]
pub struct CapabilitySnapshot {
    device_path: String,
    inaccessible: bool,
    entries: IndexMap<PropertyKind, Capability>,
}

impl CapabilitySnapshot {
    /// Scan every property on `connection`. Never fails: if the connection
    /// itself cannot be used, the returned snapshot is marked
    /// [`CapabilitySnapshot::is_inaccessible`] and every capability is
    /// `supported = false`.
    #[must_use]
    pub fn scan(connection: &Connection, device_path: impl Into<String>) -> Self {
        let device_path = device_path.into();
        let mut entries = IndexMap::with_capacity(CamProp::iter().len() + VidProp::iter().len());

        let inaccessible = !connection.is_valid();

        for prop in CamProp::iter() {
            entries.insert(PropertyKind::Camera(prop), scan_camera_property(connection, prop));
        }
        for prop in VidProp::iter() {
            entries.insert(PropertyKind::Video(prop), scan_video_property(connection, prop));
        }

        Self { device_path, inaccessible, entries }
    }

    /// Re-run the scan against a fresh connection to the same device path.
    ///
    /// Returns `Err(DeviceNotFound)` if the device has vanished in the
    /// meantime, rather than silently returning an all-unsupported
    /// snapshot — callers refreshing an existing snapshot want to know the
    /// difference between "still here, properties changed" and "gone."
    pub fn refresh(&self, connection: &Connection) -> Result<Self> {
        if !connection.is_valid() {
            return Err(crate::error::Error::device_not_found(format!(
                "device '{}' is no longer reachable",
                self.device_path
            )));
        }
        Ok(Self::scan(connection, self.device_path.clone()))
    }

    /// Whether the initial connection used to build this snapshot could
    /// not be opened or validated at all.
    #[must_use]
    pub fn is_inaccessible(&self) -> bool {
        self.inaccessible
    }

    /// The device path this snapshot was scanned from.
    #[must_use]
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    #[must_use]
    pub fn capability(&self, kind: PropertyKind) -> Option<&Capability> {
        self.entries.get(&kind)
    }

    #[must_use]
    pub fn supports_camera_property(&self, prop: CamProp) -> bool {
        self.entries.get(&PropertyKind::Camera(prop)).is_some_and(|c| c.supported)
    }

    #[must_use]
    pub fn supports_video_property(&self, prop: VidProp) -> bool {
        self.entries.get(&PropertyKind::Video(prop)).is_some_and(|c| c.supported)
    }

    /// All `CamProp` capabilities, in declaration order.
    pub fn camera_properties(&self) -> impl Iterator<Item = (CamProp, &Capability)> {
        self.entries.iter().filter_map(|(k, v)| match k {
            PropertyKind::Camera(p) => Some((*p, v)),
            PropertyKind::Video(_) => None,
        })
    }

    /// All `VidProp` capabilities, in declaration order.
    pub fn video_properties(&self) -> impl Iterator<Item = (VidProp, &Capability)> {
        self.entries.iter().filter_map(|(k, v)| match k {
            PropertyKind::Video(p) => Some((*p, v)),
            PropertyKind::Camera(_) => None,
        })
    }
}

fn scan_camera_property(connection: &Connection, prop: CamProp) -> Capability {
    let range = match connection.get_camera_property_range(prop) {
        Ok(range) => range,
        Err(e) if e.kind() == ErrorKind::PropertyNotSupported => return Capability::default(),
        Err(_) => return Capability::default(),
    };
    let current = connection.get_camera_property(prop).unwrap_or(crate::types::Setting::manual(range.default_val));
    Capability { supported: true, range, current }
}

fn scan_video_property(connection: &Connection, prop: VidProp) -> Capability {
    let range = match connection.get_video_property_range(prop) {
        Ok(range) => range,
        Err(e) if e.kind() == ErrorKind::PropertyNotSupported => return Capability::default(),
        Err(_) => return Capability::default(),
    };
    let current = connection.get_video_property(prop).unwrap_or(crate::types::Setting::manual(range.default_val));
    Capability { supported: true, range, current }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Backend;
    use crate::platform::mock::{MockBackend, MockProperty};
    use crate::types::{Device, Mode, Range};

    fn device() -> Device {
        Device::new("Mock Cam", "mock://a")
    }

    #[test]
    fn unsupported_property_is_not_in_a_supporting_state() {
        let backend = MockBackend::new().with_device(device());
        let connection = Connection::open_with_backend(&device(), backend.open(&device()).unwrap());
        let snapshot = CapabilitySnapshot::scan(&connection, "mock://a");
        assert!(!snapshot.supports_camera_property(CamProp::Pan));
        assert!(snapshot.capability(PropertyKind::Camera(CamProp::Pan)).unwrap().supported == false);
    }

    #[test]
    fn supported_property_reports_range_and_current() {
        let mut backend = MockBackend::new().with_device(device());
        backend.set_video_property_support(
            VidProp::Brightness,
            MockProperty { range: Range::new(0, 255, 1, 128, Mode::Manual), value: crate::types::Setting::manual(128) },
        );
        let connection = Connection::open_with_backend(&device(), backend.open(&device()).unwrap());
        let snapshot = CapabilitySnapshot::scan(&connection, "mock://a");
        assert!(snapshot.supports_video_property(VidProp::Brightness));
        let cap = snapshot.capability(PropertyKind::Video(VidProp::Brightness)).unwrap();
        assert_eq!(cap.range.max, 255);
        assert_eq!(cap.current.value, 128);
    }

    #[test]
    fn scan_covers_every_declared_property() {
        let backend = MockBackend::new().with_device(device());
        let connection = Connection::open_with_backend(&device(), backend.open(&device()).unwrap());
        let snapshot = CapabilitySnapshot::scan(&connection, "mock://a");
        assert_eq!(snapshot.camera_properties().count(), CamProp::iter().len());
        assert_eq!(snapshot.video_properties().count(), VidProp::iter().len());
    }
}
