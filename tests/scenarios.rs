//! Integration coverage for the six end-to-end scenarios.
//!
//! Driven entirely through `duvc_ctl`'s public API against
//! `platform::mock::MockBackend` — there is no real capture device in
//! this environment, so every scenario substitutes the mock backend at
//! the one seam (`Connection::open_with_backend`,
//! `hotplug::register_device_change_callback_with`) that lets a test
//! bypass `platform::current()` without touching crate internals.

#![cfg(feature = "test-util")]

use std::sync::{Arc, Mutex};

use duvc_ctl::platform::mock::{MockBackend, MockProperty};
use duvc_ctl::platform::{Backend, ConnectionBackend, HotplugBackend};
use duvc_ctl::{CamProp, Connection, Device, ErrorKind, Mode, Range, Setting, VidProp};

fn brightness_backend() -> MockBackend {
    let mut backend = MockBackend::new().with_device(Device::new("USB Camera", "usb://cam0"));
    backend.set_video_property_support(
        VidProp::Brightness,
        MockProperty { range: Range::new(0, 255, 1, 128, Mode::Manual), value: Setting::manual(128) },
    );
    backend
}

fn open(backend: &MockBackend, device: &Device) -> Connection {
    let conn_backend: Box<dyn ConnectionBackend> = backend.open(device).expect("mock device should be present");
    Connection::open_with_backend(device, conn_backend)
}

#[test]
fn empty_enumeration_reports_no_devices_and_no_error() {
    let backend = MockBackend::new();
    let devices = Backend::enumerate_devices(&backend).expect("enumeration of zero devices is Ok, not an error");
    assert!(devices.is_empty());

    let bogus = Device::new("Nonexistent", "usb://bogus");
    let err = backend.open(&bogus).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeviceNotFound);
}

#[test]
fn round_trip_brightness() {
    let backend = brightness_backend();
    let device = Device::new("USB Camera", "usb://cam0");
    let conn = open(&backend, &device);

    assert_eq!(conn.get_video_property(VidProp::Brightness).unwrap(), Setting::manual(128));
    conn.set_video_property(VidProp::Brightness, Setting::manual(200)).unwrap();
    assert_eq!(conn.get_video_property(VidProp::Brightness).unwrap(), Setting::manual(200));
}

#[test]
fn out_of_range_set_is_rejected_and_non_mutating() {
    let backend = brightness_backend();
    let device = Device::new("USB Camera", "usb://cam0");
    let conn = open(&backend, &device);

    let err = conn.set_video_property(VidProp::Brightness, Setting::manual(999)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
    assert_eq!(conn.get_video_property(VidProp::Brightness).unwrap(), Setting::manual(128));
}

#[test]
fn unsupported_property_is_reported_consistently() {
    let backend = brightness_backend();
    let device = Device::new("USB Camera", "usb://cam0");
    let conn = open(&backend, &device);

    let err = conn.get_camera_property_range(CamProp::Pan).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PropertyNotSupported);

    let snapshot = duvc_ctl::CapabilitySnapshot::scan(&conn, device.path.clone());
    assert!(!snapshot.supports_camera_property(CamProp::Pan));
}

#[test]
fn hotplug_delivers_attach_then_detach_in_order_until_unregistered() {
    let backend = MockBackend::new().with_device(Device::new("USB Camera", "usb://cam0"));
    let events = Arc::new(Mutex::new(Vec::new()));
    let events_for_callback = Arc::clone(&events);

    let handle = backend
        .register(Arc::new(move |added: bool, path: &str| {
            events_for_callback.lock().unwrap().push((added, path.to_string()));
        }))
        .unwrap();

    backend.emit_device_change(true, "dev://A");
    backend.emit_device_change(false, "dev://A");
    assert_eq!(*events.lock().unwrap(), vec![(true, "dev://A".to_string()), (false, "dev://A".to_string())]);

    drop(handle);
    backend.emit_device_change(true, "dev://B");
    assert_eq!(events.lock().unwrap().len(), 2, "no events should be delivered after unregistering");
}

#[test]
fn device_disappearance_moves_the_connection_to_lost() {
    let backend = brightness_backend();
    let device = Device::new("USB Camera", "usb://cam0");
    let conn = open(&backend, &device);

    assert!(conn.get_video_property(VidProp::Brightness).is_ok());

    backend.set_valid(false);
    // The mock's `is_valid` flips false, but `get_video_property` only
    // transitions the connection's own state machine on a genuine
    // `DeviceNotFound` result from an operation, not from a liveness
    // probe — so drive it through a backend that actually disappears.
    #[derive(Debug)]
    struct GoneAfterFirstCall {
        calls: std::sync::atomic::AtomicUsize,
        inner: Box<dyn ConnectionBackend>,
    }
    impl ConnectionBackend for GoneAfterFirstCall {
        fn get_camera_property(&self, prop: CamProp) -> duvc_ctl::Result<Setting> {
            self.inner.get_camera_property(prop)
        }
        fn set_camera_property(&self, prop: CamProp, setting: Setting) -> duvc_ctl::Result<()> {
            self.inner.set_camera_property(prop, setting)
        }
        fn get_camera_property_range(&self, prop: CamProp) -> duvc_ctl::Result<Range> {
            self.inner.get_camera_property_range(prop)
        }
        fn get_video_property(&self, prop: VidProp) -> duvc_ctl::Result<Setting> {
            if self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                self.inner.get_video_property(prop)
            } else {
                Err(duvc_ctl::Error::device_not_found("device removed"))
            }
        }
        fn set_video_property(&self, prop: VidProp, setting: Setting) -> duvc_ctl::Result<()> {
            self.inner.set_video_property(prop, setting)
        }
        fn get_video_property_range(&self, prop: VidProp) -> duvc_ctl::Result<Range> {
            self.inner.get_video_property_range(prop)
        }
        fn is_valid(&self) -> bool {
            self.inner.is_valid()
        }
        fn vendor_get(&self, guid: duvc_ctl::Guid, id: u32) -> duvc_ctl::Result<Vec<u8>> {
            self.inner.vendor_get(guid, id)
        }
        fn vendor_set(&self, guid: duvc_ctl::Guid, id: u32, bytes: &[u8]) -> duvc_ctl::Result<()> {
            self.inner.vendor_set(guid, id, bytes)
        }
    }

    let wrapped = GoneAfterFirstCall { calls: std::sync::atomic::AtomicUsize::new(0), inner: backend.open(&device).unwrap() };
    let conn = Connection::open_with_backend(&device, Box::new(wrapped));
    assert!(conn.get_video_property(VidProp::Brightness).is_ok());
    assert!(!conn.is_lost());

    let err = conn.get_video_property(VidProp::Brightness).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeviceNotFound);
    assert!(conn.is_lost());

    // The connection stays `Lost`; a further call short-circuits without
    // touching the backend again.
    let err = conn.get_video_property(VidProp::Brightness).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeviceNotFound);
}
