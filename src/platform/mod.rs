//! Platform backend abstraction.
//!
//! [`device`](crate::device), [`connection`](crate::connection),
//! [`camera`](crate::camera), [`hotplug`](crate::hotplug), and
//! [`vendor`](crate::vendor) never branch on `cfg(windows)` themselves —
//! they call through the [`Backend`] / [`ConnectionBackend`] traits here.
//! Exactly one concrete backend is compiled in, selected by [`current`]:
//!
//! - [`windows`] — real DirectShow/COM implementation (`cfg(windows)`).
//! - [`stub`] — every call returns `NotImplemented` (`cfg(not(windows))`),
//!   so the crate compiles off-target instead of failing the build.
//! - [`mock`] — in-memory backend for this crate's own tests and for
//!   downstream integration tests (`test-util` feature).

use std::sync::Arc;

use crate::error::Result;
use crate::types::{CamProp, Device, Guid, Range, Setting, VidProp};

#[cfg(windows)]
pub mod windows;

#[cfg(not(windows))]
pub mod stub;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;

/// Device discovery and connection opening for one platform.
pub trait Backend: Send + Sync {
    fn enumerate_devices(&self) -> Result<Vec<Device>>;
    fn open(&self, device: &Device) -> Result<Box<dyn ConnectionBackend>>;
}

/// Typed property access for one open device connection.
///
/// Implementors own whatever platform handles back the connection; dropping
/// the trait object must release them. No method here performs clamping or
/// retries — that discipline lives in [`crate::connection::Connection`],
/// which is the only caller of this trait.
pub trait ConnectionBackend: Send + std::fmt::Debug {
    fn get_camera_property(&self, prop: CamProp) -> Result<Setting>;
    fn set_camera_property(&self, prop: CamProp, setting: Setting) -> Result<()>;
    fn get_camera_property_range(&self, prop: CamProp) -> Result<Range>;

    fn get_video_property(&self, prop: VidProp) -> Result<Setting>;
    fn set_video_property(&self, prop: VidProp, setting: Setting) -> Result<()>;
    fn get_video_property_range(&self, prop: VidProp) -> Result<Range>;

    /// Lightweight connectivity probe: attempt a cheap read and report
    /// whether the connection still answers.
    fn is_valid(&self) -> bool;

    fn vendor_get(&self, guid: Guid, property_id: u32) -> Result<Vec<u8>>;
    fn vendor_set(&self, guid: Guid, property_id: u32, bytes: &[u8]) -> Result<()>;
}

/// The backend compiled in for this target.
#[cfg(windows)]
pub fn current() -> &'static dyn Backend {
    windows::backend()
}

#[cfg(not(windows))]
pub fn current() -> &'static dyn Backend {
    stub::backend()
}

/// A callback invoked on the notifier's message-pump thread with
/// `(added, device_path)`.
pub type HotplugCallback = Arc<dyn Fn(bool, &str) + Send + Sync + 'static>;

/// Starts a single process-wide device-change subscription.
///
/// Grounded in the `windows`/`stub`/`mock` split above; [`crate::hotplug`]
/// never touches `cfg(windows)` directly, only this trait.
pub trait HotplugBackend: Send + Sync {
    fn register(&self, callback: HotplugCallback) -> Result<Box<dyn HotplugHandle>>;
}

/// Tears down the subscription when dropped.
pub trait HotplugHandle: Send {}

/// The hot-plug backend compiled in for this target.
#[cfg(windows)]
pub fn current_hotplug() -> &'static dyn HotplugBackend {
    windows::hotplug_backend()
}

#[cfg(not(windows))]
pub fn current_hotplug() -> &'static dyn HotplugBackend {
    stub::hotplug_backend()
}
