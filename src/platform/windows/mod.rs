//! The real DirectShow/COM backend, implementing
//! [`crate::platform::Backend`] / [`crate::platform::ConnectionBackend`] /
//! [`crate::platform::HotplugBackend`].

mod com;
mod decode;
mod directshow;
mod ids;
mod ks;
mod notify;

use std::sync::OnceLock;

use crate::platform::{Backend, HotplugBackend};

static BACKEND: OnceLock<directshow::WindowsBackend> = OnceLock::new();
static HOTPLUG_BACKEND: OnceLock<notify::WindowsHotplugBackend> = OnceLock::new();

/// The process-wide [`Backend`] for this target.
pub fn backend() -> &'static dyn Backend {
    BACKEND.get_or_init(|| directshow::WindowsBackend)
}

/// The process-wide [`HotplugBackend`] for this target.
pub fn hotplug_backend() -> &'static dyn HotplugBackend {
    HOTPLUG_BACKEND.get_or_init(|| notify::WindowsHotplugBackend)
}
