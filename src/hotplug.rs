//! The hot-plug notifier: a single process-wide device-change
//! subscription.
//!
//! Global state is a single `OnceLock<Mutex<HotplugState>>` holding the
//! live [`crate::platform::HotplugHandle`] — the same singleton idiom
//! [`crate::logging`] uses. Registering a new callback assigns a fresh
//! `Some(handle)` over the old one; the old handle is dropped as part of
//! that assignment, tearing down its pump thread before the new one
//! starts.

use std::sync::{Mutex, OnceLock};

use crate::error::Result;
use crate::platform::{self, HotplugBackend, HotplugCallback, HotplugHandle};

struct HotplugState {
    handle: Option<Box<dyn HotplugHandle>>,
}

fn state() -> &'static Mutex<HotplugState> {
    static STATE: OnceLock<Mutex<HotplugState>> = OnceLock::new();
    STATE.get_or_init(|| Mutex::new(HotplugState { handle: None }))
}

/// Register `callback` as the sole device-change subscriber, replacing
/// any prior registration. The callback runs on the notifier's
/// message-pump thread with `(added, device_path)`; it must be fast, and
/// a panic inside it is caught and logged rather than allowed to
/// propagate into the platform message loop (see [`crate::logging`]).
pub fn register_device_change_callback(callback: impl Fn(bool, &str) + Send + Sync + 'static) -> Result<()> {
    register_with(platform::current_hotplug(), callback)
}

/// As [`register_device_change_callback`], but against an explicit
/// backend — used by tests to drive [`crate::platform::mock::MockBackend`]
/// instead of the real platform subscription.
pub fn register_device_change_callback_with(
    backend: &dyn HotplugBackend,
    callback: impl Fn(bool, &str) + Send + Sync + 'static,
) -> Result<()> {
    register_with(backend, callback)
}

fn register_with(backend: &dyn HotplugBackend, callback: impl Fn(bool, &str) + Send + Sync + 'static) -> Result<()> {
    let wrapped: HotplugCallback = std::sync::Arc::new(move |added, path| {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| callback(added, path)));
        if result.is_err() {
            crate::logging::log(
                crate::logging::LogLevel::Error,
                &format!("hot-plug callback panicked while handling device '{path}'"),
            );
        }
    });
    let handle = backend.register(wrapped)?;
    state().lock().unwrap_or_else(std::sync::PoisonError::into_inner).handle = Some(handle);
    Ok(())
}

/// Clear the callback and tear down the subscription. A no-op, not an
/// error, if nothing is registered.
pub fn unregister_device_change_callback() {
    state().lock().unwrap_or_else(std::sync::PoisonError::into_inner).handle = None;
}
