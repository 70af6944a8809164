//! COM apartment lifetime management.
//!
//! A thread-local RAII guard: every `duvc-ctl` entry point that touches
//! COM needs an initialized apartment on its own thread, and a
//! `Connection` can live far longer than one call.

use windows::Win32::System::Com::{CoInitializeEx, CoUninitialize, COINIT_APARTMENTTHREADED};

use crate::error::{Error, Result};

thread_local! {
    static COM_GUARD: std::cell::RefCell<Option<ComGuard>> = const { std::cell::RefCell::new(None) };
}

/// Ensure COM is initialized (apartment-threaded) on the calling thread
/// for the remaining lifetime of the thread, initializing it on first
/// call. Matches the DirectShow interfaces' apartment-threading
/// requirement: each interface pointer is only valid on the thread that
/// created it, so initialization is tied to the thread, not to any one
/// call.
pub fn ensure_initialized() -> Result<()> {
    COM_GUARD.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_none() {
            *slot = Some(ComGuard::new()?);
        }
        Ok(())
    })
}

/// RAII guard for one thread's COM apartment. `CoUninitialize` runs when
/// the owning thread exits, via [`COM_GUARD`]'s destructor.
struct ComGuard;

impl ComGuard {
    fn new() -> Result<Self> {
        // SAFETY: CoInitializeEx is safe to call any number of times per
        // thread; S_OK and S_FALSE (already initialized) are both success.
        let hr = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) };
        if hr.is_err() {
            return Err(Error::system_error(format!("CoInitializeEx failed: {hr:?}")));
        }
        Ok(Self)
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        // SAFETY: matches the `CoInitializeEx` call in `ComGuard::new` on
        // this same thread.
        unsafe { CoUninitialize() };
    }
}
