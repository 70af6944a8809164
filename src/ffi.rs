//! The C ABI surface: the minimal slice a downstream binding generator
//! (or a hand-written C/C++ caller) needs, deliberately not a full
//! language-binding layer.
//!
//! Every `extern "C"` function is panic-safe — `catch_unwind_to_result`
//! converts an unwind into `ErrorKind::SystemError` before it can cross
//! into the caller's frame — and returns `ErrorKind as i32` (`0` =
//! `Success`), with richer text available through
//! [`duvc_last_error_message`].

use std::cell::RefCell;
use std::ffi::{c_char, CString};
use std::ptr;

use crate::camera::Camera;
use crate::device;
use crate::error::{catch_unwind_to_result, Error, ErrorKind, Result};
use crate::types::{CamProp, Device, Mode, Setting, VidProp};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(err: &Error) {
    let text = CString::new(err.to_string()).unwrap_or_else(|_| CString::new("error message contained a NUL byte").unwrap());
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(text));
}

fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

fn finish(result: Result<()>) -> i32 {
    match result {
        Ok(()) => {
            clear_last_error();
            ErrorKind::Success as i32
        }
        Err(err) => {
            let kind = err.kind();
            set_last_error(&err);
            kind as i32
        }
    }
}

/// The human-readable message for the last error on the calling thread,
/// or a null pointer if the last call on this thread succeeded.
///
/// The returned pointer is valid until the next `duvc_*` call on the same
/// thread; callers that need it longer must copy it immediately.
#[unsafe(no_mangle)]
pub extern "C" fn duvc_last_error_message() -> *const c_char {
    LAST_ERROR.with(|slot| slot.borrow().as_ref().map_or(ptr::null(), |s| s.as_ptr()))
}

/// Enumerate devices into a heap-allocated array of owned `Device`
/// handles. On success, `*out_devices` points at `*out_count` entries;
/// the caller must release it with [`duvc_free_device_list`].
#[unsafe(no_mangle)]
pub extern "C" fn duvc_list_devices(out_devices: *mut *mut Device, out_count: *mut usize) -> i32 {
    finish(catch_unwind_to_result(std::panic::AssertUnwindSafe(|| {
        if out_devices.is_null() || out_count.is_null() {
            return Err(Error::invalid_argument("out_devices and out_count must not be null"));
        }
        let devices = device::list_devices()?;
        let mut boxed = devices.into_boxed_slice();
        let ptr = boxed.as_mut_ptr();
        let len = boxed.len();
        std::mem::forget(boxed);
        // SAFETY: `out_devices`/`out_count` are non-null per the check above.
        unsafe {
            *out_devices = ptr;
            *out_count = len;
        }
        Ok(())
    })))
}

/// Release an array produced by [`duvc_list_devices`].
///
/// # Safety
/// `devices`/`count` must be exactly the pair last returned together by
/// [`duvc_list_devices`] on this thread; calling this twice on the same
/// pointer, or with a pointer not obtained that way, is undefined
/// behavior.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duvc_free_device_list(devices: *mut Device, count: usize) {
    if devices.is_null() {
        return;
    }
    drop(unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(devices, count)) });
}

/// Open the device at `index` (per the current enumeration) and return an
/// opaque handle through `out_camera`. Ownership of the handle passes to
/// the caller, who must eventually call [`duvc_camera_close`].
#[unsafe(no_mangle)]
pub extern "C" fn duvc_camera_open_by_index(index: usize, out_camera: *mut *mut Camera) -> i32 {
    finish(catch_unwind_to_result(std::panic::AssertUnwindSafe(|| {
        if out_camera.is_null() {
            return Err(Error::invalid_argument("out_camera must not be null"));
        }
        let camera = Camera::from_index(index)?;
        let boxed = Box::new(camera);
        // SAFETY: `out_camera` is non-null per the check above.
        unsafe {
            *out_camera = Box::into_raw(boxed);
        }
        Ok(())
    })))
}

/// Release a camera handle returned by [`duvc_camera_open_by_index`].
///
/// # Safety
/// `camera` must be a pointer this module handed out and not already
/// closed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duvc_camera_close(camera: *mut Camera) {
    if !camera.is_null() {
        drop(unsafe { Box::from_raw(camera) });
    }
}

fn with_camera<T>(camera: *mut Camera, f: impl FnOnce(&mut Camera) -> Result<T>) -> Result<T> {
    if camera.is_null() {
        return Err(Error::invalid_argument("camera handle must not be null"));
    }
    // SAFETY: callers are required to pass a live handle from this module.
    let camera = unsafe { &mut *camera };
    f(camera)
}

fn mode_from_flag(is_auto: i32) -> Mode {
    if is_auto != 0 {
        Mode::Auto
    } else {
        Mode::Manual
    }
}

/// # Safety
/// `camera` must be a live handle from [`duvc_camera_open_by_index`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duvc_camera_get_camera_property(
    camera: *mut Camera,
    prop: CamProp,
    out_value: *mut i32,
    out_is_auto: *mut i32,
) -> i32 {
    finish(catch_unwind_to_result(std::panic::AssertUnwindSafe(|| {
        if out_value.is_null() || out_is_auto.is_null() {
            return Err(Error::invalid_argument("out_value and out_is_auto must not be null"));
        }
        let setting = with_camera(camera, |c| c.get_camera_property(prop))?;
        // SAFETY: non-null per the check above.
        unsafe {
            *out_value = setting.value;
            *out_is_auto = i32::from(setting.mode == Mode::Auto);
        }
        Ok(())
    })))
}

/// # Safety
/// `camera` must be a live handle from [`duvc_camera_open_by_index`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duvc_camera_set_camera_property(camera: *mut Camera, prop: CamProp, value: i32, is_auto: i32) -> i32 {
    finish(catch_unwind_to_result(std::panic::AssertUnwindSafe(|| {
        with_camera(camera, |c| c.set_camera_property(prop, Setting::new(value, mode_from_flag(is_auto))))
    })))
}

/// # Safety
/// `camera` must be a live handle from [`duvc_camera_open_by_index`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duvc_camera_get_video_property(
    camera: *mut Camera,
    prop: VidProp,
    out_value: *mut i32,
    out_is_auto: *mut i32,
) -> i32 {
    finish(catch_unwind_to_result(std::panic::AssertUnwindSafe(|| {
        if out_value.is_null() || out_is_auto.is_null() {
            return Err(Error::invalid_argument("out_value and out_is_auto must not be null"));
        }
        let setting = with_camera(camera, |c| c.get_video_property(prop))?;
        // SAFETY: non-null per the check above.
        unsafe {
            *out_value = setting.value;
            *out_is_auto = i32::from(setting.mode == Mode::Auto);
        }
        Ok(())
    })))
}

/// # Safety
/// `camera` must be a live handle from [`duvc_camera_open_by_index`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn duvc_camera_set_video_property(camera: *mut Camera, prop: VidProp, value: i32, is_auto: i32) -> i32 {
    finish(catch_unwind_to_result(std::panic::AssertUnwindSafe(|| {
        with_camera(camera, |c| c.set_video_property(prop, Setting::new(value, mode_from_flag(is_auto))))
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn last_error_round_trips_through_thread_local() {
        clear_last_error();
        assert!(duvc_last_error_message().is_null());
        set_last_error(&Error::invalid_argument("bad index"));
        let message = unsafe { CStr::from_ptr(duvc_last_error_message()) };
        assert!(message.to_string_lossy().contains("bad index"));
        clear_last_error();
        assert!(duvc_last_error_message().is_null());
    }

    #[test]
    fn finish_clears_error_on_success() {
        set_last_error(&Error::invalid_argument("stale"));
        assert_eq!(finish(Ok(())), ErrorKind::Success as i32);
        assert!(duvc_last_error_message().is_null());
    }

    #[test]
    fn finish_reports_kind_and_message_on_failure() {
        let code = finish(Err(Error::invalid_value("out of range")));
        assert_eq!(code, ErrorKind::InvalidValue as i32);
        let message = unsafe { CStr::from_ptr(duvc_last_error_message()) };
        assert!(message.to_string_lossy().contains("out of range"));
    }

    #[test]
    fn null_out_params_are_rejected() {
        let code = duvc_list_devices(ptr::null_mut(), ptr::null_mut());
        assert_eq!(code, ErrorKind::InvalidArgument as i32);
    }

    #[test]
    fn close_of_null_handle_is_a_no_op() {
        unsafe { duvc_camera_close(ptr::null_mut()) };
    }
}
