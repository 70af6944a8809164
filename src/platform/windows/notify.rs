//! Hot-plug notifications: a hidden message-only window, subscribed to
//! `WM_DEVICECHANGE` via `RegisterDeviceNotificationW`, pumped on its own
//! thread.
//!
//! Global state lives behind a single `OnceLock<Arc<Mutex<_>>>`, with a
//! raw `isize` window handle stashed for the `extern "system"` window
//! procedure to look itself up by, since the procedure can't capture a
//! closure.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::JoinHandle;

use windows::core::{w, PCWSTR};
use windows::Win32::Devices::DeviceAndDriverInstallation::{
    RegisterDeviceNotificationW, UnregisterDeviceNotification, DEV_BROADCAST_DEVICEINTERFACE_W, DEVICE_NOTIFY_WINDOW_HANDLE,
    DBT_DEVICEARRIVAL, DBT_DEVICEREMOVECOMPLETE, DBT_DEVTYP_DEVICEINTERFACE,
};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW, PostMessageW, RegisterClassW, TranslateMessage,
    CW_USEDEFAULT, HWND_MESSAGE, MSG, WM_CLOSE, WM_DEVICECHANGE, WNDCLASSW, WS_OVERLAPPEDWINDOW,
};

use crate::error::{Error, Result};
use crate::platform::windows::ids::KSCATEGORY_CAPTURE;
use crate::platform::{HotplugBackend, HotplugCallback, HotplugHandle};

const WM_APP_UNREGISTER: u32 = windows::Win32::UI::WindowsAndMessaging::WM_APP + 1;

struct NotifyState {
    callbacks: HashMap<isize, HotplugCallback>,
}

static STATE: OnceLock<Arc<Mutex<NotifyState>>> = OnceLock::new();

fn state() -> &'static Arc<Mutex<NotifyState>> {
    STATE.get_or_init(|| Arc::new(Mutex::new(NotifyState { callbacks: HashMap::new() })))
}

pub struct WindowsHotplugBackend;

impl HotplugBackend for WindowsHotplugBackend {
    fn register(&self, callback: HotplugCallback) -> Result<Box<dyn HotplugHandle>> {
        let (hwnd, join_handle) = spawn_pump_thread()?;
        state().lock().unwrap_or_else(std::sync::PoisonError::into_inner).callbacks.insert(hwnd.0 as isize, callback);
        Ok(Box::new(WindowsHotplugHandle { hwnd, join_handle: Some(join_handle) }))
    }
}

pub struct WindowsHotplugHandle {
    hwnd: HWND,
    join_handle: Option<JoinHandle<()>>,
}

impl HotplugHandle for WindowsHotplugHandle {}

impl Drop for WindowsHotplugHandle {
    fn drop(&mut self) {
        state().lock().unwrap_or_else(std::sync::PoisonError::into_inner).callbacks.remove(&(self.hwnd.0 as isize));
        // SAFETY: `hwnd` was created by this handle's own pump thread and is
        // still live; posting WM_APP_UNREGISTER tells that thread's message
        // loop to tear itself down.
        unsafe {
            let _ = PostMessageW(Some(self.hwnd), WM_APP_UNREGISTER, WPARAM(0), LPARAM(0));
        }
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}

fn spawn_pump_thread() -> Result<(HWND, JoinHandle<()>)> {
    let (tx, rx) = std::sync::mpsc::channel::<Result<HWND>>();
    let join_handle = std::thread::Builder::new()
        .name("duvc-ctl-hotplug".to_string())
        .spawn(move || pump(tx))
        .map_err(|e| Error::system_error(format!("spawning hot-plug pump thread: {e}")))?;
    let hwnd = rx
        .recv()
        .map_err(|_| Error::system_error("hot-plug pump thread exited before reporting its window handle"))??;
    Ok((hwnd, join_handle))
}

fn pump(ready: std::sync::mpsc::Sender<Result<HWND>>) {
    let hwnd = match create_message_window() {
        Ok(hwnd) => hwnd,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    let notification_handle = match register_device_interface_notification(hwnd) {
        Ok(handle) => handle,
        Err(e) => {
            // SAFETY: `hwnd` was just created on this thread by `create_message_window`.
            unsafe {
                let _ = DestroyWindow(hwnd);
            }
            let _ = ready.send(Err(e));
            return;
        }
    };
    let _ = ready.send(Ok(hwnd));

    let mut msg = MSG::default();
    // SAFETY: `hwnd` is this thread's own message-only window; the loop
    // runs until `WM_CLOSE` (posted by the window procedure in response to
    // `WM_APP_UNREGISTER`) or `GetMessageW` reports `WM_QUIT`.
    unsafe {
        while GetMessageW(&mut msg, Some(hwnd), 0, 0).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
        let _ = UnregisterDeviceNotification(notification_handle);
    }
}

fn create_message_window() -> Result<HWND> {
    // SAFETY: no DLL handle tracking is needed; `GetModuleHandleW(None)`
    // returns the handle of the running executable/library.
    let instance = unsafe { GetModuleHandleW(None) }.map_err(|e| Error::system_error(format!("GetModuleHandleW: {e}")))?;
    let class_name = w!("duvc_ctl_hotplug_window");

    let wnd_class = WNDCLASSW { lpfnWndProc: Some(window_proc), hInstance: instance.into(), lpszClassName: class_name, ..Default::default() };
    // SAFETY: `wnd_class` is fully initialized; registering the same class
    // name twice is harmless (a later call fails with a distinct error
    // this thread ignores, since the class may already be registered by an
    // earlier hot-plug subscription).
    unsafe {
        RegisterClassW(&wnd_class);
    }

    // SAFETY: a message-only window (`HWND_MESSAGE` parent) never becomes
    // visible and receives no user input; every argument is either a
    // registered class name or a benign default.
    let hwnd = unsafe {
        CreateWindowExW(
            Default::default(),
            class_name,
            w!("duvc-ctl hotplug notifier"),
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            Some(HWND_MESSAGE),
            None,
            Some(instance.into()),
            None,
        )
    }
    .map_err(|e| Error::system_error(format!("CreateWindowExW: {e}")))?;
    Ok(hwnd)
}

fn register_device_interface_notification(hwnd: HWND) -> Result<windows::Win32::Devices::DeviceAndDriverInstallation::HDEVNOTIFY> {
    let mut filter = DEV_BROADCAST_DEVICEINTERFACE_W {
        dbcc_size: std::mem::size_of::<DEV_BROADCAST_DEVICEINTERFACE_W>() as u32,
        dbcc_devicetype: DBT_DEVTYP_DEVICEINTERFACE.0,
        dbcc_classguid: KSCATEGORY_CAPTURE,
        ..Default::default()
    };
    // SAFETY: `filter` is a correctly sized, correctly tagged
    // `DEV_BROADCAST_DEVICEINTERFACE_W`; `hwnd` is this thread's own
    // message-only window.
    let handle = unsafe {
        RegisterDeviceNotificationW(windows::Win32::Foundation::HANDLE(hwnd.0), std::ptr::addr_of_mut!(filter).cast(), DEVICE_NOTIFY_WINDOW_HANDLE)
    };
    if handle.0.is_null() {
        return Err(Error::system_error("RegisterDeviceNotificationW failed"));
    }
    Ok(handle)
}

extern "system" fn window_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match msg {
        WM_DEVICECHANGE => {
            let added = match wparam.0 as u32 {
                DBT_DEVICEARRIVAL => Some(true),
                DBT_DEVICEREMOVECOMPLETE => Some(false),
                _ => None,
            };
            if let Some(added) = added {
                dispatch(hwnd, added, lparam);
            }
            LRESULT(1)
        }
        WM_APP_UNREGISTER => {
            // SAFETY: `hwnd` is the window receiving its own message.
            unsafe {
                let _ = PostMessageW(Some(hwnd), WM_CLOSE, WPARAM(0), LPARAM(0));
            }
            LRESULT(0)
        }
        // SAFETY: standard default handling for every other message.
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

fn dispatch(hwnd: HWND, added: bool, lparam: LPARAM) {
    let Some(device_path) = device_path_from_broadcast(lparam) else { return };
    let guard = state().lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    if let Some(callback) = guard.callbacks.get(&(hwnd.0 as isize)) {
        callback(added, &device_path);
    }
}

fn device_path_from_broadcast(lparam: LPARAM) -> Option<String> {
    // SAFETY: the message loop only reaches here from `WM_DEVICECHANGE`
    // with `DBT_DEVICEARRIVAL`/`DBT_DEVICEREMOVECOMPLETE`, whose `lParam`
    // is guaranteed by the OS to point to a `DEV_BROADCAST_DEVICEINTERFACE_W`.
    unsafe {
        let header = lparam.0 as *const windows::Win32::Devices::DeviceAndDriverInstallation::DEV_BROADCAST_HDR;
        if (*header).dbch_devicetype != DBT_DEVTYP_DEVICEINTERFACE.0 {
            return None;
        }
        let interface = lparam.0 as *const DEV_BROADCAST_DEVICEINTERFACE_W;
        let name = PCWSTR((*interface).dbcc_name.as_ptr());
        Some(name.to_string().unwrap_or_default())
    }
}
