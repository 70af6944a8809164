//! Device enumeration and the real `ConnectionBackend`, covering the
//! full `CamProp`/`VidProp` sets against `IAMCameraControl` and
//! `IAMVideoProcAmp`.

use tracing::{debug, instrument, trace};
use windows::core::{Interface, PCWSTR};
use windows::Win32::Media::DirectShow::{
    IAMCameraControl, IAMVideoProcAmp, IBaseFilter, ICreateDevEnum, IEnumMoniker, IMoniker,
};
use windows::Win32::System::Com::StructuredStorage::IPropertyBag;
use windows::Win32::System::Com::{CoCreateInstance, CLSCTX_INPROC_SERVER};
use windows::Win32::System::Variant::{VariantClear, VARIANT, VT_BSTR};

use crate::error::{Error, Result};
use crate::platform::windows::com::ensure_initialized;
use crate::platform::windows::decode::{decode_hresult, InterfaceLevel};
use crate::platform::windows::ids::{CLSID_SYSTEM_DEVICE_ENUM, CLSID_VIDEO_INPUT_DEVICE_CATEGORY};
use crate::platform::windows::ks;
use crate::platform::{Backend, ConnectionBackend};
use crate::types::{CamProp, Device, Guid, Mode, Range, Setting, VidProp};

pub struct WindowsBackend;

impl Backend for WindowsBackend {
    fn enumerate_devices(&self) -> Result<Vec<Device>> {
        enumerate_devices()
    }

    fn open(&self, device: &Device) -> Result<Box<dyn ConnectionBackend>> {
        let moniker = find_moniker_by_path(&device.path)?;
        WindowsConnection::bind(moniker).map(|c| Box::new(c) as Box<dyn ConnectionBackend>)
    }
}

#[instrument]
fn enumerate_devices() -> Result<Vec<Device>> {
    ensure_initialized()?;
    // SAFETY: COM is initialized on this thread (above); every interface
    // call below follows the `windows`-crate contract for its type.
    unsafe {
        debug!("creating ICreateDevEnum");
        let dev_enum: ICreateDevEnum = CoCreateInstance(&CLSID_SYSTEM_DEVICE_ENUM, None, CLSCTX_INPROC_SERVER)
            .map_err(|e| decode_hresult(e.code(), "CoCreateInstance(CLSID_SystemDeviceEnum)", InterfaceLevel::Filter))?;

        let mut enum_moniker: Option<IEnumMoniker> = None;
        dev_enum
            .CreateClassEnumerator(&CLSID_VIDEO_INPUT_DEVICE_CATEGORY, &mut enum_moniker, 0)
            .map_err(|e| decode_hresult(e.code(), "CreateClassEnumerator(video input category)", InterfaceLevel::Filter))?;

        let Some(enum_moniker) = enum_moniker else {
            debug!("no video input devices present");
            return Ok(Vec::new());
        };

        let mut devices = Vec::new();
        loop {
            let mut monikers: [Option<IMoniker>; 1] = [None];
            let mut fetched = 0u32;
            let hr = enum_moniker.Next(&mut monikers, Some(&mut fetched));
            if hr.is_err() || fetched == 0 {
                break;
            }
            let Some(moniker) = &monikers[0] else { break };
            let name = get_device_name(moniker).unwrap_or_else(|_| "Unknown device".to_string());
            let path = match get_device_path(moniker) {
                Ok(path) => path,
                Err(_) => continue,
            };
            trace!(name = %name, path = %path, "enumerated device");
            devices.push(Device::new(name, path));
        }
        Ok(devices)
    }
}

fn find_moniker_by_path(target_path: &str) -> Result<IMoniker> {
    ensure_initialized()?;
    // SAFETY: as `enumerate_devices`.
    unsafe {
        let dev_enum: ICreateDevEnum = CoCreateInstance(&CLSID_SYSTEM_DEVICE_ENUM, None, CLSCTX_INPROC_SERVER)
            .map_err(|e| decode_hresult(e.code(), "CoCreateInstance(CLSID_SystemDeviceEnum)", InterfaceLevel::Filter))?;
        let mut enum_moniker: Option<IEnumMoniker> = None;
        dev_enum
            .CreateClassEnumerator(&CLSID_VIDEO_INPUT_DEVICE_CATEGORY, &mut enum_moniker, 0)
            .map_err(|e| decode_hresult(e.code(), "CreateClassEnumerator(video input category)", InterfaceLevel::Filter))?;
        let Some(enum_moniker) = enum_moniker else {
            return Err(Error::device_not_found(format!("no device with path '{target_path}'")));
        };

        loop {
            let mut monikers: [Option<IMoniker>; 1] = [None];
            let mut fetched = 0u32;
            let hr = enum_moniker.Next(&mut monikers, Some(&mut fetched));
            if hr.is_err() || fetched == 0 {
                break;
            }
            let Some(moniker) = monikers[0].take() else { break };
            if let Ok(path) = get_device_path(&moniker) {
                if path.eq_ignore_ascii_case(target_path) {
                    return Ok(moniker);
                }
            }
        }
        Err(Error::device_not_found(format!("no device with path '{target_path}'")))
    }
}

unsafe fn get_device_name(moniker: &IMoniker) -> Result<String> {
    // SAFETY: caller holds a valid moniker bound on this thread.
    unsafe { get_property_string(moniker, "FriendlyName") }
}

unsafe fn get_device_path(moniker: &IMoniker) -> Result<String> {
    // SAFETY: caller holds a valid moniker bound on this thread.
    unsafe { get_property_string(moniker, "DevicePath") }
}

unsafe fn get_property_string(moniker: &IMoniker, prop_name: &str) -> Result<String> {
    use windows::core::HSTRING;

    // SAFETY: `moniker` is a live COM pointer; `BindToStorage` is a
    // standard DirectShow moniker operation.
    let prop_bag: IPropertyBag = unsafe { moniker.BindToStorage(None, None) }
        .map_err(|e| decode_hresult(e.code(), &format!("binding property bag for '{prop_name}'"), InterfaceLevel::Filter))?;

    let mut var = VARIANT::default();
    let prop_name_hstr = HSTRING::from(prop_name);
    // SAFETY: `var` is a valid out-parameter; cleared below regardless of
    // outcome.
    unsafe { prop_bag.Read(PCWSTR(prop_name_hstr.as_ptr()), &mut var, None) }
        .map_err(|e| decode_hresult(e.code(), &format!("reading property '{prop_name}'"), InterfaceLevel::Property))?;

    // SAFETY: `var` was just populated by `Read` above.
    let result = if unsafe { var.Anonymous.Anonymous.vt } == VT_BSTR {
        // SAFETY: the `vt` tag was just checked to be `VT_BSTR`.
        let bstr = unsafe { &var.Anonymous.Anonymous.Anonymous.bstrVal };
        Ok(bstr.to_string())
    } else {
        Err(Error::system_error(format!("property '{prop_name}' is not a BSTR")))
    };
    // SAFETY: `var` was initialized by `Read` above; always cleared.
    let _ = unsafe { VariantClear(&mut var) };
    result
}

#[derive(Debug)]
struct WindowsConnection {
    camera_control: IAMCameraControl,
    video_proc_amp: IAMVideoProcAmp,
    filter: IBaseFilter,
}

impl WindowsConnection {
    fn bind(moniker: IMoniker) -> Result<Self> {
        // SAFETY: `moniker` is a live COM pointer from enumeration.
        let filter: IBaseFilter = unsafe { moniker.BindToObject(None, None) }
            .map_err(|e| decode_hresult(e.code(), "binding device filter", InterfaceLevel::Filter))?;
        let camera_control: IAMCameraControl = filter
            .cast()
            .map_err(|e| decode_hresult(e.code(), "querying IAMCameraControl", InterfaceLevel::Property))?;
        let video_proc_amp: IAMVideoProcAmp = filter
            .cast()
            .map_err(|e| decode_hresult(e.code(), "querying IAMVideoProcAmp", InterfaceLevel::Property))?;
        Ok(Self { camera_control, video_proc_amp, filter })
    }
}

impl ConnectionBackend for WindowsConnection {
    fn get_camera_property(&self, prop: CamProp) -> Result<Setting> {
        let mut value = 0;
        let mut flags = 0;
        // SAFETY: `camera_control` is a live interface bound to `filter`.
        unsafe { self.camera_control.Get(prop.platform_id(), &mut value, &mut flags) }
            .map_err(|e| decode_hresult(e.code(), &format!("getting {prop}"), InterfaceLevel::Property))?;
        Ok(Setting::new(value, Mode::from_flags(flags)))
    }

    fn set_camera_property(&self, prop: CamProp, setting: Setting) -> Result<()> {
        // SAFETY: as `get_camera_property`.
        unsafe { self.camera_control.Set(prop.platform_id(), setting.value, setting.mode.to_flags()) }
            .map_err(|e| decode_hresult(e.code(), &format!("setting {prop} to {}", setting.value), InterfaceLevel::Property))
    }

    fn get_camera_property_range(&self, prop: CamProp) -> Result<Range> {
        let (mut min, mut max, mut step, mut default, mut caps) = (0, 0, 0, 0, 0);
        // SAFETY: as `get_camera_property`.
        unsafe { self.camera_control.GetRange(prop.platform_id(), &mut min, &mut max, &mut step, &mut default, &mut caps) }
            .map_err(|e| decode_hresult(e.code(), &format!("getting range of {prop}"), InterfaceLevel::Property))?;
        Ok(Range::new(min, max, step, default, Mode::from_flags(caps)))
    }

    fn get_video_property(&self, prop: VidProp) -> Result<Setting> {
        let mut value = 0;
        let mut flags = 0;
        // SAFETY: `video_proc_amp` is a live interface bound to `filter`.
        unsafe { self.video_proc_amp.Get(prop.platform_id(), &mut value, &mut flags) }
            .map_err(|e| decode_hresult(e.code(), &format!("getting {prop}"), InterfaceLevel::Property))?;
        Ok(Setting::new(value, Mode::from_flags(flags)))
    }

    fn set_video_property(&self, prop: VidProp, setting: Setting) -> Result<()> {
        // SAFETY: as `get_video_property`.
        unsafe { self.video_proc_amp.Set(prop.platform_id(), setting.value, setting.mode.to_flags()) }
            .map_err(|e| decode_hresult(e.code(), &format!("setting {prop} to {}", setting.value), InterfaceLevel::Property))
    }

    fn get_video_property_range(&self, prop: VidProp) -> Result<Range> {
        let (mut min, mut max, mut step, mut default, mut caps) = (0, 0, 0, 0, 0);
        // SAFETY: as `get_video_property`.
        unsafe { self.video_proc_amp.GetRange(prop.platform_id(), &mut min, &mut max, &mut step, &mut default, &mut caps) }
            .map_err(|e| decode_hresult(e.code(), &format!("getting range of {prop}"), InterfaceLevel::Property))?;
        Ok(Range::new(min, max, step, default, Mode::from_flags(caps)))
    }

    fn is_valid(&self) -> bool {
        self.get_video_property_range(VidProp::Brightness).is_ok() || self.get_camera_property_range(CamProp::Pan).is_ok()
    }

    fn vendor_get(&self, guid: Guid, property_id: u32) -> Result<Vec<u8>> {
        ks::vendor_get(&self.filter, guid, property_id)
    }

    fn vendor_set(&self, guid: Guid, property_id: u32, bytes: &[u8]) -> Result<()> {
        ks::vendor_set(&self.filter, guid, property_id, bytes)
    }
}
