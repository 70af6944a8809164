//! The platform-error decoder: the sole place `HRESULT` values are
//! matched against [`ErrorKind`].

use windows::core::{HRESULT, HSTRING};

use crate::error::{Error, ErrorKind};

const E_ACCESSDENIED: i32 = 0x8007_0005_u32 as i32;
const E_NOTIMPL: i32 = 0x8000_4001_u32 as i32;
const E_NOINTERFACE: i32 = 0x8000_4002_u32 as i32;
const E_INVALIDARG: i32 = 0x8007_0057_u32 as i32;
const ERROR_FILE_NOT_FOUND: i32 = 0x8007_0002_u32 as i32;
const ERROR_NOT_FOUND: i32 = 0x8007_0490_u32 as i32;
const ERROR_DEV_NOT_EXIST: i32 = 0x8007_0037_u32 as i32;
const ERROR_BUSY: i32 = 0x8007_00AA_u32 as i32;
const ERROR_SHARING_VIOLATION: i32 = 0x8007_0020_u32 as i32;
const E_BOUNDS: i32 = 0x8000_000B_u32 as i32;

/// Whether `hr` failed on a capture-filter-level interface query (vs. a
/// property-interface-level one). The caller passes this through because
/// the decoder alone cannot tell which interface was being queried:
/// no-interface on a property interface means `PropertyNotSupported`;
/// on the capture filter itself it means `NotImplemented`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceLevel {
    Filter,
    Property,
}

/// Map a platform `HRESULT` plus a context string to an [`Error`].
pub fn decode_hresult(hr: HRESULT, context: &str, level: InterfaceLevel) -> Error {
    let code = hr.0;
    let kind = match code {
        E_ACCESSDENIED => ErrorKind::PermissionDenied,
        ERROR_FILE_NOT_FOUND | ERROR_NOT_FOUND | ERROR_DEV_NOT_EXIST => ErrorKind::DeviceNotFound,
        ERROR_BUSY | ERROR_SHARING_VIOLATION => ErrorKind::DeviceBusy,
        E_NOTIMPL | E_NOINTERFACE if level == InterfaceLevel::Property => ErrorKind::PropertyNotSupported,
        E_NOTIMPL | E_NOINTERFACE => ErrorKind::NotImplemented,
        E_INVALIDARG | E_BOUNDS => ErrorKind::InvalidValue,
        _ => ErrorKind::SystemError,
    };
    let message = format!("{context}: {}", hr.message());
    Error::with_platform_code(kind, message, code)
}

/// As [`decode_hresult`], but for failures from a Win32 API (the
/// hot-plug subscription, device-path registry lookups) that report
/// through `GetLastError`/`HSTRING` formatting rather than a COM
/// `HRESULT`. Still funneled through the same `ErrorKind` taxonomy.
pub fn decode_win32_message(context: &str, message: impl Into<HSTRING>) -> Error {
    Error::new(ErrorKind::SystemError, format!("{context}: {}", message.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_denied_maps_to_permission_denied() {
        let err = decode_hresult(HRESULT(E_ACCESSDENIED), "reading Brightness", InterfaceLevel::Property);
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert_eq!(err.platform_code(), Some(E_ACCESSDENIED));
    }

    #[test]
    fn missing_property_interface_is_not_supported() {
        let err = decode_hresult(HRESULT(E_NOINTERFACE), "getting IAMCameraControl", InterfaceLevel::Property);
        assert_eq!(err.kind(), ErrorKind::PropertyNotSupported);
    }

    #[test]
    fn missing_filter_interface_is_not_implemented() {
        let err = decode_hresult(HRESULT(E_NOINTERFACE), "binding filter", InterfaceLevel::Filter);
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
    }

    #[test]
    fn device_gone_maps_to_device_not_found() {
        let err = decode_hresult(HRESULT(ERROR_DEV_NOT_EXIST), "Get", InterfaceLevel::Property);
        assert_eq!(err.kind(), ErrorKind::DeviceNotFound);
    }

    #[test]
    fn unmapped_code_falls_back_to_system_error() {
        let err = decode_hresult(HRESULT(0x1234_5678), "Set", InterfaceLevel::Property);
        assert_eq!(err.kind(), ErrorKind::SystemError);
    }
}
