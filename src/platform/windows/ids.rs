//! GUID constants and the one conversion point between
//! [`crate::types::Guid`] (the platform-independent type in the public
//! API) and `windows::core::GUID` (the real COM type).
//!
//! `KSCATEGORY_CAPTURE` is needed by [`super::notify`] for the hot-plug
//! device-interface filter.

use windows::core::GUID;

use crate::types::Guid;

/// `CLSID_SystemDeviceEnum` — the system device enumerator.
pub const CLSID_SYSTEM_DEVICE_ENUM: GUID = GUID::from_u128(0x62be_5d10_60eb_11d0_bd3b_00a0_c911_ce86);

/// `CLSID_VideoInputDeviceCategory` — the video-capture device class used
/// to scope enumeration to cameras.
pub const CLSID_VIDEO_INPUT_DEVICE_CATEGORY: GUID = GUID::from_u128(0x860b_b310_5d01_11d0_bd3b_00a0_c911_ce86);

/// `KSCATEGORY_CAPTURE` — the device-interface class hot-plug
/// notifications are filtered to.
pub const KSCATEGORY_CAPTURE: GUID = GUID::from_u128(0x65e8_773d_8f56_11d0_a3b9_00a0_c922_3196);

/// Convert the public, platform-independent [`Guid`] into the real COM
/// `GUID` used by `IKsPropertySet::Get`/`Set`.
#[must_use]
pub fn to_windows_guid(guid: Guid) -> GUID {
    GUID::from_values(guid.data1, guid.data2, guid.data3, guid.data4)
}

/// Convert a COM `GUID` back into the public [`Guid`] representation.
#[must_use]
pub fn from_windows_guid(guid: GUID) -> Guid {
    Guid::new(guid.data1, guid.data2, guid.data3, guid.data4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guid_conversion_round_trips() {
        let public = Guid::from_u128(0x0123_4567_89ab_cdef_0011_2233_4455_6677);
        assert_eq!(from_windows_guid(to_windows_guid(public)), public);
    }
}
