//! The vendor extension channel: `IKsPropertySet::Get`/`Set` against a
//! capture filter's property set.
//!
//! `Get` passes a null input pointer and relies on the explicit
//! `returned_size` out-parameter; `Set` passes the caller's bytes
//! directly as the property value.

use std::ptr::{null, null_mut};

use windows::core::Interface;
use windows::Win32::Media::DirectShow::IBaseFilter;
use windows::Win32::Media::KernelStreaming::IKsPropertySet;

use crate::error::Result;
use crate::platform::windows::decode::{decode_hresult, InterfaceLevel};
use crate::platform::windows::ids::to_windows_guid;
use crate::types::Guid;

fn property_set(filter: &IBaseFilter) -> Result<IKsPropertySet> {
    filter
        .cast()
        .map_err(|e| decode_hresult(e.code(), "querying IKsPropertySet", InterfaceLevel::Property))
}

pub fn vendor_get(filter: &IBaseFilter, guid: Guid, property_id: u32) -> Result<Vec<u8>> {
    let prop_set = property_set(filter)?;
    let guid = to_windows_guid(guid);

    let mut returned_size = 0u32;
    // SAFETY: a zero-length probe call to learn the buffer size; `IKsPropertySet::Get`
    // tolerates a null data pointer with `data_length` 0 for this purpose.
    let probe = unsafe { prop_set.Get(&guid, property_id, null(), 0, null_mut(), 0, &mut returned_size) };
    if let Err(e) = probe {
        return Err(decode_hresult(e.code(), "probing vendor property size", InterfaceLevel::Property));
    }
    if returned_size == 0 {
        return Ok(Vec::new());
    }

    let mut buffer = vec![0u8; returned_size as usize];
    let mut actual_size = 0u32;
    // SAFETY: `buffer` is sized to the length the probe call above reported.
    unsafe {
        prop_set.Get(
            &guid,
            property_id,
            null(),
            0,
            buffer.as_mut_ptr().cast(),
            buffer.len() as u32,
            &mut actual_size,
        )
    }
    .map_err(|e| decode_hresult(e.code(), "reading vendor property", InterfaceLevel::Property))?;
    buffer.truncate(actual_size as usize);
    Ok(buffer)
}

pub fn vendor_set(filter: &IBaseFilter, guid: Guid, property_id: u32, bytes: &[u8]) -> Result<()> {
    let prop_set = property_set(filter)?;
    let guid = to_windows_guid(guid);

    // SAFETY: `bytes` is a valid, sized input buffer for the duration of
    // the call; no instance data is used.
    unsafe { prop_set.Set(&guid, property_id, null(), 0, bytes.as_ptr().cast(), bytes.len() as u32) }
        .map_err(|e| decode_hresult(e.code(), "writing vendor property", InterfaceLevel::Property))
}
