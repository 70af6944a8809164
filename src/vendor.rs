//! The vendor-extension channel: a typed, byte-oriented path to a
//! `(property-set GUID, property id)` pair over the kernel-streaming
//! property-set interface.
//!
//! The library does not interpret vendor payloads — it transmits
//! caller-supplied bytes verbatim and returns whatever the device sent
//! back. [`WellKnownProperty`] is a convenience enumeration of the ten
//! documented Logitech property ids; the binary layouts of
//! `DigitalZoomRoi` and `TiltPan` are undocumented and not encoded
//! here.

use crate::connection::Connection;
use crate::error::Result;
use crate::types::Guid;

/// The Logitech vendor property-set GUID used by all
/// [`WellKnownProperty`] values.
pub const LOGITECH_PROPERTY_SET: Guid = Guid::from_u128(0x82066163_7050_4C97_8F5B_DB22_7912_0001);

/// The ten documented Logitech vendor extension properties.
///
/// A convenience constructor for `(guid, property_id)` pairs only; the
/// transport accepts any GUID and id, documented or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum WellKnownProperty {
    RightLight,
    RightSound,
    FaceTracking,
    LedIndicator,
    ProcessorUsage,
    RawDataBits,
    FocusAssist,
    VideoStandard,
    DigitalZoomRoi,
    TiltPan,
}

impl WellKnownProperty {
    /// The property set GUID to pair this id with (always
    /// [`LOGITECH_PROPERTY_SET`] for the documented set).
    #[must_use]
    pub fn property_set(self) -> Guid {
        LOGITECH_PROPERTY_SET
    }

    /// The property id within [`LOGITECH_PROPERTY_SET`].
    #[must_use]
    pub fn property_id(self) -> u32 {
        match self {
            Self::RightLight => 1,
            Self::RightSound => 2,
            Self::FaceTracking => 3,
            Self::LedIndicator => 4,
            Self::ProcessorUsage => 5,
            Self::RawDataBits => 6,
            Self::FocusAssist => 7,
            Self::VideoStandard => 8,
            Self::DigitalZoomRoi => 9,
            Self::TiltPan => 10,
        }
    }
}

/// Read a vendor-extension property's current payload.
///
/// "Property-set not found" on the underlying interface is mapped to
/// `PropertyNotSupported` by the platform decoder, same as an
/// unsupported `CamProp`/`VidProp`.
pub fn vendor_get(connection: &Connection, guid: Guid, property_id: u32) -> Result<Vec<u8>> {
    connection.vendor_get(guid, property_id)
}

/// Write a vendor-extension property's payload verbatim.
pub fn vendor_set(connection: &Connection, guid: Guid, property_id: u32, bytes: &[u8]) -> Result<()> {
    connection.vendor_set(guid, property_id, bytes)
}
