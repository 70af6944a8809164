//! The property model: the closed enumerations, `(value, mode)` settings,
//! `(min, max, step, default)` ranges, and the device record.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// `IAMCameraControl` properties (pan/tilt/zoom, exposure, focus, ...).
///
/// Discriminants are the real DirectShow `CameraControl_*` property ids
/// from `ksmedia.h`; they are part of this type's contract with
/// [`crate::platform::windows`] and must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[repr(i32)]
pub enum CamProp {
    Pan = 0,
    Tilt = 1,
    Roll = 2,
    Zoom = 3,
    Exposure = 4,
    Iris = 5,
    Focus = 6,
    ScanMode = 7,
    Privacy = 8,
    PanRelative = 9,
    TiltRelative = 10,
    RollRelative = 11,
    ZoomRelative = 12,
    ExposureRelative = 13,
    IrisRelative = 14,
    FocusRelative = 15,
    PanTilt = 16,
    PanTiltRelative = 17,
    FocusSimple = 18,
    DigitalZoom = 19,
    DigitalZoomRelative = 20,
    BacklightCompensation = 21,
    Lamp = 22,
}

impl CamProp {
    /// The `IAMCameraControl` property id this variant maps to.
    ///
    /// A pure lookup: the enum is declared with the same numbering as the
    /// platform already uses, so this is a cast, but it stays a named
    /// method rather than a public `From<CamProp> for i32` impl so callers
    /// cannot quietly rely on discriminant values at call sites.
    #[must_use]
    pub fn platform_id(self) -> i32 {
        self as i32
    }
}

/// `IAMVideoProcAmp` properties (brightness, contrast, white balance, ...).
///
/// Discriminants are the real DirectShow `VideoProcAmp_*` property ids.
/// [`CamProp::BacklightCompensation`] and [`VidProp::BacklightCompensation`]
/// share a name but are distinct properties on distinct interfaces — never
/// collapse them into one tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[repr(i32)]
pub enum VidProp {
    Brightness = 0,
    Contrast = 1,
    Hue = 2,
    Saturation = 3,
    Sharpness = 4,
    Gamma = 5,
    ColorEnable = 6,
    WhiteBalance = 7,
    BacklightCompensation = 8,
    Gain = 9,
}

impl VidProp {
    /// The `IAMVideoProcAmp` property id this variant maps to.
    #[must_use]
    pub fn platform_id(self) -> i32 {
        self as i32
    }
}

/// Which interface a property belongs to. Routing by type, not by name —
/// see the `BacklightCompensation` note on [`VidProp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum PropertyKind {
    Camera(CamProp),
    Video(VidProp),
}

impl From<CamProp> for PropertyKind {
    fn from(value: CamProp) -> Self {
        PropertyKind::Camera(value)
    }
}

impl From<VidProp> for PropertyKind {
    fn from(value: VidProp) -> Self {
        PropertyKind::Video(value)
    }
}

/// Auto vs. manual control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Mode {
    Auto,
    Manual,
}

/// `CameraControl_Flags_Auto` / `VideoProcAmp_Flags_Auto` (bit 0) and the
/// `..._Flags_Manual` counterpart (bit 1), shared between the two
/// DirectShow interfaces. The library never exposes this raw bitmask.
const CAPABILITY_AUTO_FLAG: i32 = 0x1;
const CAPABILITY_MANUAL_FLAG: i32 = 0x2;

impl Mode {
    /// Translate to the platform flag bit. Ambiguous or zero flags are
    /// never produced here; `Manual` is the unconditional fallback on the
    /// reverse direction (see [`Mode::from_flags`]).
    #[must_use]
    pub fn to_flags(self) -> i32 {
        match self {
            Mode::Auto => CAPABILITY_AUTO_FLAG,
            Mode::Manual => CAPABILITY_MANUAL_FLAG,
        }
    }

    /// Translate a platform flag bitmask back to a `Mode`. A device that
    /// reports the auto bit set — with or without the manual bit also set
    /// — is treated as `Auto`; anything else is `Manual`.
    #[must_use]
    pub fn from_flags(flags: i32) -> Self {
        if flags & CAPABILITY_AUTO_FLAG != 0 {
            Mode::Auto
        } else {
            Mode::Manual
        }
    }
}

/// A property's current value and control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub value: i32,
    pub mode: Mode,
}

impl Setting {
    #[must_use]
    pub fn new(value: i32, mode: Mode) -> Self {
        Self { value, mode }
    }

    #[must_use]
    pub fn manual(value: i32) -> Self {
        Self { value, mode: Mode::Manual }
    }

    #[must_use]
    pub fn auto(value: i32) -> Self {
        Self { value, mode: Mode::Auto }
    }
}

/// A property's valid domain, as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub min: i32,
    pub max: i32,
    pub step: i32,
    pub default_val: i32,
    pub default_mode: Mode,
}

impl Range {
    #[must_use]
    pub fn new(min: i32, max: i32, step: i32, default_val: i32, default_mode: Mode) -> Self {
        Self { min, max, step, default_val, default_mode }
    }

    /// Whether this range's device-reported default mode is `Auto`.
    #[must_use]
    pub fn supports_auto(&self) -> bool {
        self.default_mode == Mode::Auto
    }

    /// `min <= v <= max` and `v` lands on a `step`-aligned grid from `min`.
    #[must_use]
    pub fn is_valid(&self, v: i32) -> bool {
        if v < self.min || v > self.max {
            return false;
        }
        self.aligned(v)
    }

    fn aligned(&self, v: i32) -> bool {
        let step = self.step.max(1);
        (i64::from(v) - i64::from(self.min)).rem_euclid(i64::from(step)) == 0
    }

    /// Clamp `v` into range and onto the step grid.
    ///
    /// `set_*` never calls this implicitly — callers own clamping policy.
    /// An out-of-range `set` rejects outright; it never silently
    /// substitutes a clamped value.
    #[must_use]
    pub fn clamp(&self, v: i32) -> i32 {
        if v <= self.min {
            return self.min;
        }
        if v >= self.max {
            return self.max;
        }
        let step = i64::from(self.step.max(1));
        let offset = i64::from(v) - i64::from(self.min);
        let mut quotient = offset.div_euclid(step);
        if 2 * offset.rem_euclid(step) >= step {
            quotient += 1;
        }
        let candidate = i64::from(self.min) + quotient * step;
        candidate.clamp(i64::from(self.min), i64::from(self.max)) as i32
    }
}

/// A point-in-time record of one property: whether it is supported, its
/// range, and its current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    pub supported: bool,
    pub range: Range,
    pub current: Setting,
}

impl Default for Capability {
    fn default() -> Self {
        Self {
            supported: false,
            range: Range::new(0, 0, 1, 0, Mode::Manual),
            current: Setting::manual(0),
        }
    }
}

/// A discovered video-input endpoint.
///
/// Equality is by `path`, case-insensitively; if either path is empty,
/// falls back to case-sensitive name equality (see [`PartialEq`] impl
/// below — deliberately hand-written rather than derived, since a derived
/// impl would also compare `name`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    pub path: String,
}

impl Device {
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self { name: name.into(), path: path.into() }
    }
}

impl PartialEq for Device {
    fn eq(&self, other: &Self) -> bool {
        if self.path.is_empty() || other.path.is_empty() {
            return self.name == other.name;
        }
        self.path.eq_ignore_ascii_case(&other.path)
    }
}

impl Eq for Device {}

/// A 128-bit property-set identifier for the vendor extension channel.
///
/// A thin, platform-independent stand-in for `windows::core::GUID` so that
/// [`crate::vendor`] and [`crate::platform::ConnectionBackend`] have a
/// concrete type on every target, not just `cfg(windows)`.
/// [`crate::platform::windows::ids::to_windows_guid`] is the only place
/// this gets converted to the real COM `GUID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl Guid {
    #[must_use]
    pub const fn new(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self { data1, data2, data3, data4 }
    }

    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        let bytes = value.to_be_bytes();
        Self {
            data1: u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            data2: u16::from_be_bytes([bytes[4], bytes[5]]),
            data3: u16::from_be_bytes([bytes[6], bytes[7]]),
            data4: [bytes[8], bytes[9], bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]],
        }
    }
}

/// A hot-plug attach/detach notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceChangeEvent {
    pub added: bool,
    pub device_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn cam_prop_has_23_distinct_platform_ids() {
        let ids: Vec<i32> = CamProp::iter().map(CamProp::platform_id).collect();
        assert_eq!(ids.len(), 23);
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len(), "CamProp platform ids must be pairwise distinct");
    }

    #[test]
    fn vid_prop_has_10_distinct_platform_ids() {
        let ids: Vec<i32> = VidProp::iter().map(VidProp::platform_id).collect();
        assert_eq!(ids.len(), 10);
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
    }

    #[test]
    fn mode_round_trips_through_flags() {
        assert_eq!(Mode::from_flags(Mode::Auto.to_flags()), Mode::Auto);
        assert_eq!(Mode::from_flags(Mode::Manual.to_flags()), Mode::Manual);
    }

    #[test]
    fn backlight_compensation_is_distinct_per_family() {
        let cam = PropertyKind::Camera(CamProp::BacklightCompensation);
        let vid = PropertyKind::Video(VidProp::BacklightCompensation);
        assert_ne!(cam, vid);
    }

    #[test]
    fn range_clamp_is_idempotent_and_valid() {
        let r = Range::new(0, 255, 5, 100, Mode::Manual);
        for v in [-100, -1, 0, 1, 4, 5, 6, 127, 253, 254, 255, 400] {
            let clamped = r.clamp(v);
            assert!(r.is_valid(clamped), "clamp({v}) = {clamped} should be valid");
            assert_eq!(r.clamp(clamped), clamped, "clamp should be idempotent");
        }
    }

    #[test]
    fn range_clamp_matches_validity() {
        let r = Range::new(0, 100, 10, 0, Mode::Manual);
        for v in -20..120 {
            assert_eq!(r.clamp(v) == v, r.is_valid(v));
        }
    }

    #[test]
    fn range_clamp_saturates_at_bounds() {
        let r = Range::new(10, 20, 1, 10, Mode::Manual);
        assert_eq!(r.clamp(-100), 10);
        assert_eq!(r.clamp(5), 10);
        assert_eq!(r.clamp(10), 10);
        assert_eq!(r.clamp(20), 20);
        assert_eq!(r.clamp(21), 20);
        assert_eq!(r.clamp(1000), 20);
    }

    #[test]
    fn device_equality_is_case_insensitive_on_path() {
        let a = Device::new("Cam A", r"\\?\usb#vid_1&pid_2");
        let b = Device::new("Cam A (different label)", r"\\?\USB#VID_1&PID_2");
        assert_eq!(a, b);
    }

    #[test]
    fn device_equality_falls_back_to_name_when_path_empty() {
        let a = Device::new("Integrated Camera", "");
        let b = Device::new("Integrated Camera", "");
        let c = Device::new("Other Camera", "");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn guid_round_trips_through_u128() {
        let value: u128 = 0x82066163_7050_4C97_8F5B_DB22_7912_0001;
        let guid = Guid::from_u128(value);
        assert_eq!(guid.data1, 0x8206_6163);
        assert_eq!(guid.data2, 0x7050);
        assert_eq!(guid.data3, 0x4C97);
    }

    #[test]
    fn device_equality_is_reflexive_symmetric_transitive() {
        let a = Device::new("A", "path");
        let b = Device::new("B", "PATH");
        let c = Device::new("C", "Path");
        assert_eq!(a, a);
        assert_eq!(a, b);
        assert_eq!(b, a);
        assert_eq!(a, c);
        assert_eq!(b, c);
    }
}
