//! `duvc-ctl`: a library for discovering and controlling UVC cameras on
//! Windows through DirectShow.
//!
//! The crate never builds a filter graph and never streams frames — it
//! only binds a device's capture filter long enough to read and write
//! its camera-control and video-proc-amp properties. See [`Camera`] for
//! the primary entry point, [`device::list_devices`] for discovery, and
//! [`hotplug`] for attach/detach notifications.
//!
//! On non-Windows targets the crate still compiles; every platform call
//! returns [`error::ErrorKind::NotImplemented`] instead of touching an
//! OS API (see [`platform::stub`]).

pub mod camera;
pub mod capability;
pub mod connection;
pub mod device;
pub mod error;
pub mod ffi;
pub mod hotplug;
pub mod logging;
pub mod platform;
pub mod types;
pub mod vendor;

pub use camera::Camera;
pub use capability::CapabilitySnapshot;
pub use connection::Connection;
pub use error::{Error, ErrorKind, Result};
pub use logging::{log, set_log_callback, set_min_level, LogLevel};
pub use types::{CamProp, Capability, Device, DeviceChangeEvent, Guid, Mode, PropertyKind, Range, Setting, VidProp};
