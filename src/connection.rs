//! A live handle to one device's camera-control and video-proc-amp
//! interfaces.
//!
//! `Connection` is deliberately `!Send` and `!Sync`: DirectShow's COM
//! interfaces are apartment-threaded, so a connection must only ever be
//! touched from the thread that opened it. That constraint is enforced
//! twice — structurally, via a `PhantomData<*const ()>` field that blocks
//! the auto-traits outright, and again at runtime, by recording the first
//! caller's `ThreadId` and rejecting calls from any other thread. Either
//! one alone has a gap: the marker stops the compiler from handing a
//! `Connection` to another thread, but not a future `unsafe impl Send`
//! regression reaching in through a raw pointer; the runtime check covers
//! that case.

use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::thread::ThreadId;

use crate::error::{Error, ErrorKind, Result};
use crate::platform::{self, ConnectionBackend};
use crate::types::{CamProp, Device, Guid, Range, Setting, VidProp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Lost,
}

/// An open connection to one device's control interfaces.
///
/// See the module docs for the thread-affinity contract. The connection
/// stays in [`State::Open`] across ordinary operation failures — only a
/// `DeviceNotFound` result (a disconnect-class failure) moves it to
/// `Lost`, after which every further call short-circuits with
/// `DeviceNotFound` instead of re-querying a device that is gone.
pub struct Connection {
    device: Device,
    backend: Box<dyn ConnectionBackend>,
    owner_thread: Cell<Option<ThreadId>>,
    state: Cell<State>,
    _not_send_sync: PhantomData<*const ()>,
}

impl Connection {
    /// Open a connection to `device` through the platform backend compiled
    /// in for this target.
    pub fn open(device: &Device) -> Result<Self> {
        let backend = platform::current().open(device)?;
        Ok(Self::from_parts(device.clone(), backend))
    }

    /// Open a connection through an explicit backend, bypassing
    /// [`platform::current`]. Used by tests and by callers that need to
    /// inject [`crate::platform::mock::MockBackend`].
    #[must_use]
    pub fn open_with_backend(device: &Device, backend: Box<dyn ConnectionBackend>) -> Self {
        Self::from_parts(device.clone(), backend)
    }

    fn from_parts(device: Device, backend: Box<dyn ConnectionBackend>) -> Self {
        Self {
            device,
            backend,
            owner_thread: Cell::new(None),
            state: Cell::new(State::Open),
            _not_send_sync: PhantomData,
        }
    }

    /// The device record this connection was opened against.
    #[must_use]
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Whether a prior operation observed a disconnect-class failure.
    /// Once `true`, every operation on this connection returns
    /// `DeviceNotFound` without touching the backend.
    #[must_use]
    pub fn is_lost(&self) -> bool {
        self.state.get() == State::Lost
    }

    fn check_thread(&self) -> Result<()> {
        let current = std::thread::current().id();
        match self.owner_thread.get() {
            None => {
                self.owner_thread.set(Some(current));
                Ok(())
            }
            Some(owner) if owner == current => Ok(()),
            Some(owner) => Err(Error::system_error(format!(
                "Connection opened on thread {owner:?} cannot be used from thread {current:?}"
            ))),
        }
    }

    fn guard(&self) -> Result<()> {
        self.check_thread()?;
        if self.state.get() == State::Lost {
            return Err(Error::device_not_found(format!("connection to '{}' was already lost", self.device.path)));
        }
        Ok(())
    }

    fn track<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if e.kind() == ErrorKind::DeviceNotFound {
                self.state.set(State::Lost);
            }
        }
        result
    }

    pub fn get_camera_property(&self, prop: CamProp) -> Result<Setting> {
        self.guard()?;
        self.track(self.backend.get_camera_property(prop))
    }

    /// The library does not clamp on set: an out-of-range value is
    /// rejected with `InvalidValue` rather than silently rounded. Callers
    /// that want clamping apply `Range::clamp` themselves first.
    pub fn set_camera_property(&self, prop: CamProp, setting: Setting) -> Result<()> {
        self.guard()?;
        let range = self.track(self.backend.get_camera_property_range(prop))?;
        if !range.is_valid(setting.value) {
            return Err(Error::invalid_value(format!(
                "{} is outside [{}, {}] step {} for {prop}",
                setting.value, range.min, range.max, range.step
            )));
        }
        self.track(self.backend.set_camera_property(prop, setting))
    }

    pub fn get_camera_property_range(&self, prop: CamProp) -> Result<Range> {
        self.guard()?;
        self.track(self.backend.get_camera_property_range(prop))
    }

    pub fn get_video_property(&self, prop: VidProp) -> Result<Setting> {
        self.guard()?;
        self.track(self.backend.get_video_property(prop))
    }

    pub fn set_video_property(&self, prop: VidProp, setting: Setting) -> Result<()> {
        self.guard()?;
        let range = self.track(self.backend.get_video_property_range(prop))?;
        if !range.is_valid(setting.value) {
            return Err(Error::invalid_value(format!(
                "{} is outside [{}, {}] step {} for {prop}",
                setting.value, range.min, range.max, range.step
            )));
        }
        self.track(self.backend.set_video_property(prop, setting))
    }

    pub fn get_video_property_range(&self, prop: VidProp) -> Result<Range> {
        self.guard()?;
        self.track(self.backend.get_video_property_range(prop))
    }

    /// Lightweight connectivity probe. Never transitions the connection to
    /// `Lost` by itself — only an operation that genuinely needed to
    /// succeed does that.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        if self.check_thread().is_err() || self.state.get() == State::Lost {
            return false;
        }
        self.backend.is_valid()
    }

    pub fn vendor_get(&self, guid: Guid, property_id: u32) -> Result<Vec<u8>> {
        self.guard()?;
        self.track(self.backend.vendor_get(guid, property_id))
    }

    pub fn vendor_set(&self, guid: Guid, property_id: u32, bytes: &[u8]) -> Result<()> {
        self.guard()?;
        self.track(self.backend.vendor_set(guid, property_id, bytes))
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("device", &self.device)
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}
