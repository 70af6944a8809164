//! Uniform fallibility channel for the crate.
//!
//! Every public entry point returns [`Result<T>`] instead of throwing. The
//! `ErrorKind` taxonomy is closed: callers match on it to decide whether to
//! retry, discard a connection, or surface a message to a human.

use std::fmt;

/// Closed classification of everything that can go wrong in this crate.
///
/// `Success` is never stored inside an [`Error`] — it exists only as the
/// absence-of-error sentinel needed at the C ABI boundary (see
/// [`crate::ffi`]), where a plain integer has to stand in for `Result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[repr(i32)]
pub enum ErrorKind {
    Success = 0,
    DeviceNotFound = 1,
    DeviceBusy = 2,
    PropertyNotSupported = 3,
    InvalidValue = 4,
    PermissionDenied = 5,
    SystemError = 6,
    InvalidArgument = 7,
    NotImplemented = 8,
}

/// An error produced by the crate.
///
/// Carries the closed [`ErrorKind`], a human-readable description, and —
/// when the failure originated from a platform call — the raw platform
/// result code (an `HRESULT` value on Windows) for diagnostics.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    platform_code: Option<i32>,
}

impl Error {
    /// Build an error with no underlying platform code.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), platform_code: None }
    }

    /// Build an error that carries a raw platform result code.
    #[must_use]
    pub fn with_platform_code(kind: ErrorKind, message: impl Into<String>, code: i32) -> Self {
        Self { kind, message: message.into(), platform_code: Some(code) }
    }

    /// The error's classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The human-readable description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The raw platform result code, if this error was decoded from one.
    #[must_use]
    pub fn platform_code(&self) -> Option<i32> {
        self.platform_code
    }

    /// Attach additional context to the message without changing the kind.
    #[must_use]
    pub fn context(mut self, context: impl fmt::Display) -> Self {
        self.message = format!("{context}: {}", self.message);
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.platform_code {
            Some(code) => write!(f, "{} ({}, platform code 0x{code:08X})", self.message, self.kind),
            None => write!(f, "{} ({})", self.message, self.kind),
        }
    }
}

impl std::error::Error for Error {}

/// The crate's result alias. `Result<()>` is the success/failure-without-a-value case.
pub type Result<T> = std::result::Result<T, Error>;

/// Convenience constructors used throughout the crate; one per `ErrorKind`
/// that callers are expected to construct directly (as opposed to kinds
/// that only ever arise from platform-code decoding).
impl Error {
    #[must_use]
    pub fn device_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DeviceNotFound, message)
    }

    #[must_use]
    pub fn property_not_supported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PropertyNotSupported, message)
    }

    #[must_use]
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidValue, message)
    }

    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    #[must_use]
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotImplemented, message)
    }

    #[must_use]
    pub fn system_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SystemError, message)
    }
}

/// Run `f`, converting a panic into `Err(SystemError)` instead of unwinding
/// past the caller.
///
/// Applied at the outermost public entry points only (`Camera`,
/// `Connection`'s public methods, every `extern "C"` function in
/// [`crate::ffi`]) — not inside platform internals, so that a panic while a
/// raw COM interface pointer is held still unwinds through that pointer's
/// `Drop` before being caught here.
pub fn catch_unwind_to_result<T>(f: impl FnOnce() -> Result<T> + std::panic::UnwindSafe) -> Result<T> {
    match std::panic::catch_unwind(f) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic with non-string payload".to_string());
            Err(Error::system_error(format!("internal panic: {message}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_code() {
        let err = Error::with_platform_code(ErrorKind::SystemError, "reading Brightness", 0x8007_0005u32 as i32);
        let text = err.to_string();
        assert!(text.contains("reading Brightness"));
        assert!(text.contains("SystemError"));
        assert!(text.contains("0x80070005"));
    }

    #[test]
    fn context_prefixes_message() {
        let err = Error::property_not_supported("Pan").context("get_camera_property_range");
        assert_eq!(err.message(), "get_camera_property_range: Pan");
        assert_eq!(err.kind(), ErrorKind::PropertyNotSupported);
    }

    #[test]
    fn catch_unwind_converts_panic() {
        let result: Result<()> = catch_unwind_to_result(|| panic!("boom"));
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SystemError);
        assert!(err.message().contains("boom"));
    }

    #[test]
    fn catch_unwind_passes_through_ok() {
        let result: Result<i32> = catch_unwind_to_result(|| Ok(42));
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn success_kind_has_discriminant_zero() {
        assert_eq!(ErrorKind::Success as i32, 0);
    }
}
