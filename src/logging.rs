//! The public logging contract: a level-filtered callback sink with a
//! timestamped default fallback. Distinct from the crate's internal
//! `tracing` instrumentation in `platform::windows`, which is a
//! developer-facing diagnostic channel a downstream binary opts into
//! with its own `tracing_subscriber`, not this callback.
//!
//! Global state lives behind a single `OnceLock<Mutex<LogState>>`.

use std::fmt;
use std::sync::{Mutex, OnceLock};

use chrono::Local;

/// Ascending severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

type Callback = Box<dyn Fn(LogLevel, &str) + Send + 'static>;

struct LogState {
    callback: Option<Callback>,
    min_level: LogLevel,
}

impl fmt::Debug for LogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogState")
            .field("callback", &self.callback.is_some())
            .field("min_level", &self.min_level)
            .finish()
    }
}

fn state() -> &'static Mutex<LogState> {
    static STATE: OnceLock<Mutex<LogState>> = OnceLock::new();
    STATE.get_or_init(|| Mutex::new(LogState { callback: None, min_level: LogLevel::Info }))
}

/// Install `f` as the global log sink, replacing any prior callback.
/// Passing `None` reverts to the default sink (timestamped
/// stdout/stderr).
pub fn set_log_callback(f: Option<Callback>) {
    state().lock().unwrap_or_else(std::sync::PoisonError::into_inner).callback = f;
}

/// Set the global minimum level; messages below it are discarded before
/// formatting, without invoking the callback at all.
pub fn set_min_level(level: LogLevel) {
    state().lock().unwrap_or_else(std::sync::PoisonError::into_inner).min_level = level;
}

/// Emit a log line. Called internally by [`crate::connection`] and
/// [`crate::hotplug`] to report failures and warnings with enough
/// context to identify the device and property involved; also callable
/// directly by anything embedding this crate.
///
/// If the installed callback panics, the panic is caught and the default
/// sink writes a fallback warning instead of letting it propagate into
/// whatever thread called `log` (commonly the hot-plug message-pump
/// thread, where an unwind must never reach the platform message loop).
pub fn log(level: LogLevel, message: &str) {
    let mut guard = state().lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    if level < guard.min_level {
        return;
    }
    if let Some(callback) = guard.callback.take() {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| callback(level, message)));
        guard.callback = Some(callback);
        drop(guard);
        if result.is_err() {
            default_sink(LogLevel::Warning, "log callback panicked; message below was still delivered to it");
            default_sink(level, message);
        }
    } else {
        drop(guard);
        default_sink(level, message);
    }
}

fn default_sink(level: LogLevel, message: &str) {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    let line = format!("[{timestamp}] [{level}] {message}");
    match level {
        LogLevel::Debug | LogLevel::Info | LogLevel::Warning => println!("{line}"),
        LogLevel::Error | LogLevel::Critical => eprintln!("{line}"),
    }
}
