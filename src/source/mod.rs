//! Platform event sources
//!
//! A source turns whatever the platform delivers into [`RawEvent`]s with a
//! millisecond timestamp relative to the moment the source was opened.

mod terminal;
#[cfg(target_os = "linux")]
mod evdev_listener;

pub use terminal::TerminalSource;
#[cfg(target_os = "linux")]
pub use evdev_listener::EvdevSource;

use crate::config::SourceKind;
use crate::device::RawEvent;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Error type for opening an event source
#[derive(Debug, Error)]
pub enum SourceError {
    /// No keyboard or mouse devices found
    #[error("No input devices found")]
    NoDevices,
    /// Devices exist but none could be opened
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// The backend is not available on this platform
    #[error("{0} source is not supported on this platform")]
    Unsupported(&'static str),
    /// Terminal could not be switched to raw mode
    #[error("Terminal setup failed: {0}")]
    Terminal(io::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Something that can be polled for raw input events
pub trait EventSource {
    /// Short name for logs and reports
    fn name(&self) -> &'static str;

    /// Wait up to `timeout` for input and append what arrived to `out`.
    ///
    /// Returns the number of events appended. Read errors are logged and
    /// treated as "no events"; polling itself never fails.
    fn poll_events(&mut self, timeout: Duration, out: &mut Vec<RawEvent>) -> usize;

    /// Whether the source put the terminal into raw mode
    fn raw_terminal(&self) -> bool {
        false
    }
}

/// Open the configured event source.
///
/// `Auto` prefers evdev on Linux and falls back to the terminal.
pub fn open_source(kind: SourceKind) -> Result<Box<dyn EventSource>, SourceError> {
    match kind {
        SourceKind::Terminal => Ok(Box::new(TerminalSource::new()?)),
        SourceKind::Evdev => open_evdev(),
        SourceKind::Auto => match open_evdev() {
            Ok(source) => Ok(source),
            Err(e) => {
                log::info!("evdev unavailable ({}), using terminal input", e);
                Ok(Box::new(TerminalSource::new()?))
            }
        },
    }
}

#[cfg(target_os = "linux")]
fn open_evdev() -> Result<Box<dyn EventSource>, SourceError> {
    Ok(Box::new(EvdevSource::new()?))
}

#[cfg(not(target_os = "linux"))]
fn open_evdev() -> Result<Box<dyn EventSource>, SourceError> {
    Err(SourceError::Unsupported("evdev"))
}
