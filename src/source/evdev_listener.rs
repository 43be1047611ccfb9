//! Raw evdev event source for Linux
//!
//! Reads keyboard and mouse events straight from `/dev/input`, using the
//! kernel's own event timestamps instead of the time we got around to
//! reading them. Every device is switched to `CLOCK_MONOTONIC` so wall-clock
//! adjustments (NTP slews, manual changes) cannot skew the deltas.

use super::{EventSource, SourceError};
use crate::device::{RawEvent, RawEventKind, Timestamp};
use evdev::{Device, InputEventKind, Key, RelativeAxisType};
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::libc;
use nix::time::{clock_gettime, ClockId};
use std::fs;
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const INPUT_DIR: &str = "/dev/input";

/// Key codes below this are keyboard keys; BTN_* codes start here
const BTN_MISC: u16 = 0x100;

/// Whether a device produces events we measure
fn is_measured_device(device: &Device) -> bool {
    let keyboard = device
        .supported_keys()
        .map_or(false, |keys| keys.contains(Key::KEY_A) && keys.contains(Key::KEY_SPACE));
    let pointer = device
        .supported_relative_axes()
        .map_or(false, |axes| axes.contains(RelativeAxisType::REL_X));
    keyboard || pointer
}

/// Find all keyboard and pointer devices we are allowed to open
fn find_input_devices() -> Result<Vec<(PathBuf, Device)>, SourceError> {
    if !Path::new(INPUT_DIR).exists() {
        return Err(SourceError::NoDevices);
    }

    let devices: Vec<(PathBuf, Device)> = evdev::enumerate()
        .filter(|(_, device)| is_measured_device(device))
        .collect();

    if devices.is_empty() {
        // enumerate() skips nodes it cannot open, so event nodes we could
        // not see usually mean missing permissions
        if has_event_nodes() {
            return Err(SourceError::PermissionDenied(
                "Cannot access any input devices. Try running with sudo or add user to 'input' group."
                    .to_string(),
            ));
        }
        return Err(SourceError::NoDevices);
    }

    Ok(devices)
}

fn has_event_nodes() -> bool {
    fs::read_dir(INPUT_DIR)
        .map(|entries| {
            entries.flatten().any(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .map_or(false, |name| name.starts_with("event"))
            })
        })
        .unwrap_or(false)
}

fn set_nonblocking(device: &Device) -> io::Result<()> {
    let fd = device.as_raw_fd();
    let flags = OFlag::from_bits_truncate(fcntl(fd, FcntlArg::F_GETFL)?);
    fcntl(fd, FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK))?;
    Ok(())
}

// EVIOCSCLOCKID: select the clock the kernel stamps this client's events with
nix::ioctl_write_ptr!(eviocsclockid, b'E', 0xa0, libc::c_int);

fn use_monotonic_clock(device: &Device) -> io::Result<()> {
    let clock: libc::c_int = libc::CLOCK_MONOTONIC;
    // SAFETY: the fd stays open while `device` is borrowed and `clock`
    // outlives the call
    unsafe { eviocsclockid(device.as_raw_fd(), &clock) }?;
    Ok(())
}

/// Current `CLOCK_MONOTONIC` time, shaped like evdev event timestamps
/// (seconds since `UNIX_EPOCH` in a `SystemTime`).
fn monotonic_now() -> io::Result<SystemTime> {
    let now = clock_gettime(ClockId::CLOCK_MONOTONIC)?;
    Ok(UNIX_EPOCH + Duration::new(now.tv_sec() as u64, now.tv_nsec() as u32))
}

/// Kernel event time relative to `epoch`, clamped at zero
fn millis_since(epoch: SystemTime, time: SystemTime) -> Timestamp {
    time.duration_since(epoch)
        .map(|d| d.as_millis() as Timestamp)
        .unwrap_or(0)
}

/// Map an evdev event to a raw event kind.
///
/// Returns `None` for events that carry no input of their own, such as
/// synchronization reports.
pub(crate) fn map_input(kind: InputEventKind, value: i32) -> Option<RawEventKind> {
    match kind {
        InputEventKind::Key(key) if key.code() < BTN_MISC => Some(match value {
            0 => RawEventKind::KeyUp,
            // 1 = press, 2 = autorepeat
            _ => RawEventKind::KeyDown,
        }),
        InputEventKind::Key(key)
            if (Key::BTN_LEFT.code()..=Key::BTN_TASK.code()).contains(&key.code()) =>
        {
            Some(if value == 0 {
                RawEventKind::PointerButtonUp
            } else {
                RawEventKind::PointerButtonDown
            })
        }
        InputEventKind::RelAxis(axis) => Some(match axis {
            RelativeAxisType::REL_X | RelativeAxisType::REL_Y => RawEventKind::PointerMotion,
            RelativeAxisType::REL_WHEEL
            | RelativeAxisType::REL_HWHEEL
            | RelativeAxisType::REL_WHEEL_HI_RES
            | RelativeAxisType::REL_HWHEEL_HI_RES => RawEventKind::Scroll,
            _ => RawEventKind::Other,
        }),
        InputEventKind::Synchronization(_) => None,
        _ => Some(RawEventKind::Other),
    }
}

/// Evdev-based keyboard and mouse source
pub struct EvdevSource {
    devices: Vec<Device>,
    epoch: SystemTime,
}

impl EvdevSource {
    /// Open every keyboard and pointer device in non-blocking mode with
    /// monotonic event timestamps
    pub fn new() -> Result<Self, SourceError> {
        let mut devices = Vec::new();

        for (path, device) in find_input_devices()? {
            set_nonblocking(&device)?;
            // A device left on the realtime clock would not be comparable
            // with the monotonic epoch
            if let Err(e) = use_monotonic_clock(&device) {
                log::warn!(
                    "evdev: skipping {}, cannot select monotonic clock: {}",
                    path.display(),
                    e
                );
                continue;
            }
            log::debug!(
                "evdev: opened {} ({})",
                path.display(),
                device.name().unwrap_or("unnamed")
            );
            devices.push(device);
        }
        if devices.is_empty() {
            return Err(SourceError::NoDevices);
        }
        log::info!("evdev: {} input device(s)", devices.len());

        Ok(Self {
            devices,
            epoch: monotonic_now()?,
        })
    }
}

impl EventSource for EvdevSource {
    fn name(&self) -> &'static str {
        "evdev"
    }

    fn poll_events(&mut self, timeout: Duration, out: &mut Vec<RawEvent>) -> usize {
        let mut count = 0;
        let epoch = self.epoch;

        for device in &mut self.devices {
            match device.fetch_events() {
                Ok(events) => {
                    for event in events {
                        if let Some(kind) = map_input(event.kind(), event.value()) {
                            let ts = millis_since(epoch, event.timestamp());
                            out.push(RawEvent::new(kind, ts));
                            count += 1;
                        }
                    }
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {}
                Err(e) => log::warn!("evdev read failed: {}", e),
            }
        }

        // Kernel timestamps keep their precision however long we sleep
        std::thread::sleep(timeout);
        count
    }
}
