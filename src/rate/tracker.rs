//! Per-device-class routing of timestamps into rate windows

use super::{RateWindow, Summary};
use crate::device::{DeviceClass, Timestamp};
use std::collections::BTreeMap;

/// Owns one [`RateWindow`] per device class seen so far
#[derive(Debug, Clone)]
pub struct RateTracker {
    windows: BTreeMap<DeviceClass, RateWindow>,
    /// Events offered to `record_event`
    events_seen: u64,
    /// Events that were stored (not duplicates)
    events_recorded: u64,
}

impl RateTracker {
    pub fn new() -> Self {
        Self {
            windows: BTreeMap::new(),
            events_seen: 0,
            events_recorded: 0,
        }
    }

    /// Record an event timestamp under its device class
    pub fn record_event(&mut self, class: DeviceClass, ts: Timestamp) {
        self.events_seen += 1;
        let window = self.windows.entry(class).or_default();
        if window.record(ts) {
            self.events_recorded += 1;
        }
    }

    /// Summaries of every class with data, in class order
    pub fn summarize_all(&self) -> Vec<(DeviceClass, Summary)> {
        self.windows
            .iter()
            .filter_map(|(class, window)| window.summarize().map(|s| (*class, s)))
            .collect()
    }

    /// Get the window for a specific class
    pub fn window(&self, class: DeviceClass) -> Option<&RateWindow> {
        self.windows.get(&class)
    }

    pub fn events_seen(&self) -> u64 {
        self.events_seen
    }

    pub fn events_recorded(&self) -> u64 {
        self.events_recorded
    }

    /// Events dropped because they repeated the previous timestamp
    pub fn duplicates(&self) -> u64 {
        self.events_seen - self.events_recorded
    }
}

impl Default for RateTracker {
    fn default() -> Self {
        Self::new()
    }
}
