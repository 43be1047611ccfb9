//! Bounded trailing window of event timestamps and instantaneous rates

use crate::device::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of samples kept per window
pub const CAPACITY: usize = 64;

/// Max and average of a window's instantaneous rates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Highest instantaneous rate in Hz
    pub max_rate: f64,
    /// Mean of all instantaneous rates in Hz
    pub avg_rate: f64,
}

/// Recent timestamps of one device class and the rate derived at each.
///
/// `timestamps` and `instant_rates` are index-aligned. The first sample
/// recorded into an empty window has no reference point and is stored as a
/// rate of 0.0; it stays part of the average until evicted.
#[derive(Debug, Clone)]
pub struct RateWindow {
    timestamps: VecDeque<Timestamp>,
    instant_rates: VecDeque<f64>,
}

impl RateWindow {
    pub fn new() -> Self {
        Self {
            timestamps: VecDeque::with_capacity(CAPACITY + 1),
            instant_rates: VecDeque::with_capacity(CAPACITY + 1),
        }
    }

    /// Record an event timestamp.
    ///
    /// Returns `false` when the timestamp repeats the last one stored, in
    /// which case the window is left untouched.
    pub fn record(&mut self, ts: Timestamp) -> bool {
        let rate = match self.timestamps.back() {
            Some(&last) if last == ts => return false,
            Some(&last) => {
                // Sources are monotonic; the floor only keeps a misbehaving
                // one from storing inf or negative rates.
                let delta_ms = ts.saturating_sub(last).max(1);
                1000.0 / delta_ms as f64
            }
            None => 0.0,
        };

        self.timestamps.push_back(ts);
        self.instant_rates.push_back(rate);

        while self.timestamps.len() > CAPACITY {
            self.timestamps.pop_front();
            self.instant_rates.pop_front();
        }
        true
    }

    /// Max and mean of the stored rates, or `None` if nothing was recorded.
    pub fn summarize(&self) -> Option<Summary> {
        if self.instant_rates.is_empty() {
            return None;
        }
        let max_rate = self
            .instant_rates
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let avg_rate =
            self.instant_rates.iter().sum::<f64>() / self.instant_rates.len() as f64;
        Some(Summary { max_rate, avg_rate })
    }

    pub fn timestamps(&self) -> &VecDeque<Timestamp> {
        &self.timestamps
    }

    pub fn instant_rates(&self) -> &VecDeque<f64> {
        &self.instant_rates
    }

    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.timestamps.back().copied()
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

impl Default for RateWindow {
    fn default() -> Self {
        Self::new()
    }
}
