//! Rolling event-rate estimation per device class

mod tracker;
mod window;

pub use tracker::RateTracker;
pub use window::{RateWindow, Summary, CAPACITY};
