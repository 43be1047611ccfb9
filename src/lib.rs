//! evhz - Real-time input device event rate meter
//!
//! Measures how often keyboard and mouse events arrive, per device class,
//! over a trailing window of recent events, and reports the maximum and
//! average rate in Hz.

pub mod app;
pub mod config;
pub mod device;
pub mod rate;
pub mod report;
pub mod reporter;
pub mod shutdown;
pub mod source;

pub use config::Config;
