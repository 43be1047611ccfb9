//! Device classes and raw event classification

mod class;
mod event;

pub use class::DeviceClass;
pub use event::{classify, RawEvent, RawEventKind, Timestamp};
