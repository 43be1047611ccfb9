//! Device class tags used as the aggregation key for rate statistics

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of input device an event originated from
///
/// Declaration order is the reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeviceClass {
    Keyboard,
    Mouse,
    // TODO: Joystick and Controller once a source can surface their events
}

impl DeviceClass {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Keyboard => "Keyboard",
            Self::Mouse => "Mouse",
        }
    }

    pub fn all() -> &'static [DeviceClass] {
        &[Self::Keyboard, Self::Mouse]
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
