//! Raw platform events and their classification

use super::DeviceClass;

/// Milliseconds since the event source started. Only deltas are meaningful.
pub type Timestamp = u64;

/// Kind of a raw event as surfaced by an event source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEventKind {
    KeyDown,
    KeyUp,
    PointerMotion,
    PointerButtonDown,
    PointerButtonUp,
    Scroll,
    /// The surface was closed or the user asked to quit
    Quit,
    /// Window/system events and devices we do not measure
    Other,
}

impl RawEventKind {
    /// Device class this kind of event is measured under, if any
    pub fn device_class(self) -> Option<DeviceClass> {
        match self {
            Self::KeyDown | Self::KeyUp => Some(DeviceClass::Keyboard),
            Self::PointerMotion
            | Self::PointerButtonDown
            | Self::PointerButtonUp
            | Self::Scroll => Some(DeviceClass::Mouse),
            Self::Quit | Self::Other => None,
        }
    }

    pub fn is_shutdown(self) -> bool {
        self == Self::Quit
    }
}

/// A raw event with its source timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: RawEventKind,
    pub timestamp: Timestamp,
}

impl RawEvent {
    pub fn new(kind: RawEventKind, timestamp: Timestamp) -> Self {
        Self { kind, timestamp }
    }
}

/// Map a raw event to the device class and timestamp it is measured under.
pub fn classify(event: &RawEvent) -> Option<(DeviceClass, Timestamp)> {
    event
        .kind
        .device_class()
        .map(|class| (class, event.timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [RawEventKind; 8] = [
        RawEventKind::KeyDown,
        RawEventKind::KeyUp,
        RawEventKind::PointerMotion,
        RawEventKind::PointerButtonDown,
        RawEventKind::PointerButtonUp,
        RawEventKind::Scroll,
        RawEventKind::Quit,
        RawEventKind::Other,
    ];

    #[test]
    fn keyboard_kinds_map_to_keyboard() {
        for kind in [RawEventKind::KeyDown, RawEventKind::KeyUp] {
            assert_eq!(
                classify(&RawEvent::new(kind, 42)),
                Some((DeviceClass::Keyboard, 42))
            );
        }
    }

    #[test]
    fn pointer_kinds_map_to_mouse() {
        for kind in [
            RawEventKind::PointerMotion,
            RawEventKind::PointerButtonDown,
            RawEventKind::PointerButtonUp,
            RawEventKind::Scroll,
        ] {
            assert_eq!(
                classify(&RawEvent::new(kind, 7)),
                Some((DeviceClass::Mouse, 7))
            );
        }
    }

    #[test]
    fn unmeasured_kinds_are_filtered() {
        assert_eq!(classify(&RawEvent::new(RawEventKind::Quit, 1)), None);
        assert_eq!(classify(&RawEvent::new(RawEventKind::Other, 1)), None);
    }

    #[test]
    fn every_class_is_reachable() {
        for class in DeviceClass::all() {
            assert!(ALL_KINDS.iter().any(|k| k.device_class() == Some(*class)));
        }
    }

    #[test]
    fn only_quit_is_shutdown() {
        let shutdown: Vec<_> = ALL_KINDS.iter().filter(|k| k.is_shutdown()).collect();
        assert_eq!(shutdown, vec![&RawEventKind::Quit]);
    }
}
