//! Terminal event source built on crossterm
//!
//! Puts the terminal into raw mode with mouse capture so key presses, clicks,
//! motion and scrolling arrive as events. Where the terminal speaks the kitty
//! keyboard protocol, key releases are requested too. The terminal is
//! restored on drop.

use super::{EventSource, SourceError};
use crate::device::{RawEvent, RawEventKind, Timestamp};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement},
};
use std::io::stdout;
use std::time::{Duration, Instant};

/// Raw-mode terminal input
pub struct TerminalSource {
    epoch: Instant,
    /// Enhancement flags were pushed and must be popped on drop
    keyboard_enhanced: bool,
}

/// Flags requested from terminals with the kitty keyboard protocol.
///
/// Without `REPORT_EVENT_TYPES` terminals only send presses, so key
/// releases would never be counted.
pub(crate) fn keyboard_enhancement_flags() -> KeyboardEnhancementFlags {
    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
}

fn push_keyboard_enhancement() -> bool {
    match supports_keyboard_enhancement() {
        Ok(true) => {
            let flags = PushKeyboardEnhancementFlags(keyboard_enhancement_flags());
            match execute!(stdout(), flags) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Failed to enable key release reporting: {}", e);
                    false
                }
            }
        }
        Ok(false) => {
            log::debug!("Terminal lacks keyboard enhancement, key releases will not be reported");
            false
        }
        Err(e) => {
            log::debug!("Keyboard enhancement query failed: {}", e);
            false
        }
    }
}

impl TerminalSource {
    pub fn new() -> Result<Self, SourceError> {
        enable_raw_mode().map_err(SourceError::Terminal)?;
        if let Err(e) = execute!(stdout(), EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(SourceError::Terminal(e));
        }
        let keyboard_enhanced = push_keyboard_enhancement();
        Ok(Self {
            epoch: Instant::now(),
            keyboard_enhanced,
        })
    }

    fn now_ms(&self) -> Timestamp {
        self.epoch.elapsed().as_millis() as Timestamp
    }
}

impl EventSource for TerminalSource {
    fn name(&self) -> &'static str {
        "terminal"
    }

    fn poll_events(&mut self, timeout: Duration, out: &mut Vec<RawEvent>) -> usize {
        let deadline = Instant::now() + timeout;
        let mut count = 0;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match event::poll(remaining) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    log::warn!("Terminal poll failed: {}", e);
                    break;
                }
            }
            match event::read() {
                Ok(ev) => {
                    // Stamp on read; crossterm events carry no time of their own
                    out.push(RawEvent::new(map_event(&ev), self.now_ms()));
                    count += 1;
                }
                Err(e) => {
                    log::warn!("Terminal read failed: {}", e);
                    break;
                }
            }
            if remaining.is_zero() {
                break;
            }
        }

        count
    }

    fn raw_terminal(&self) -> bool {
        true
    }
}

impl Drop for TerminalSource {
    fn drop(&mut self) {
        if self.keyboard_enhanced {
            let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
        }
        let _ = execute!(stdout(), DisableMouseCapture);
        let _ = disable_raw_mode();
    }
}

/// Map a crossterm event to a raw event kind
pub(crate) fn map_event(event: &Event) -> RawEventKind {
    match event {
        Event::Key(key) => map_key(key),
        Event::Mouse(mouse) => map_mouse(mouse),
        _ => RawEventKind::Other,
    }
}

fn map_key(key: &KeyEvent) -> RawEventKind {
    // Raw mode swallows SIGINT, so Ctrl-C has to be handled here
    let quit = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    };
    match key.kind {
        KeyEventKind::Press if quit => RawEventKind::Quit,
        KeyEventKind::Press | KeyEventKind::Repeat => RawEventKind::KeyDown,
        KeyEventKind::Release => RawEventKind::KeyUp,
    }
}

fn map_mouse(mouse: &MouseEvent) -> RawEventKind {
    match mouse.kind {
        MouseEventKind::Down(_) => RawEventKind::PointerButtonDown,
        MouseEventKind::Up(_) => RawEventKind::PointerButtonUp,
        MouseEventKind::Drag(_) | MouseEventKind::Moved => RawEventKind::PointerMotion,
        MouseEventKind::ScrollDown
        | MouseEventKind::ScrollUp
        | MouseEventKind::ScrollLeft
        | MouseEventKind::ScrollRight => RawEventKind::Scroll,
    }
}
