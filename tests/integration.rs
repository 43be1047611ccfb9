//! Integration tests for evhz
//!
//! These drive the full App pipeline with a scripted event source:
//! classification, per-class rate windows, periodic reports and shutdown.

use evhz::app::App;
use evhz::config::Config;
use evhz::device::{DeviceClass, RawEvent, RawEventKind, Timestamp};
use evhz::rate::{RateWindow, CAPACITY};
use evhz::reporter::REPORT_INTERVAL;
use evhz::shutdown::ShutdownFlag;
use evhz::source::EventSource;
use std::collections::VecDeque;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Replays one batch of events per poll, then stays silent
struct ScriptedSource {
    frames: VecDeque<Vec<RawEvent>>,
    polls: usize,
}

impl ScriptedSource {
    fn new(frames: Vec<Vec<RawEvent>>) -> Self {
        Self {
            frames: frames.into(),
            polls: 0,
        }
    }
}

impl EventSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn poll_events(&mut self, _timeout: Duration, out: &mut Vec<RawEvent>) -> usize {
        self.polls += 1;
        match self.frames.pop_front() {
            Some(batch) => {
                let n = batch.len();
                out.extend(batch);
                n
            }
            None => 0,
        }
    }
}

fn key_down(ts: Timestamp) -> RawEvent {
    RawEvent::new(RawEventKind::KeyDown, ts)
}

fn motion(ts: Timestamp) -> RawEvent {
    RawEvent::new(RawEventKind::PointerMotion, ts)
}

fn quit() -> RawEvent {
    RawEvent::new(RawEventKind::Quit, 0)
}

fn fast_config() -> Config {
    let mut config = Config::default();
    // Keep scripted runs from sleeping in any real source
    config.source.frame_rate_hz = 1000;
    config
}

fn new_app(config: &Config) -> (App<Vec<String>>, ShutdownFlag) {
    let shutdown = ShutdownFlag::new();
    (App::new(config, Vec::new(), shutdown.clone()), shutdown)
}

// ---------------------------------------------------------------------------
// Rate window properties
// ---------------------------------------------------------------------------

#[test]
fn repeated_timestamp_leaves_window_unchanged() {
    let mut window = RateWindow::new();
    window.record(100);
    window.record(110);
    let ts = window.timestamps().clone();
    let rates = window.instant_rates().clone();

    window.record(110);
    assert_eq!(window.timestamps(), &ts);
    assert_eq!(window.instant_rates(), &rates);
}

#[test]
fn hundred_events_keep_last_sixty_four() {
    let mut window = RateWindow::new();
    for ts in 1..=100u64 {
        window.record(ts * 3);
    }
    let stored: Vec<Timestamp> = window.timestamps().iter().copied().collect();
    let expected: Vec<Timestamp> = (37..=100u64).map(|ts| ts * 3).collect();
    assert_eq!(stored.len(), 64);
    assert_eq!(window.instant_rates().len(), 64);
    assert_eq!(stored, expected);
}

// ---------------------------------------------------------------------------
// Full pipeline
// ---------------------------------------------------------------------------

#[test]
fn keyboard_stream_end_to_end() {
    let (mut app, _) = new_app(&fast_config());
    let mut source = ScriptedSource::new(vec![
        vec![key_down(0), key_down(10)],
        vec![key_down(20), key_down(30)],
        vec![quit()],
    ]);

    app.run(&mut source);

    let summaries = app.tracker.summarize_all();
    assert_eq!(summaries.len(), 1);
    let (class, summary) = summaries[0];
    assert_eq!(class, DeviceClass::Keyboard);
    assert!((summary.max_rate - 100.0).abs() < 1e-9);
    assert!((summary.avg_rate - 75.0).abs() < 1e-9);
    assert_eq!(app.frames(), 3);
}

#[test]
fn coalesced_motion_events_are_deduplicated() {
    let (mut app, _) = new_app(&fast_config());
    // Motion reported as separate X and Y events sharing a timestamp
    let mut source = ScriptedSource::new(vec![
        vec![motion(0), motion(0), motion(4), motion(4), motion(8)],
        vec![quit()],
    ]);

    app.run(&mut source);

    let window = app.tracker.window(DeviceClass::Mouse).unwrap();
    let stored: Vec<Timestamp> = window.timestamps().iter().copied().collect();
    assert_eq!(stored, vec![0, 4, 8]);
    assert_eq!(app.totals().duplicates, 2);

    let summary = window.summarize().unwrap();
    assert!((summary.max_rate - 250.0).abs() < 1e-9);
}

#[test]
fn report_lines_every_interval() {
    let (mut app, _) = new_app(&fast_config());

    let interval = REPORT_INTERVAL as usize;
    let mut frames = vec![vec![key_down(0), motion(0)], vec![key_down(10), motion(2)]];
    frames.extend(std::iter::repeat_with(Vec::new).take(2 * interval - 2));
    frames.push(vec![quit()]);
    let mut source = ScriptedSource::new(frames);

    app.run(&mut source);

    // 401 frames -> reports after frames 200 and 400
    assert_eq!(app.frames(), 2 * REPORT_INTERVAL as u64 + 1);
    assert_eq!(app.reporter.reports_emitted(), 2);
    let expected = vec![
        "Type: Keyboard Max: 100.00Hz Avg: 50.00Hz".to_string(),
        "Type: Mouse Max: 500.00Hz Avg: 250.00Hz".to_string(),
    ];
    let lines = app.reporter.sink();
    assert_eq!(lines.len(), 4);
    assert_eq!(&lines[..2], &expected[..]);
    assert_eq!(&lines[2..], &expected[..]);
}

#[test]
fn no_report_before_any_event() {
    let (mut app, _) = new_app(&fast_config());
    let mut frames: Vec<Vec<RawEvent>> = std::iter::repeat_with(Vec::new)
        .take(REPORT_INTERVAL as usize)
        .collect();
    frames.push(vec![quit()]);
    let mut source = ScriptedSource::new(frames);

    app.run(&mut source);

    assert_eq!(app.reporter.reports_emitted(), 1);
    assert!(app.reporter.sink().is_empty());
}

#[test]
fn external_shutdown_stops_loop() {
    let (mut app, shutdown) = new_app(&fast_config());
    let mut source = ScriptedSource::new(vec![vec![key_down(1)]]);

    app.run_frame(&mut source);
    shutdown.trigger();
    app.run(&mut source);

    // run() checks the flag before polling again
    assert_eq!(source.polls, 1);
    assert_eq!(app.frames(), 1);
}

#[test]
fn events_after_quit_in_same_batch_are_still_recorded() {
    let (mut app, _) = new_app(&fast_config());
    let mut source = ScriptedSource::new(vec![vec![key_down(0), quit(), key_down(5)]]);

    app.run(&mut source);

    assert_eq!(app.frames(), 1);
    assert_eq!(app.tracker.window(DeviceClass::Keyboard).unwrap().len(), 2);
}

#[test]
fn session_report_reflects_run() {
    let (mut app, _) = new_app(&fast_config());
    let mut source = ScriptedSource::new(vec![
        vec![key_down(0), key_down(0), key_down(20)],
        vec![RawEvent::new(RawEventKind::Other, 21), quit()],
    ]);

    app.run(&mut source);
    let report = app.session_report(source.name());

    assert_eq!(report.metadata.source, "scripted");
    assert_eq!(report.totals.frames, 2);
    assert_eq!(report.totals.events_polled, 5);
    assert_eq!(report.totals.events_classified, 3);
    assert_eq!(report.totals.events_recorded, 2);
    assert_eq!(report.totals.duplicates, 1);
    assert_eq!(report.classes.len(), 1);
    assert_eq!(report.classes[0].class, DeviceClass::Keyboard);
    assert!((report.classes[0].max_rate_hz - 50.0).abs() < 1e-9);
    assert!((report.classes[0].avg_rate_hz - 25.0).abs() < 1e-9);
}

#[test]
fn config_file_cannot_resize_window() {
    let path = std::env::temp_dir().join(format!("evhz-it-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        "[rate]\nwindow_capacity = 3\n\n[report]\nprecision = 1\n",
    )
    .expect("write config");
    let config = Config::load_from(&path).expect("load config");
    let _ = std::fs::remove_file(&path);

    let (mut app, _) = new_app(&config);
    let mut source = ScriptedSource::new(vec![
        (1..=100).map(key_down).collect(),
        vec![quit()],
    ]);
    app.run(&mut source);

    let window = app.tracker.window(DeviceClass::Keyboard).unwrap();
    let stored: Vec<Timestamp> = window.timestamps().iter().copied().collect();
    assert_eq!(CAPACITY, 64);
    assert_eq!(stored, (37..=100).collect::<Vec<Timestamp>>());
    assert_eq!(app.reporter.precision(), 1);
}

#[test]
fn key_press_and_release_both_count() {
    let (mut app, _) = new_app(&fast_config());
    let mut source = ScriptedSource::new(vec![
        vec![key_down(0), RawEvent::new(RawEventKind::KeyUp, 8)],
        vec![quit()],
    ]);

    app.run(&mut source);

    let summary = app.tracker.window(DeviceClass::Keyboard).unwrap().summarize().unwrap();
    assert_eq!(app.tracker.window(DeviceClass::Keyboard).unwrap().len(), 2);
    assert!((summary.max_rate - 125.0).abs() < 1e-9);
}
