//! Main loop state: routes polled events into the tracker and drives reports

use crate::config::Config;
use crate::device::{classify, RawEvent};
use crate::rate::RateTracker;
use crate::report::{SessionReport, SessionTotals};
use crate::reporter::{ReportSink, Reporter};
use crate::shutdown::ShutdownFlag;
use crate::source::EventSource;
use std::time::{Duration, Instant};

/// Main application
pub struct App<S: ReportSink> {
    /// Per-class rate windows
    pub tracker: RateTracker,
    /// Periodic report emitter
    pub reporter: Reporter<S>,
    shutdown: ShutdownFlag,
    frame_interval: Duration,
    start_time: Instant,
    frames: u64,
    events_polled: u64,
    events_classified: u64,
    /// Reused between frames
    buffer: Vec<RawEvent>,
}

impl<S: ReportSink> App<S> {
    pub fn new(config: &Config, sink: S, shutdown: ShutdownFlag) -> Self {
        Self {
            tracker: RateTracker::new(),
            reporter: Reporter::new(sink).with_precision(config.report.precision),
            shutdown,
            frame_interval: config.frame_interval(),
            start_time: Instant::now(),
            frames: 0,
            events_polled: 0,
            events_classified: 0,
            buffer: Vec::with_capacity(64),
        }
    }

    /// Handle one raw event from the source
    pub fn process_event(&mut self, event: &RawEvent) {
        self.events_polled += 1;

        if event.kind.is_shutdown() {
            self.shutdown.trigger();
            return;
        }

        if let Some((class, ts)) = classify(event) {
            self.events_classified += 1;
            self.tracker.record_event(class, ts);
        }
    }

    /// Run one loop iteration: poll, record, then report if due.
    pub fn run_frame(&mut self, source: &mut dyn EventSource) {
        let mut events = std::mem::take(&mut self.buffer);
        events.clear();
        source.poll_events(self.frame_interval, &mut events);
        for event in &events {
            self.process_event(event);
        }
        self.buffer = events;

        self.frames += 1;
        self.reporter.tick(&self.tracker);
    }

    /// Loop until shutdown is requested
    pub fn run(&mut self, source: &mut dyn EventSource) {
        while !self.shutdown.is_triggered() {
            self.run_frame(source);
        }
        log::debug!("Shutdown after {} frames", self.frames);
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_quitting(&self) -> bool {
        self.shutdown.is_triggered()
    }

    pub fn totals(&self) -> SessionTotals {
        SessionTotals {
            frames: self.frames,
            events_polled: self.events_polled,
            events_classified: self.events_classified,
            events_recorded: self.tracker.events_recorded(),
            duplicates: self.tracker.duplicates(),
        }
    }

    /// Snapshot of the session so far
    pub fn session_report(&self, source_name: &str) -> SessionReport {
        SessionReport::new(
            source_name,
            self.start_time.elapsed().as_secs_f64(),
            self.totals(),
            &self.tracker,
        )
    }
}
