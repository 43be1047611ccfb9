//! Periodic emission of rate summaries to a text sink

use crate::device::DeviceClass;
use crate::rate::{RateTracker, Summary};
use std::io::{self, Write};

/// Number of frames between two reports
pub const REPORT_INTERVAL: u32 = 200;

/// Decimal places used for rates unless configured otherwise
pub const DEFAULT_PRECISION: usize = 2;

/// Destination for formatted report lines
pub trait ReportSink {
    fn emit(&mut self, line: &str);
}

/// Collects lines in memory
impl ReportSink for Vec<String> {
    fn emit(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

/// Writes each line to an [`io::Write`] target
pub struct WriterSink<W: Write> {
    writer: W,
    /// Terminal raw mode does not translate `\n` into a carriage return
    raw_mode: bool,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            raw_mode: false,
        }
    }

    pub fn raw_mode(mut self, raw_mode: bool) -> Self {
        self.raw_mode = raw_mode;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let ending = if self.raw_mode { "\r\n" } else { "\n" };
        write!(self.writer, "{}{}", line, ending)?;
        self.writer.flush()
    }
}

impl WriterSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ReportSink for WriterSink<W> {
    fn emit(&mut self, line: &str) {
        if let Err(e) = self.write_line(line) {
            log::warn!("Failed to write report line: {}", e);
        }
    }
}

/// Format one report line for a device class
pub fn format_summary(class: DeviceClass, summary: &Summary, precision: usize) -> String {
    format!(
        "Type: {} Max: {:.prec$}Hz Avg: {:.prec$}Hz",
        class.name(),
        summary.max_rate,
        summary.avg_rate,
        prec = precision
    )
}

/// Emits tracker summaries every [`REPORT_INTERVAL`] frames
pub struct Reporter<S: ReportSink> {
    sink: S,
    precision: usize,
    ticks: u32,
    reports_emitted: u64,
}

impl<S: ReportSink> Reporter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            precision: DEFAULT_PRECISION,
            ticks: 0,
            reports_emitted: 0,
        }
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Count one frame and report if the interval was reached.
    ///
    /// Returns `true` on frames that produced a report.
    pub fn tick(&mut self, tracker: &RateTracker) -> bool {
        self.ticks += 1;
        if self.ticks < REPORT_INTERVAL {
            return false;
        }
        self.ticks = 0;
        self.report(tracker);
        true
    }

    /// Emit one line per tracked class regardless of the cadence
    pub fn report(&mut self, tracker: &RateTracker) {
        for (class, summary) in tracker.summarize_all() {
            let line = format_summary(class, &summary, self.precision);
            self.sink.emit(&line);
        }
        self.reports_emitted += 1;
    }

    pub fn reports_emitted(&self) -> u64 {
        self.reports_emitted
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
