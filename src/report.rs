//! End-of-session report and export functionality

use crate::device::DeviceClass;
use crate::rate::{RateTracker, Summary};
use crate::reporter::format_summary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Complete session report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// Event counters
    pub totals: SessionTotals,
    /// Final rate summary per device class
    pub classes: Vec<ClassSummary>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Report generation timestamp
    pub generated_at: String,
    /// Application version
    pub version: String,
    /// Session duration in seconds
    pub duration_secs: f64,
    /// Event source backend
    pub source: String,
}

/// Session counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTotals {
    /// Loop iterations run
    pub frames: u64,
    /// Raw events received from the source
    pub events_polled: u64,
    /// Events that mapped to a device class
    pub events_classified: u64,
    /// Classified events stored in a rate window
    pub events_recorded: u64,
    /// Classified events dropped for repeating a timestamp
    pub duplicates: u64,
}

/// Final statistics for one device class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSummary {
    pub class: DeviceClass,
    pub max_rate_hz: f64,
    pub avg_rate_hz: f64,
    /// Samples in the window when the report was taken
    pub samples: usize,
}

impl SessionReport {
    /// Build a report from the tracker's current state
    pub fn new(
        source: &str,
        duration_secs: f64,
        totals: SessionTotals,
        tracker: &RateTracker,
    ) -> Self {
        let now: DateTime<Utc> = Utc::now();

        let classes = tracker
            .summarize_all()
            .into_iter()
            .map(|(class, summary)| ClassSummary {
                class,
                max_rate_hz: summary.max_rate,
                avg_rate_hz: summary.avg_rate,
                samples: tracker.window(class).map_or(0, |w| w.len()),
            })
            .collect();

        Self {
            metadata: ReportMetadata {
                generated_at: now.to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                duration_secs,
                source: source.to_string(),
            },
            totals,
            classes,
        }
    }

    /// Human-readable summary lines
    pub fn to_lines(&self, precision: usize) -> Vec<String> {
        let mut lines = vec![
            format!(
                "Session: {:.1}s via {}",
                self.metadata.duration_secs, self.metadata.source
            ),
            format!(
                "Events: {} polled, {} measured, {} duplicates",
                self.totals.events_polled, self.totals.events_recorded, self.totals.duplicates
            ),
        ];
        lines.extend(self.classes.iter().map(|c| {
            let summary = Summary {
                max_rate: c.max_rate_hz,
                avg_rate: c.avg_rate_hz,
            };
            format_summary(c.class, &summary, precision)
        }));
        lines
    }

    /// Export report to JSON file
    pub fn export_json(&self, path: &Path) -> std::io::Result<()> {
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Export report to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
