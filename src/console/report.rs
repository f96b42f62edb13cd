//! Console report rendering.
//!
//! Every report is a plain struct that renders two ways: `Display` for the
//! human-readable text form and `Serialize` for the JSON form selected by
//! the `json` toggle.  [`render`] picks one.

use core::fmt;

use serde::Serialize;

use crate::config::{DetectorConfig, VERSION};
use crate::error::ErrorCode;
use crate::fsm::SystemState;
use crate::fusion::Trace;
use crate::sensors::RawReading;
use crate::stats::StatsSnapshot;

/// Text or JSON, per the output mode.
pub fn render<R: Serialize + fmt::Display>(report: &R, json: bool) -> String {
    if !json {
        return report.to_string();
    }
    serde_json::to_string(report).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Reply to `status`.  Times are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub version: &'static str,
    pub uptime: u64,
    pub state: &'static str,
    pub total_detections: u32,
    pub error_count: u32,
    pub last_error: ErrorCode,
    pub avg_distance: f32,
    pub avg_object_temp: f32,
    pub timestamp: u64,
}

impl StatusReport {
    pub fn new(state: SystemState, last_error: ErrorCode, stats: &StatsSnapshot, now_ms: u64) -> Self {
        Self {
            version: VERSION,
            uptime: stats.uptime_ms,
            state: state.name(),
            total_detections: stats.total_detections,
            error_count: stats.error_count,
            last_error,
            avg_distance: stats.average_distance,
            avg_object_temp: stats.average_object_temp,
            timestamp: now_ms,
        }
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "version: {}", self.version)?;
        writeln!(f, "state: {}", self.state)?;
        writeln!(f, "uptime: {} s", self.uptime / 1000)?;
        writeln!(f, "detections: {}", self.total_detections)?;
        writeln!(f, "errors: {}", self.error_count)?;
        writeln!(f, "last error: {}", self.last_error)?;
        writeln!(f, "avg distance: {:.1} cm", self.avg_distance)?;
        write!(f, "avg object temp: {:.2} C", self.avg_object_temp)
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Reply to `config`.
///
/// Thresholds print with `{}` so the shown value parses back to the exact
/// same float through `set`.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigReport<'a>(pub &'a DetectorConfig);

pub(crate) fn on_off(b: bool) -> &'static str {
    if b { "on" } else { "off" }
}

impl fmt::Display for ConfigReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.0;
        writeln!(f, "temp_threshold: {}", c.temp_threshold)?;
        writeln!(f, "distance_threshold: {}", c.distance_threshold)?;
        writeln!(f, "detection_threshold: {}", c.detection_threshold)?;
        writeln!(f, "sampling_interval_ms: {}", c.sampling_interval_ms)?;
        writeln!(f, "alert_duration_ms: {}", c.alert_duration_ms)?;
        writeln!(f, "sound: {}", on_off(c.sound_enabled))?;
        writeln!(f, "leds: {}", on_off(c.leds_enabled))?;
        writeln!(f, "json: {}", on_off(c.json_output))?;
        write!(f, "debug: {}", on_off(c.debug))?;
        for w in c.warnings() {
            write!(f, "\nwarning: {w}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Diagnostic sample
// ---------------------------------------------------------------------------

/// Reply to an empty line: one raw sample and what the pipeline made of it.
/// Fusion fields are absent when the reading failed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticReport {
    pub state: &'static str,
    pub reading: RawReading,
    pub error: ErrorCode,
    pub score: Option<i32>,
    pub trace: Option<Trace>,
    pub triggered: Option<bool>,
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.reading;
        writeln!(f, "state: {}", self.state)?;
        writeln!(
            f,
            "pir: {}/{}  object: {:.2} C  ambient: {:.2} C  distance: {:.1} cm",
            on_off(r.motion_a),
            on_off(r.motion_b),
            r.object_temp,
            r.ambient_temp,
            r.distance
        )?;
        match (self.score, &self.trace, self.triggered) {
            (Some(score), Some(trace), Some(triggered)) => {
                write!(f, "score: {score} [{trace}] triggered: {}", if triggered { "yes" } else { "no" })
            }
            _ => write!(f, "invalid sample: {}", self.error),
        }
    }
}
