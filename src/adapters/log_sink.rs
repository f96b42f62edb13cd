//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade, which the host routes to stderr.  A network or
//! display adapter would implement the same trait.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::calibration::CalibrationOutcome;

/// Adapter that logs every [`AppEvent`] to the status channel.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | state={state}");
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {from} -> {to}");
            }
            AppEvent::Detected(d) => {
                info!(
                    "DETECT | score={} dir={:?} t={}ms | {}",
                    d.score, d.direction, d.timestamp, d.trace
                );
            }
            AppEvent::ErrorRaised(code) => {
                error!("ERROR | {code}");
            }
            AppEvent::RecoveryAttempted { code, success } => {
                info!(
                    "RECOVERY | {code} | {}",
                    if *success { "recovered" } else { "still failing" }
                );
            }
            AppEvent::CalibrationFinished(outcome) => match outcome {
                CalibrationOutcome::Succeeded { baseline } => {
                    info!("CALIBRATION | ok, ambient baseline {baseline:.2} C");
                }
                CalibrationOutcome::Cancelled => warn!("CALIBRATION | cancelled"),
                CalibrationOutcome::Failed { valid, attempted } => {
                    warn!("CALIBRATION | failed, {valid}/{attempted} valid samples");
                }
            },
            AppEvent::WatchdogStall { silent_ms } => {
                warn!("WATCHDOG | main loop silent for {silent_ms} ms");
            }
        }
    }
}
