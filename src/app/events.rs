//! Outbound application events.
//!
//! The [`DetectorService`](super::service::DetectorService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Each event
//! describes one occurrence and is emitted exactly once.

use serde::Serialize;

use crate::calibration::CalibrationOutcome;
use crate::error::ErrorCode;
use crate::fsm::SystemState;
use crate::fusion::{Direction, Evaluation, Trace};

/// A detection that opened an alert episode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionEvent {
    pub score: i32,
    pub trace: Trace,
    pub direction: Direction,
    pub timestamp: u64,
}

impl DetectionEvent {
    pub fn from_evaluation(eval: &Evaluation, timestamp: u64) -> Self {
        Self {
            score: eval.score,
            trace: eval.trace.clone(),
            direction: eval.direction,
            timestamp,
        }
    }
}

/// Structured events emitted by the controller core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service booted (carries the state after the self-test).
    Started(SystemState),

    /// The state machine moved.
    StateChanged { from: SystemState, to: SystemState },

    /// A new alert episode began.
    Detected(DetectionEvent),

    /// `ErrorState` was entered with this code.
    ErrorRaised(ErrorCode),

    /// A periodic recovery self-test ran.
    RecoveryAttempted { code: ErrorCode, success: bool },

    /// A calibration run reached a terminal outcome.
    CalibrationFinished(CalibrationOutcome),

    /// The heartbeat went quiet for longer than the watchdog timeout.
    WatchdogStall { silent_ms: u64 },
}
