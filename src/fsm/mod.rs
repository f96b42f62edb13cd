//! Presence controller state machine.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  StateMachine                                             │
//! │  ┌─────────────┬──────────────────────────────────────┐   │
//! │  │ transition  │ (state, FsmEvent) -> state  (pure)   │   │
//! │  │ on_exit     │ clears alert start on leaving Alert  │   │
//! │  │ on_enter    │ timestamps, counters, error code     │   │
//! │  └─────────────┴──────────────────────────────────────┘   │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers feed [`FsmEvent`]s into [`StateMachine::apply`].  When the table
//! in [`states::transition`] yields a different state, the engine runs the
//! exit action for the old state, then the enter action for the new one,
//! with the shared [`Context`] threaded through.  An event that leaves the
//! state unchanged runs no actions at all, so a repeated trigger while in
//! `Alert` never restarts the alert timer.

pub mod context;
pub mod states;

use core::fmt;

use context::Context;
use log::info;
use serde::Serialize;

use crate::error::ErrorCode;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Top-level controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SystemState {
    #[default]
    Standby,
    Calibrating,
    Monitoring,
    Alert,
    ErrorState,
}

impl SystemState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Standby => "STANDBY",
            Self::Calibrating => "CALIBRATING",
            Self::Monitoring => "MONITORING",
            Self::Alert => "ALERT",
            Self::ErrorState => "ERROR",
        }
    }

    /// States in which sensors are sampled and fused.
    pub fn is_sampling(self) -> bool {
        matches!(self, Self::Monitoring | Self::Alert)
    }
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Inputs to the transition table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FsmEvent {
    SelfTestPassed,
    SelfTestFailed,
    CalibrationSucceeded,
    /// Failed or cancelled.
    CalibrationFailed,
    /// Fused score reached the detection threshold.
    Triggered,
    AlertExpired,
    SensorFault(ErrorCode),
    /// Recovery self-test passed.  `calibrated` is whether a calibration
    /// has ever succeeded.
    RecoverySucceeded { calibrated: bool },
    RecoveryFailed,
}

impl FsmEvent {
    /// Error code recorded when this event lands in `ErrorState`.
    fn error_code(self) -> ErrorCode {
        match self {
            Self::SelfTestFailed => ErrorCode::SensorInit,
            Self::CalibrationFailed => ErrorCode::Calibration,
            Self::SensorFault(code) => code,
            _ => ErrorCode::None,
        }
    }
}

/// A completed state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: SystemState,
    pub to: SystemState,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    state: SystemState,
    /// Code of the most recent error.  Cleared when recovery succeeds.
    last_error: ErrorCode,
    /// Set on `Alert` entry, cleared on exit.
    alert_started_at: Option<u64>,
    /// Whether any calibration has succeeded since boot.
    calibrated: bool,
    entered_at: u64,
}

impl StateMachine {
    /// A fresh machine in `Standby`.
    pub fn new(now_ms: u64) -> Self {
        Self {
            entered_at: now_ms,
            ..Self::default()
        }
    }

    /// Feed one event.  Returns the transition if the state changed.
    pub fn apply(&mut self, event: FsmEvent, now_ms: u64, ctx: &mut Context) -> Option<Transition> {
        let from = self.state;
        let to = states::transition(from, event);
        if to == from {
            return None;
        }

        info!("FSM transition: {from} -> {to}");

        self.on_exit(from);
        self.state = to;
        self.entered_at = now_ms;
        self.on_enter(from, event, now_ms, ctx);

        Some(Transition { from, to })
    }

    /// Whether the current alert episode has run its course.
    pub fn alert_expired(&self, now_ms: u64, alert_duration_ms: u32) -> bool {
        match (self.state, self.alert_started_at) {
            (SystemState::Alert, Some(start)) => {
                now_ms.saturating_sub(start) >= u64::from(alert_duration_ms)
            }
            _ => false,
        }
    }

    pub fn state(&self) -> SystemState {
        self.state
    }

    pub fn last_error(&self) -> ErrorCode {
        self.last_error
    }

    pub fn alert_started_at(&self) -> Option<u64> {
        self.alert_started_at
    }

    pub fn calibrated(&self) -> bool {
        self.calibrated
    }

    /// Milliseconds spent in the current state.
    pub fn time_in_state(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.entered_at)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn on_exit(&mut self, from: SystemState) {
        if from == SystemState::Alert {
            self.alert_started_at = None;
        }
    }

    fn on_enter(&mut self, from: SystemState, event: FsmEvent, now_ms: u64, ctx: &mut Context) {
        match self.state {
            SystemState::Alert => {
                self.alert_started_at = Some(now_ms);
                ctx.stats.record_detection(now_ms);
            }
            SystemState::ErrorState => {
                self.last_error = event.error_code();
                ctx.stats.record_error(now_ms);
                ctx.previous_distance = None;
            }
            SystemState::Monitoring => match from {
                SystemState::Calibrating => self.calibrated = true,
                SystemState::ErrorState => {
                    self.last_error = ErrorCode::None;
                    ctx.previous_distance = None;
                }
                _ => {}
            },
            SystemState::Calibrating => {
                if from == SystemState::ErrorState {
                    self.last_error = ErrorCode::None;
                }
            }
            SystemState::Standby => {}
        }
    }
}
