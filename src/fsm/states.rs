//! The transition table.
//!
//! A single pure function `(state, event) -> state`.  Timing, I/O and
//! bookkeeping live in [`StateMachine`](super::StateMachine); this file
//! only answers "where does this event lead".
//!
//! ```text
//!  STANDBY ──[self-test ok]──▶ CALIBRATING ──[baseline ok]──▶ MONITORING ◀─┐
//!     │                            │                          │    ▲       │
//!  [self-test fail]        [fail / cancel]              [triggered] [expired]
//!     ▼                            ▼                          ▼    │       │
//!  ERROR ◀────────────────────── ERROR          MONITORING/ALERT ──┘       │
//!                                                   │ [sensor fault]       │
//!                                                   ▼                      │
//!  ERROR ──[recovery ok, calibrated]───────────────────────────────────────┘
//!  ERROR ──[recovery ok, never calibrated]──▶ CALIBRATING
//! ```

use super::{FsmEvent, SystemState};

/// Next state for `event` in `state`.  Events that do not apply leave the
/// state unchanged.
pub fn transition(state: SystemState, event: FsmEvent) -> SystemState {
    use FsmEvent as E;
    use SystemState as S;

    match (state, event) {
        (S::Standby, E::SelfTestPassed) => S::Calibrating,
        (S::Standby, E::SelfTestFailed) => S::ErrorState,

        (S::Calibrating, E::CalibrationSucceeded) => S::Monitoring,
        (S::Calibrating, E::CalibrationFailed) => S::ErrorState,

        (S::Monitoring, E::Triggered) => S::Alert,
        (S::Alert, E::AlertExpired) => S::Monitoring,

        (S::Monitoring | S::Alert, E::SensorFault(_)) => S::ErrorState,

        (S::ErrorState, E::RecoverySucceeded { calibrated: true }) => S::Monitoring,
        (S::ErrorState, E::RecoverySucceeded { calibrated: false }) => S::Calibrating,

        (s, _) => s,
    }
}
