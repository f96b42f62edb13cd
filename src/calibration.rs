//! Calibration controller.
//!
//! Two phases inside one bounded window (default 30 s):
//!
//! 1. **Baseline** — `samples` ambient readings, one per
//!    `sample_interval_ms`.  NaN readings are discarded; fewer than half
//!    valid fails the run.  The baseline is the mean of the valid ones.
//! 2. **Settling** — hold until the window closes so the PIR elements can
//!    stabilise, polling the cancel token every `poll_interval_ms`.
//!
//! ```text
//!  NotStarted ──start──▶ Running ──▶ Succeeded | Cancelled | Failed
//! ```
//!
//! [`CalibrationController::step`] advances by at most one reading per call
//! so the service can drive it from the cooperative tick.  [`run`] wraps
//! the same step function in a blocking loop for start-up use.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use embedded_hal::delay::DelayNs;
use log::{info, warn};
use serde::Serialize;

use crate::app::ports::{Clock, SensorPort};
use crate::config::CalibrationConfig;
use crate::sensors::validator::thermal_valid;

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Shared cancel flag.  Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Re-arm for the next run.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Terminal outcome of a calibration run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CalibrationOutcome {
    Succeeded { baseline: f32 },
    Cancelled,
    Failed { valid: u16, attempted: u16 },
}

/// Summary handed to the rest of the system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationResult {
    pub ambient_temp_baseline: f32,
    pub success: bool,
}

impl From<CalibrationOutcome> for CalibrationResult {
    fn from(outcome: CalibrationOutcome) -> Self {
        match outcome {
            CalibrationOutcome::Succeeded { baseline } => Self {
                ambient_temp_baseline: baseline,
                success: true,
            },
            _ => Self {
                ambient_temp_baseline: f32::NAN,
                success: false,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationPhase {
    NotStarted,
    Running {
        started_at: u64,
        next_at: u64,
        samples_taken: u16,
        valid: u16,
        sum: f32,
        baseline: Option<f32>,
    },
    Finished(CalibrationOutcome),
}

pub struct CalibrationController {
    config: CalibrationConfig,
    cancel: CancelToken,
    phase: CalibrationPhase,
}

impl CalibrationController {
    pub fn new(config: CalibrationConfig, cancel: CancelToken) -> Self {
        Self {
            config,
            cancel,
            phase: CalibrationPhase::NotStarted,
        }
    }

    /// Begin (or restart) a run at `now_ms`.
    pub fn start(&mut self, now_ms: u64) {
        info!(
            "CALIBRATION: {} ambient samples, {} ms settling window",
            self.config.samples, self.config.duration_ms
        );
        self.phase = CalibrationPhase::Running {
            started_at: now_ms,
            next_at: now_ms,
            samples_taken: 0,
            valid: 0,
            sum: 0.0,
            baseline: None,
        };
    }

    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, CalibrationPhase::Running { .. })
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Advance the run.  Returns the outcome on the call that finishes it,
    /// `None` while still running or when not started.
    pub fn step(&mut self, now_ms: u64, port: &mut impl SensorPort) -> Option<CalibrationOutcome> {
        let CalibrationPhase::Running {
            started_at,
            next_at,
            samples_taken,
            valid,
            sum,
            baseline,
        } = &mut self.phase
        else {
            return None;
        };

        let outcome = if self.cancel.is_cancelled() {
            warn!("CALIBRATION: cancelled after {} ms", now_ms.saturating_sub(*started_at));
            Some(CalibrationOutcome::Cancelled)
        } else if let Some(b) = *baseline {
            if now_ms.saturating_sub(*started_at) >= u64::from(self.config.duration_ms) {
                Some(CalibrationOutcome::Succeeded { baseline: b })
            } else {
                None
            }
        } else if now_ms < *next_at {
            None
        } else {
            let reading = port.read_ambient_temp();
            *samples_taken += 1;
            if reading.is_nan() {
                warn!("CALIBRATION: ambient sample {} is NaN, discarded", samples_taken);
            } else {
                *valid += 1;
                *sum += reading;
            }
            *next_at = now_ms + u64::from(self.config.sample_interval_ms);

            if *samples_taken < self.config.samples {
                None
            } else if u32::from(*valid) * 2 < u32::from(self.config.samples) {
                Some(CalibrationOutcome::Failed {
                    valid: *valid,
                    attempted: *samples_taken,
                })
            } else {
                let mean = *sum / f32::from(*valid);
                if thermal_valid(mean) {
                    info!("CALIBRATION: ambient baseline {:.2} °C ({} valid samples)", mean, valid);
                    *baseline = Some(mean);
                    None
                } else {
                    warn!("CALIBRATION: baseline {:.2} °C outside sensor range", mean);
                    Some(CalibrationOutcome::Failed {
                        valid: *valid,
                        attempted: *samples_taken,
                    })
                }
            }
        };

        if let Some(o) = outcome {
            self.phase = CalibrationPhase::Finished(o);
        }
        outcome
    }

    /// Milliseconds the blocking runner should sleep before the next step.
    fn sub_interval_ms(&self) -> u32 {
        match self.phase {
            CalibrationPhase::Running { baseline: None, .. } => self.config.sample_interval_ms,
            _ => self.config.poll_interval_ms,
        }
        .max(1)
    }
}

/// Run a full calibration, blocking the caller.
///
/// The only blocking phase in the system; bounded by `config.duration_ms`
/// and interruptible through `cancel` at every sub-interval.
pub fn run(
    config: CalibrationConfig,
    cancel: CancelToken,
    port: &mut impl SensorPort,
    clock: &impl Clock,
    delay: &mut impl DelayNs,
) -> CalibrationResult {
    let mut controller = CalibrationController::new(config, cancel);
    controller.start(clock.now_ms());
    loop {
        if let Some(outcome) = controller.step(clock.now_ms(), port) {
            return outcome.into();
        }
        delay.delay_ms(controller.sub_interval_ms());
    }
}
