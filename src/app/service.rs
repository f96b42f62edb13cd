//! Application service — the hexagonal core.
//!
//! [`DetectorService`] owns the state machine, the calibration controller,
//! the heartbeat watchdog and the shared [`Context`].  All I/O flows through
//! port traits passed in at each call, so the whole service runs against
//! mock adapters in tests.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │       DetectorService        │
//!     Command ──▶ │  FSM · Calibration · Fusion  │ ──▶ FeedbackSink
//!                 └──────────────────────────────┘
//! ```
//!
//! The host calls [`DetectorService::poll`] from its cooperative loop as
//! often as it likes; sampling is gated internally by
//! `sampling_interval_ms`, recovery by `recovery_interval_ms`.  Commands
//! are applied between polls, so a `set` is visible to the very next
//! sampling tick.

use log::{debug, error, info, warn};

use crate::calibration::{CalibrationController, CalibrationOutcome, CancelToken};
use crate::config::DetectorConfig;
use crate::console::report::{ConfigReport, DiagnosticReport, StatusReport, on_off, render};
use crate::drivers::watchdog::Heartbeat;
use crate::error::ErrorCode;
use crate::fsm::context::Context;
use crate::fsm::{FsmEvent, StateMachine, SystemState};
use crate::fusion;
use crate::sensors::{self, validator};
use crate::stats::StatsSnapshot;

use super::commands::{Command, HELP, Setting};
use super::events::{AppEvent, DetectionEvent};
use super::ports::{EventSink, FeedbackFrame, FeedbackSink, SensorPort};

/// Outcome of a console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Text to write back to the console.
    Message(String),
    /// The operator asked for a restart.  The host tears the service down
    /// and boots a fresh one.
    Restart,
}

// ───────────────────────────────────────────────────────────────
// DetectorService
// ───────────────────────────────────────────────────────────────

pub struct DetectorService {
    fsm: StateMachine,
    ctx: Context,
    calibration: CalibrationController,
    watchdog: Heartbeat,
    /// Earliest time the next sampling tick may run.
    next_sample_at: u64,
    /// Time of the last recovery attempt (or of entering `ErrorState`).
    last_recovery_at: u64,
}

impl DetectorService {
    /// Construct the service in `Standby`.  Call [`boot`](Self::boot) next.
    pub fn new(config: DetectorConfig, now_ms: u64) -> Self {
        for w in config.warnings() {
            warn!("config: {w}");
        }
        let calibration = CalibrationController::new(config.calibration.clone(), CancelToken::new());
        let watchdog = Heartbeat::new(config.watchdog_timeout_ms, now_ms);
        Self {
            fsm: StateMachine::new(now_ms),
            ctx: Context::new(config, now_ms),
            calibration,
            watchdog,
            next_sample_at: now_ms,
            last_recovery_at: now_ms,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Run the start-up self-test and move to `Calibrating` or `ErrorState`.
    pub fn boot(
        &mut self,
        now_ms: u64,
        hw: &mut impl SensorPort,
        events: &mut impl EventSink,
        feedback: &mut impl FeedbackSink,
    ) {
        info!("Presence controller v{} booting", crate::config::VERSION);
        let event = if hw.self_test() {
            FsmEvent::SelfTestPassed
        } else {
            error!("Sensor self-test failed at boot");
            FsmEvent::SelfTestFailed
        };
        self.apply(event, now_ms, events);
        events.emit(&AppEvent::Started(self.fsm.state()));
        self.notify(feedback, None);
        self.watchdog.feed(now_ms);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One pass of the cooperative loop.
    pub fn poll(
        &mut self,
        now_ms: u64,
        hw: &mut impl SensorPort,
        events: &mut impl EventSink,
        feedback: &mut impl FeedbackSink,
    ) {
        if let Some(silent_ms) = self.watchdog.check(now_ms) {
            events.emit(&AppEvent::WatchdogStall { silent_ms });
        }
        self.ctx.stats.touch(now_ms);

        let before = self.fsm.state();
        let mut sampled = false;
        let mut detection = None;

        match before {
            SystemState::Standby => {}
            SystemState::Calibrating => self.calibration_tick(now_ms, hw, events),
            SystemState::Monitoring | SystemState::Alert => {
                if now_ms >= self.next_sample_at {
                    self.next_sample_at = now_ms + u64::from(self.ctx.config.sampling_interval_ms);
                    detection = self.sampling_tick(now_ms, hw, events);
                    sampled = true;
                }
            }
            SystemState::ErrorState => self.recovery_tick(now_ms, hw, events),
        }

        if sampled || self.fsm.state() != before {
            self.notify(feedback, detection);
        }
        self.watchdog.feed(now_ms);
    }

    fn calibration_tick(&mut self, now_ms: u64, hw: &mut impl SensorPort, events: &mut impl EventSink) {
        let Some(outcome) = self.calibration.step(now_ms, hw) else {
            return;
        };
        events.emit(&AppEvent::CalibrationFinished(outcome));
        let event = match outcome {
            CalibrationOutcome::Succeeded { baseline } => {
                self.ctx.baseline = Some(baseline);
                FsmEvent::CalibrationSucceeded
            }
            CalibrationOutcome::Cancelled | CalibrationOutcome::Failed { .. } => {
                FsmEvent::CalibrationFailed
            }
        };
        self.apply(event, now_ms, events);
    }

    /// Acquire → validate → record → fuse → act.  Returns the detection if
    /// this tick opened an alert episode.
    fn sampling_tick(
        &mut self,
        now_ms: u64,
        hw: &mut impl SensorPort,
        events: &mut impl EventSink,
    ) -> Option<DetectionEvent> {
        let raw = sensors::acquire(hw, now_ms);
        let sample = match validator::validate(&raw) {
            Ok(sample) => sample,
            Err(code) => {
                warn!(
                    "Invalid thermal reading (object={} ambient={})",
                    raw.object_temp, raw.ambient_temp
                );
                self.apply(FsmEvent::SensorFault(code), now_ms, events);
                return None;
            }
        };

        self.ctx.stats.record(&sample);
        let eval = fusion::evaluate(&sample, self.ctx.previous_distance, &self.ctx.config);
        self.ctx.previous_distance = sample.distance();

        if self.ctx.config.debug {
            debug!(
                "tick t={} pir={}/{} obj={:.2} amb={:.2} dist={:.1} score={} [{}]",
                now_ms,
                u8::from(sample.motion_a),
                u8::from(sample.motion_b),
                sample.object_temp,
                sample.ambient_temp,
                sample.distance,
                eval.score,
                eval.trace
            );
        }

        let mut detection = None;
        if eval.triggered && self.fsm.state() == SystemState::Monitoring {
            let event = DetectionEvent::from_evaluation(&eval, now_ms);
            info!("DETECTION score={} {}", event.score, event.trace);
            self.apply(FsmEvent::Triggered, now_ms, events);
            events.emit(&AppEvent::Detected(event.clone()));
            detection = Some(event);
        }

        if self.fsm.alert_expired(now_ms, self.ctx.config.alert_duration_ms) {
            self.apply(FsmEvent::AlertExpired, now_ms, events);
        }
        detection
    }

    fn recovery_tick(&mut self, now_ms: u64, hw: &mut impl SensorPort, events: &mut impl EventSink) {
        let interval = u64::from(self.ctx.config.recovery_interval_ms);
        if now_ms.saturating_sub(self.last_recovery_at) < interval {
            return;
        }
        self.last_recovery_at = now_ms;

        let code = self.fsm.last_error();
        let success = hw.self_test();
        info!("Recovery attempt for '{code}': {}", if success { "ok" } else { "failed" });
        events.emit(&AppEvent::RecoveryAttempted { code, success });

        let event = if success {
            FsmEvent::RecoverySucceeded {
                calibrated: self.fsm.calibrated(),
            }
        } else {
            FsmEvent::RecoveryFailed
        };
        self.apply(event, now_ms, events);
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply one console command.  Never fails; bad input yields a message.
    pub fn handle_command(&mut self, cmd: Command, now_ms: u64, hw: &mut impl SensorPort) -> Reply {
        let json = self.ctx.config.json_output;
        let cfg = &mut self.ctx.config;
        let text = match cmd {
            Command::Diagnostic => self.diagnostic(now_ms, hw),
            Command::Status => render(&self.status_report(now_ms), json),
            Command::Config => ConfigReport(&self.ctx.config).to_string(),
            Command::ToggleJson => {
                cfg.json_output = !cfg.json_output;
                format!("json output: {}", on_off(cfg.json_output))
            }
            Command::ToggleSound => {
                cfg.sound_enabled = !cfg.sound_enabled;
                format!("sound: {}", on_off(cfg.sound_enabled))
            }
            Command::ToggleLeds => {
                cfg.leds_enabled = !cfg.leds_enabled;
                format!("leds: {}", on_off(cfg.leds_enabled))
            }
            Command::ToggleDebug => {
                cfg.debug = !cfg.debug;
                format!("debug: {}", on_off(cfg.debug))
            }
            Command::Set(setting) => {
                let mut text = match setting {
                    Setting::Temp(v) => {
                        cfg.temp_threshold = v;
                        format!("temp_threshold = {v}")
                    }
                    Setting::Distance(v) => {
                        cfg.distance_threshold = v;
                        format!("distance_threshold = {v}")
                    }
                    Setting::Score(v) => {
                        cfg.detection_threshold = v;
                        format!("detection_threshold = {v}")
                    }
                };
                info!("config: {text}");
                for w in cfg.warnings() {
                    warn!("config: {w}");
                    text.push_str("\nwarning: ");
                    text.push_str(w);
                }
                text
            }
            Command::Reset => {
                info!("Restart requested from console");
                self.calibration.cancel_token().cancel();
                return Reply::Restart;
            }
            Command::Help => HELP.to_owned(),
            Command::Unknown(input) => format!("unrecognized command '{input}', type 'help'"),
        };
        Reply::Message(text)
    }

    /// One-shot sample through validation and fusion.  Touches neither the
    /// statistics nor the carried distance.
    fn diagnostic(&self, now_ms: u64, hw: &mut impl SensorPort) -> String {
        let reading = sensors::acquire(hw, now_ms);
        let state = self.fsm.state().name();
        let report = match validator::validate(&reading) {
            Ok(sample) => {
                let eval = fusion::evaluate(&sample, self.ctx.previous_distance, &self.ctx.config);
                DiagnosticReport {
                    state,
                    reading,
                    error: ErrorCode::None,
                    score: Some(eval.score),
                    trace: Some(eval.trace),
                    triggered: Some(eval.triggered),
                }
            }
            Err(error) => DiagnosticReport {
                state,
                reading,
                error,
                score: None,
                trace: None,
                triggered: None,
            },
        };
        render(&report, self.ctx.config.json_output)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> SystemState {
        self.fsm.state()
    }

    pub fn last_error(&self) -> ErrorCode {
        self.fsm.last_error()
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.ctx.config
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.ctx.stats.snapshot()
    }

    /// Ambient baseline from the last successful calibration.
    pub fn baseline(&self) -> Option<f32> {
        self.ctx.baseline
    }

    pub fn alert_started_at(&self) -> Option<u64> {
        self.fsm.alert_started_at()
    }

    /// Token that aborts an in-flight calibration.
    pub fn cancel_token(&self) -> CancelToken {
        self.calibration.cancel_token()
    }

    pub fn status_report(&self, now_ms: u64) -> StatusReport {
        StatusReport::new(self.fsm.state(), self.fsm.last_error(), &self.ctx.stats.snapshot(), now_ms)
    }

    // ── Internal ──────────────────────────────────────────────

    /// Feed the state machine and run the service-level side effects of a
    /// transition.  Each effect happens once, on the transition itself.
    fn apply(&mut self, event: FsmEvent, now_ms: u64, events: &mut impl EventSink) {
        let Some(t) = self.fsm.apply(event, now_ms, &mut self.ctx) else {
            return;
        };
        events.emit(&AppEvent::StateChanged { from: t.from, to: t.to });

        match t.to {
            SystemState::Calibrating => {
                if t.from == SystemState::ErrorState {
                    self.calibration.cancel_token().reset();
                }
                self.calibration.start(now_ms);
            }
            SystemState::Monitoring => {
                if t.from != SystemState::Alert {
                    self.next_sample_at = now_ms;
                }
            }
            SystemState::ErrorState => {
                let code = self.fsm.last_error();
                error!("ERROR: {code}");
                events.emit(&AppEvent::ErrorRaised(code));
                self.last_recovery_at = now_ms;
            }
            SystemState::Standby | SystemState::Alert => {}
        }
    }

    fn notify(&self, feedback: &mut impl FeedbackSink, detection: Option<DetectionEvent>) {
        let frame = FeedbackFrame {
            state: self.fsm.state(),
            detection,
            leds_enabled: self.ctx.config.leds_enabled,
            sound_enabled: self.ctx.config.sound_enabled,
        };
        if let Err(e) = feedback.notify(&frame) {
            warn!("Feedback sink failed: {e}");
        }
    }
}
