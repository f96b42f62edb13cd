//! Mock adapters for integration tests.
//!
//! The sensor mock returns whatever the test last set; the sinks record
//! every event and frame so tests can assert on the full history.

use std::collections::VecDeque;

use presence::app::events::AppEvent;
use presence::app::ports::{EventSink, FeedbackFrame, FeedbackSink, SensorPort};
use presence::app::service::DetectorService;
use presence::config::DetectorConfig;
use presence::error::FeedbackError;

// ── MockSensors ───────────────────────────────────────────────

/// Scripted sensor interface.  Fields are the values every read returns;
/// `self_test_results` is consumed first, then `self_test_ok` applies.
#[derive(Debug, Clone)]
pub struct MockSensors {
    pub motion: (bool, bool),
    pub object_temp: f32,
    pub ambient_temp: f32,
    pub distance: f32,
    pub self_test_ok: bool,
    pub self_test_results: VecDeque<bool>,
    pub reads: u32,
    pub self_tests: u32,
}

#[allow(dead_code)]
impl MockSensors {
    /// An empty, quiet room at 22 °C with a wall at 250 cm.
    pub fn new() -> Self {
        Self {
            motion: (false, false),
            object_temp: 22.5,
            ambient_temp: 22.0,
            distance: 250.0,
            self_test_ok: true,
            self_test_results: VecDeque::new(),
            reads: 0,
            self_tests: 0,
        }
    }

    /// Someone warm moving in the left zone.
    pub fn visitor(&mut self) {
        self.motion = (true, false);
        self.object_temp = self.ambient_temp + 8.0;
    }

    pub fn quiet(&mut self) {
        self.motion = (false, false);
        self.object_temp = self.ambient_temp + 0.5;
    }
}

impl Default for MockSensors {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockSensors {
    fn read_motion(&mut self) -> (bool, bool) {
        self.reads += 1;
        self.motion
    }

    fn read_object_temp(&mut self) -> f32 {
        self.object_temp
    }

    fn read_ambient_temp(&mut self) -> f32 {
        self.ambient_temp
    }

    fn read_distance(&mut self) -> f32 {
        self.distance
    }

    fn self_test(&mut self) -> bool {
        self.self_tests += 1;
        self.self_test_results.pop_front().unwrap_or(self.self_test_ok)
    }
}

// ── EventLog ──────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── FeedbackLog ───────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct FeedbackLog {
    pub frames: Vec<FeedbackFrame>,
    /// Reject every frame (after recording it).
    pub fail: bool,
}

#[allow(dead_code)]
impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn detections(&self) -> usize {
        self.frames.iter().filter(|f| f.detection.is_some()).count()
    }
}

impl FeedbackSink for FeedbackLog {
    fn notify(&mut self, frame: &FeedbackFrame) -> Result<(), FeedbackError> {
        self.frames.push(frame.clone());
        if self.fail {
            Err(FeedbackError::LedWriteFailed)
        } else {
            Ok(())
        }
    }
}

// ── Harness ───────────────────────────────────────────────────

/// Poll step used by every test loop.
pub const STEP_MS: u64 = 10;

/// Service plus mocks, driven by an explicit millisecond clock.
pub struct Rig {
    pub svc: DetectorService,
    pub hw: MockSensors,
    pub events: EventLog,
    pub feedback: FeedbackLog,
    pub now: u64,
}

#[allow(dead_code)]
impl Rig {
    /// Booted at t = 0 with the given config and sensors.
    pub fn boot(config: DetectorConfig, hw: MockSensors) -> Self {
        let mut rig = Self {
            svc: DetectorService::new(config, 0),
            hw,
            events: EventLog::new(),
            feedback: FeedbackLog::new(),
            now: 0,
        };
        rig.svc.boot(0, &mut rig.hw, &mut rig.events, &mut rig.feedback);
        rig
    }

    /// Booted and calibrated; returns at the first `Monitoring` instant.
    pub fn monitoring() -> Self {
        let mut rig = Self::boot(DetectorConfig::default(), MockSensors::new());
        rig.run_until(40_000, |r| r.svc.state() == presence::fsm::SystemState::Monitoring);
        assert_eq!(rig.svc.state(), presence::fsm::SystemState::Monitoring);
        rig
    }

    pub fn poll(&mut self) {
        self.svc.poll(self.now, &mut self.hw, &mut self.events, &mut self.feedback);
    }

    /// Poll every `STEP_MS` up to and including `until`.
    pub fn run_to(&mut self, until: u64) {
        while self.now < until {
            self.now = (self.now + STEP_MS).min(until);
            self.poll();
        }
    }

    /// Poll every `STEP_MS` until `done` holds or `deadline` passes.
    pub fn run_until(&mut self, deadline: u64, done: impl Fn(&Self) -> bool) {
        while !done(self) && self.now < deadline {
            self.now += STEP_MS;
            self.poll();
        }
    }
}
