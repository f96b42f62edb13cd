//! Integration tests for the DetectorService tick pipeline.
//!
//! Sensors → validation → fusion → state machine → events / feedback, all
//! against mock adapters with an explicit millisecond clock.

use presence::app::commands::Command;
use presence::app::events::AppEvent;
use presence::app::service::Reply;
use presence::calibration::CalibrationOutcome;
use presence::config::DetectorConfig;
use presence::error::ErrorCode;
use presence::fsm::SystemState;

use crate::mock_hw::{MockSensors, Rig};

fn command(rig: &mut Rig, line: &str) -> String {
    match rig.svc.handle_command(Command::parse(line), rig.now, &mut rig.hw) {
        Reply::Message(text) => text,
        Reply::Restart => panic!("unexpected restart for {line:?}"),
    }
}

// ── Boot and calibration ──────────────────────────────────────

#[test]
fn boot_enters_calibrating_then_monitoring() {
    let mut rig = Rig::boot(DetectorConfig::default(), MockSensors::new());
    assert_eq!(rig.svc.state(), SystemState::Calibrating);
    assert!(rig.events.events.contains(&AppEvent::Started(SystemState::Calibrating)));

    rig.run_to(29_990);
    assert_eq!(rig.svc.state(), SystemState::Calibrating, "window is 30 s");

    rig.run_to(30_000);
    assert_eq!(rig.svc.state(), SystemState::Monitoring);
    assert_eq!(rig.svc.baseline(), Some(22.0));
    assert_eq!(
        rig.events.count(|e| matches!(e, AppEvent::CalibrationFinished(CalibrationOutcome::Succeeded { .. }))),
        1
    );
}

#[test]
fn self_test_failure_holds_in_error() {
    let mut hw = MockSensors::new();
    hw.self_test_ok = false;
    let rig = Rig::boot(DetectorConfig::default(), hw);

    assert_eq!(rig.svc.state(), SystemState::ErrorState);
    assert_eq!(rig.svc.last_error(), ErrorCode::SensorInit);
    assert!(rig.events.events.contains(&AppEvent::ErrorRaised(ErrorCode::SensorInit)));
    assert!(rig.events.events.contains(&AppEvent::Started(SystemState::ErrorState)));
}

#[test]
fn calibration_with_no_valid_ambient_fails() {
    let mut hw = MockSensors::new();
    hw.ambient_temp = f32::NAN;
    let mut rig = Rig::boot(DetectorConfig::default(), hw);
    rig.run_to(3_000);

    assert_eq!(rig.svc.state(), SystemState::ErrorState);
    assert_eq!(rig.svc.last_error(), ErrorCode::Calibration);
    assert!(rig.events.events.contains(&AppEvent::CalibrationFinished(CalibrationOutcome::Failed {
        valid: 0,
        attempted: 20
    })));
    assert_eq!(rig.svc.baseline(), None);
}

#[test]
fn cancelled_calibration_is_a_calibration_error() {
    let mut rig = Rig::boot(DetectorConfig::default(), MockSensors::new());
    rig.run_to(5_000);
    rig.svc.cancel_token().cancel();
    rig.run_to(5_010);

    assert_eq!(rig.svc.state(), SystemState::ErrorState);
    assert_eq!(rig.svc.last_error(), ErrorCode::Calibration);
    assert!(rig.events.events.contains(&AppEvent::CalibrationFinished(CalibrationOutcome::Cancelled)));
}

#[test]
fn recovery_before_any_calibration_recalibrates() {
    let mut hw = MockSensors::new();
    hw.self_test_ok = false;
    let mut rig = Rig::boot(DetectorConfig::default(), hw);

    rig.hw.self_test_ok = true;
    rig.run_to(9_990);
    assert_eq!(rig.svc.state(), SystemState::ErrorState);
    rig.run_to(10_000);
    assert_eq!(rig.svc.state(), SystemState::Calibrating, "never Monitoring before calibration");

    rig.run_to(40_000);
    assert_eq!(rig.svc.state(), SystemState::Monitoring);
}

// ── Fusion and alerts ─────────────────────────────────────────

#[test]
fn motion_alone_never_alerts() {
    let mut rig = Rig::monitoring();
    rig.hw.motion = (true, true);
    rig.run_to(40_000);
    assert_eq!(rig.svc.state(), SystemState::Monitoring);
    assert_eq!(rig.svc.stats().total_detections, 0);
}

#[test]
fn motion_and_warm_body_alert() {
    let mut rig = Rig::monitoring();
    rig.hw.visitor();
    rig.run_to(30_010);

    assert_eq!(rig.svc.state(), SystemState::Alert);
    assert_eq!(rig.svc.alert_started_at(), Some(30_010));
    assert_eq!(rig.svc.stats().total_detections, 1);
    assert_eq!(rig.events.count(|e| matches!(e, AppEvent::Detected(_))), 1);

    let detection = rig.feedback.frames.last().and_then(|f| f.detection.clone()).unwrap();
    assert_eq!(detection.score, 5);
    assert_eq!(detection.trace.as_str(), "PIR:ON (LEFT) TEMP:HIGH");
}

#[test]
fn range_change_adds_the_deciding_point() {
    let mut rig = Rig::monitoring();
    rig.hw.motion = (false, true);
    rig.run_to(30_010);
    assert_eq!(rig.svc.state(), SystemState::Monitoring);

    rig.hw.distance = 200.0;
    rig.run_to(30_210);
    assert_eq!(rig.svc.state(), SystemState::Alert);
}

#[test]
fn retrigger_during_alert_keeps_the_original_start() {
    let mut rig = Rig::monitoring();
    rig.hw.visitor();
    rig.run_to(32_900);

    assert_eq!(rig.svc.state(), SystemState::Alert);
    assert_eq!(rig.svc.alert_started_at(), Some(30_010));
    assert_eq!(rig.svc.stats().total_detections, 1);
    assert_eq!(rig.feedback.detections(), 1, "detection attached to the opening tick only");

    // Expires on schedule despite the continued trigger ...
    rig.run_to(33_010);
    assert_eq!(rig.svc.state(), SystemState::Monitoring);

    // ... and the next tick opens a fresh episode.
    rig.run_to(33_210);
    assert_eq!(rig.svc.state(), SystemState::Alert);
    assert_eq!(rig.svc.alert_started_at(), Some(33_210));
    assert_eq!(rig.svc.stats().total_detections, 2);
}

#[test]
fn alert_ends_on_the_tick_after_duration_elapses() {
    let mut rig = Rig::monitoring();
    rig.hw.visitor();
    rig.run_to(30_010);
    rig.hw.quiet();

    rig.run_to(33_000);
    assert_eq!(rig.svc.state(), SystemState::Alert);
    rig.run_to(33_010);
    assert_eq!(rig.svc.state(), SystemState::Monitoring);
    assert_eq!(rig.svc.alert_started_at(), None);
}

#[test]
fn unreachable_score_threshold_never_alerts() {
    let mut rig = Rig::monitoring();
    let reply = command(&mut rig, "set score 7");
    assert!(reply.starts_with("detection_threshold = 7"));
    assert!(reply.contains("warning"));

    rig.hw.visitor();
    for i in 0..50u64 {
        rig.hw.distance = if i % 2 == 0 { 100.0 } else { 300.0 };
        rig.run_to(30_000 + (i + 1) * 200);
    }
    assert_eq!(rig.svc.state(), SystemState::Monitoring);
    assert_eq!(rig.svc.stats().total_detections, 0);
}

#[test]
fn settings_apply_to_the_next_tick() {
    let mut rig = Rig::monitoring();
    command(&mut rig, "set temp 100");
    rig.hw.visitor();
    rig.run_to(31_000);
    assert_eq!(rig.svc.state(), SystemState::Monitoring, "thermal term disabled");

    command(&mut rig, "set score 3");
    rig.run_to(31_010);
    assert_eq!(rig.svc.state(), SystemState::Alert);
}

// ── Faults and recovery ───────────────────────────────────────

#[test]
fn thermal_fault_reported_once_then_recovers() {
    let mut rig = Rig::monitoring();
    rig.hw.object_temp = f32::NAN;
    rig.run_to(31_000);

    assert_eq!(rig.svc.state(), SystemState::ErrorState);
    assert_eq!(rig.svc.last_error(), ErrorCode::SensorRead);
    assert_eq!(rig.events.count(|e| matches!(e, AppEvent::ErrorRaised(_))), 1);

    rig.hw.quiet();
    rig.run_to(40_000);
    assert_eq!(rig.svc.state(), SystemState::ErrorState);
    assert_eq!(rig.events.count(|e| matches!(e, AppEvent::RecoveryAttempted { .. })), 0);

    rig.run_to(40_010);
    assert_eq!(rig.svc.state(), SystemState::Monitoring);
    assert!(rig.svc.last_error().is_none());
    assert!(rig.events.events.contains(&AppEvent::RecoveryAttempted {
        code: ErrorCode::SensorRead,
        success: true
    }));
    assert_eq!(rig.svc.stats().error_count, 1);
}

#[test]
fn sensor_fault_during_alert_enters_error() {
    let mut rig = Rig::monitoring();
    rig.hw.visitor();
    rig.run_to(30_010);
    assert_eq!(rig.svc.state(), SystemState::Alert);

    rig.hw.ambient_temp = 120.0;
    rig.run_to(30_210);
    assert_eq!(rig.svc.state(), SystemState::ErrorState);
    assert_eq!(rig.svc.alert_started_at(), None);
}

#[test]
fn failed_recovery_retries_every_interval() {
    let mut rig = Rig::monitoring();
    rig.hw.object_temp = f32::NAN;
    rig.run_to(30_010);
    rig.hw.quiet();
    rig.hw.self_test_ok = false;

    rig.run_to(50_100);
    assert_eq!(rig.svc.state(), SystemState::ErrorState);
    assert_eq!(
        rig.events.count(|e| matches!(e, AppEvent::RecoveryAttempted { success: false, .. })),
        2
    );

    rig.hw.self_test_ok = true;
    rig.run_to(60_010);
    assert_eq!(rig.svc.state(), SystemState::Monitoring);
}

#[test]
fn feedback_failures_do_not_reach_the_core() {
    let mut rig = Rig::monitoring();
    rig.feedback.fail = true;
    rig.hw.visitor();
    rig.run_to(31_000);
    assert_eq!(rig.svc.state(), SystemState::Alert);
    assert!(!rig.feedback.frames.is_empty());
}

#[test]
fn feedback_follows_every_sampling_tick() {
    let mut rig = Rig::monitoring();
    let before = rig.feedback.frames.len();
    rig.run_to(31_000);
    // Ticks at 30 010, 30 210, 30 410, 30 610, 30 810.
    assert_eq!(rig.feedback.frames.len() - before, 5);
    assert!(rig.feedback.frames.iter().all(|f| f.leds_enabled && f.sound_enabled));
}

// ── Watchdog ──────────────────────────────────────────────────

#[test]
fn stalled_loop_is_reported_once() {
    let mut rig = Rig::monitoring();
    rig.now += 31_000;
    rig.poll();
    rig.now += 10;
    rig.poll();
    assert_eq!(
        rig.events.events.iter().filter(|e| matches!(e, AppEvent::WatchdogStall { .. })).count(),
        1
    );
    assert!(rig.events.events.contains(&AppEvent::WatchdogStall { silent_ms: 31_000 }));
}

// ── Statistics ────────────────────────────────────────────────

#[test]
fn invalid_distance_is_sampled_but_not_averaged() {
    let mut rig = Rig::monitoring();
    rig.hw.distance = 100.0;
    rig.run_to(30_500);
    rig.hw.distance = -1.0;
    rig.run_to(31_000);

    let stats = rig.svc.stats();
    assert_eq!(stats.samples, 5);
    assert!((stats.average_distance - 100.0).abs() < 1e-4);
    assert_eq!(stats.uptime_ms, 31_000);
}

#[test]
fn diagnostic_sample_leaves_statistics_alone() {
    let mut rig = Rig::monitoring();
    rig.run_to(31_000);
    let before = rig.svc.stats();

    rig.hw.visitor();
    let text = command(&mut rig, "");
    assert!(text.contains("score: 5"), "{text}");
    assert_eq!(rig.svc.stats(), before);
    assert_eq!(rig.svc.state(), SystemState::Monitoring);
}

#[test]
fn reset_requests_restart_and_cancels_calibration() {
    let mut rig = Rig::boot(DetectorConfig::default(), MockSensors::new());
    let reply = rig.svc.handle_command(Command::Reset, rig.now, &mut rig.hw);
    assert_eq!(reply, Reply::Restart);
    assert!(rig.svc.cancel_token().is_cancelled());
}
