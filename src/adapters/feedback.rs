//! Log-rendered feedback sink.
//!
//! Stands in for the status LED and buzzer on the host: state changes are
//! rendered as the LED pattern the device would show, detections as a
//! beep.  Disabled channels render nothing.

use log::info;

use crate::app::ports::{FeedbackFrame, FeedbackSink};
use crate::error::FeedbackError;
use crate::fsm::SystemState;

/// LED pattern shown for each state.
fn led_pattern(state: SystemState) -> &'static str {
    match state {
        SystemState::Standby => "dim white",
        SystemState::Calibrating => "blue pulse",
        SystemState::Monitoring => "green breathe",
        SystemState::Alert => "red flash",
        SystemState::ErrorState => "amber blink",
    }
}

#[derive(Debug, Default)]
pub struct LogFeedback {
    shown: Option<SystemState>,
    beeps: u32,
}

impl LogFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detections beeped so far.
    pub fn beeps(&self) -> u32 {
        self.beeps
    }
}

impl FeedbackSink for LogFeedback {
    fn notify(&mut self, frame: &FeedbackFrame) -> Result<(), FeedbackError> {
        if frame.leds_enabled && self.shown != Some(frame.state) {
            info!("LED | {}", led_pattern(frame.state));
        }
        self.shown = frame.leds_enabled.then_some(frame.state);

        if let Some(d) = &frame.detection {
            if frame.sound_enabled {
                self.beeps += 1;
                info!("BEEP | score {}", d.score);
            }
        }
        Ok(())
    }
}
