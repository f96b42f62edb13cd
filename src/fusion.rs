//! Detection fusion engine.
//!
//! Three independent terms are evaluated and summed, no early exit:
//!
//! ```text
//!  motion (either PIR zone)              +3
//!  object - ambient > temp_threshold     +2
//!  |distance - previous| > dist_thresh   +1   (both readings valid)
//!  ───────────────────────────────────────────
//!  score in [0, 6];  triggered = score >= detection_threshold
//! ```
//!
//! The engine is stateless.  The caller owns `previous_distance` and feeds
//! it back on the next tick.

use core::fmt::Write;

use serde::Serialize;

use crate::config::{DetectorConfig, MOTION_WEIGHT, RANGE_WEIGHT, THERMAL_WEIGHT};
use crate::sensors::SensorSample;

/// Human-readable trace of which terms fired, e.g. `PIR:ON (LEFT) TEMP:HIGH`.
pub type Trace = heapless::String<40>;

/// Which PIR zone(s) saw motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    None,
    Left,
    Right,
    Center,
}

impl Direction {
    pub fn from_zones(a: bool, b: bool) -> Self {
        match (a, b) {
            (true, true) => Self::Center,
            (true, false) => Self::Left,
            (false, true) => Self::Right,
            (false, false) => Self::None,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Left => "(LEFT)",
            Self::Right => "(RIGHT)",
            Self::Center => "(CENTER)",
        }
    }
}

/// Result of one fusion pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub score: i32,
    pub trace: Trace,
    pub direction: Direction,
    pub triggered: bool,
}

/// Fuse one validated sample.
pub fn evaluate(
    sample: &SensorSample,
    previous_distance: Option<f32>,
    config: &DetectorConfig,
) -> Evaluation {
    let mut score = 0;
    let mut trace = Trace::new();
    let direction = Direction::from_zones(sample.motion_a, sample.motion_b);

    if direction != Direction::None {
        score += MOTION_WEIGHT;
        push_token(&mut trace, "PIR:ON");
        push_token(&mut trace, direction.tag());
    }

    // Live ambient, not the calibration baseline, so slow drift cancels out.
    if sample.object_temp - sample.ambient_temp > config.temp_threshold {
        score += THERMAL_WEIGHT;
        push_token(&mut trace, "TEMP:HIGH");
    }

    let previous = previous_distance.filter(|d| *d > 0.0);
    if let (Some(current), Some(previous)) = (sample.distance(), previous) {
        if (current - previous).abs() > config.distance_threshold {
            score += RANGE_WEIGHT;
            push_token(&mut trace, "MOVE:ON");
        }
    }

    Evaluation {
        score,
        trace,
        direction,
        triggered: score >= config.detection_threshold,
    }
}

fn push_token(trace: &mut Trace, token: &str) {
    if !trace.is_empty() {
        let _ = trace.push(' ');
    }
    let _ = trace.write_str(token);
}
