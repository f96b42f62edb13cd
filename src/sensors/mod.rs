//! Sensor data model and the acquisition path.
//!
//! Raw readings come in through the [`SensorPort`] once per sampling tick,
//! are checked by the [`validator`], and leave as an immutable
//! [`SensorSample`] that the fusion engine and statistics consume.

pub mod validator;

use serde::Serialize;

use crate::app::ports::SensorPort;

/// Distance sentinel meaning "no valid range reading this tick".
pub const INVALID_DISTANCE: f32 = -1.0;

/// Unvalidated reading straight from the sensor interface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RawReading {
    pub motion_a: bool,
    pub motion_b: bool,
    pub object_temp: f32,
    pub ambient_temp: f32,
    /// Centimetres; -1 on echo timeout.
    pub distance: f32,
    /// Monotonic milliseconds.
    pub timestamp: u64,
}

/// A validated sample.  Thermal values are finite and in range; the
/// distance is either in range or [`INVALID_DISTANCE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorSample {
    pub motion_a: bool,
    pub motion_b: bool,
    pub object_temp: f32,
    pub ambient_temp: f32,
    pub distance: f32,
    pub timestamp: u64,
}

impl SensorSample {
    /// True if the range reading can take part in the delta check.
    pub fn has_distance(&self) -> bool {
        self.distance > 0.0
    }

    /// Distance as an option, `None` for the sentinel.
    pub fn distance(&self) -> Option<f32> {
        self.has_distance().then_some(self.distance)
    }
}

/// Read every sensor once and stamp the result with `now_ms`.
pub fn acquire(port: &mut impl SensorPort, now_ms: u64) -> RawReading {
    let (motion_a, motion_b) = port.read_motion();
    RawReading {
        motion_a,
        motion_b,
        object_temp: port.read_object_temp(),
        ambient_temp: port.read_ambient_temp(),
        distance: port.read_distance(),
        timestamp: now_ms,
    }
}
