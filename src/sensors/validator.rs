//! Sample validator.
//!
//! Rejects physically impossible readings before fusion.  Thermal faults
//! are hard: they surface as [`ErrorCode::SensorRead`] and drive the state
//! machine into `ErrorState`.  Range faults are soft: the distance is
//! coerced to the sentinel and the tick carries on without a delta check.

use super::{INVALID_DISTANCE, RawReading, SensorSample};
use crate::error::ErrorCode;

/// Operating range of the IR thermometer (°C).
pub const THERMAL_MIN_C: f32 = -40.0;
pub const THERMAL_MAX_C: f32 = 85.0;

/// Usable range of the ultrasonic finder (cm).
pub const DISTANCE_MIN_CM: f32 = 2.0;
pub const DISTANCE_MAX_CM: f32 = 400.0;

/// True if `celsius` is a plausible thermometer output.
pub fn thermal_valid(celsius: f32) -> bool {
    !celsius.is_nan() && (THERMAL_MIN_C..=THERMAL_MAX_C).contains(&celsius)
}

/// Clamp a range reading to either a usable value or the sentinel.
pub fn sanitize_distance(cm: f32) -> f32 {
    if cm.is_finite() && (DISTANCE_MIN_CM..=DISTANCE_MAX_CM).contains(&cm) {
        cm
    } else {
        INVALID_DISTANCE
    }
}

/// Validate one raw reading.
pub fn validate(raw: &RawReading) -> Result<SensorSample, ErrorCode> {
    if !thermal_valid(raw.object_temp) || !thermal_valid(raw.ambient_temp) {
        return Err(ErrorCode::SensorRead);
    }

    Ok(SensorSample {
        motion_a: raw.motion_a,
        motion_b: raw.motion_b,
        object_temp: raw.object_temp,
        ambient_temp: raw.ambient_temp,
        distance: sanitize_distance(raw.distance),
        timestamp: raw.timestamp,
    })
}
