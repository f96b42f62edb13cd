//! Port traits — the boundary between the controller core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DetectorService (domain)
//! ```
//!
//! Driven adapters (sensors, feedback rendering, status channel, clock)
//! implement these traits.  The [`DetectorService`](super::service::DetectorService)
//! consumes them via generics, so the core never touches hardware directly.

use crate::error::FeedbackError;
use crate::fsm::SystemState;

use super::events::{AppEvent, DetectionEvent};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Raw access to the three sensing modalities.
///
/// Every call must be bounded; the range finder caps its echo wait at
/// 30 ms and reports a timeout as `-1`.
pub trait SensorPort {
    /// Left and right PIR zone levels.
    fn read_motion(&mut self) -> (bool, bool);

    /// IR object temperature (°C).  May be NaN on a bus fault.
    fn read_object_temp(&mut self) -> f32;

    /// Die / ambient temperature (°C).  May be NaN on a bus fault.
    fn read_ambient_temp(&mut self) -> f32;

    /// Range in centimetres, `-1` on timeout or out of range.
    fn read_distance(&mut self) -> f32;

    /// Probe every sensor; `false` if any is absent or unresponsive.
    fn self_test(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Feedback port (driven adapter: domain → light / sound)
// ───────────────────────────────────────────────────────────────

/// What the feedback renderer is asked to show.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackFrame {
    pub state: SystemState,
    /// Present only on the tick that opens an alert episode.
    pub detection: Option<DetectionEvent>,
    pub leds_enabled: bool,
    pub sound_enabled: bool,
}

/// Light / sound renderer.  Errors are logged by the caller and dropped.
pub trait FeedbackSink {
    fn notify(&mut self, frame: &FeedbackFrame) -> Result<(), FeedbackError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → status channel)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port, once per
/// occurrence.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> u64;
}
