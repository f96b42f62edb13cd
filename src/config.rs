//! Runtime configuration parameters
//!
//! All tunable parameters for the presence controller.  The live copy is
//! owned by the service context and mutated only by console commands; the
//! fusion engine and state machine read it every tick.

use serde::{Deserialize, Serialize};

/// Weight of the motion (PIR) term.
pub const MOTION_WEIGHT: i32 = 3;
/// Weight of the thermal-differential term.
pub const THERMAL_WEIGHT: i32 = 2;
/// Weight of the range-delta term.
pub const RANGE_WEIGHT: i32 = 1;
/// Highest score the fusion engine can produce.
pub const MAX_SCORE: i32 = MOTION_WEIGHT + THERMAL_WEIGHT + RANGE_WEIGHT;

/// Fewest ambient samples that give a trustworthy baseline.
pub const MIN_CALIBRATION_SAMPLES: u16 = 10;

/// Longest command line accepted by the console before truncation.
pub const MAX_LINE_LEN: usize = 64;

/// Firmware version reported in status output.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Calibration timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Total calibration window including PIR settling (milliseconds)
    pub duration_ms: u32,
    /// Ambient samples taken for the baseline
    pub samples: u16,
    /// Gap between ambient samples (milliseconds)
    pub sample_interval_ms: u32,
    /// Cancellation poll cadence during the settling hold (milliseconds)
    pub poll_interval_ms: u32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 30_000,
            samples: 20,
            sample_interval_ms: 100,
            poll_interval_ms: 500,
        }
    }
}

/// Core detector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    // --- Fusion thresholds ---
    /// Object-minus-ambient temperature that counts as a warm body (°C)
    pub temp_threshold: f32,
    /// Tick-to-tick range change that counts as movement (cm)
    pub distance_threshold: f32,
    /// Score at or above which a detection is declared
    pub detection_threshold: i32,

    // --- Timing ---
    /// Sensor sampling interval (milliseconds)
    pub sampling_interval_ms: u32,
    /// Alert episode length (milliseconds)
    pub alert_duration_ms: u32,
    /// Retry cadence while in ErrorState (milliseconds)
    pub recovery_interval_ms: u32,
    /// Heartbeat silence before a stall warning (milliseconds)
    pub watchdog_timeout_ms: u32,
    pub calibration: CalibrationConfig,

    // --- Output ---
    pub sound_enabled: bool,
    pub leds_enabled: bool,
    /// Status replies as JSON instead of text
    pub json_output: bool,
    /// Log every sampling tick at debug level
    pub debug: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            // Fusion
            temp_threshold: 5.0,
            distance_threshold: 10.0,
            detection_threshold: 4,

            // Timing
            sampling_interval_ms: 200,   // 5 Hz
            alert_duration_ms: 3_000,
            recovery_interval_ms: 10_000,
            watchdog_timeout_ms: 30_000,
            calibration: CalibrationConfig::default(),

            // Output
            sound_enabled: true,
            leds_enabled: true,
            json_output: false,
            debug: false,
        }
    }
}

impl DetectorConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(text: &str) -> crate::error::Result<Self> {
        serde_json::from_str(text).map_err(|e| crate::error::Error::Config(e.to_string()))
    }

    /// Non-fatal observations about the current values.
    ///
    /// Every value the console accepts is kept; this only tells the
    /// operator when a setting can never (or always) fire.
    pub fn warnings(&self) -> heapless::Vec<&'static str, 4> {
        let mut out = heapless::Vec::new();
        if self.detection_threshold > MAX_SCORE {
            let _ = out.push("detection threshold above max score, alerts can never trigger");
        }
        if self.detection_threshold < 1 {
            let _ = out.push("detection threshold below 1, every tick triggers");
        }
        if self.temp_threshold <= 0.0 {
            let _ = out.push("temp threshold <= 0, any warm object triggers thermal term");
        }
        if self.distance_threshold <= 0.0 {
            let _ = out.push("distance threshold <= 0, any range change triggers");
        }
        if self.calibration.samples < MIN_CALIBRATION_SAMPLES {
            let _ = out.push("fewer than 10 calibration samples, baseline is unreliable");
        }
        out
    }
}
