//! Shared mutable context threaded through the state machine and service.
//!
//! `Context` is the single owner of everything the sampling tick and the
//! console both touch: configuration, statistics, and the distance carried
//! between ticks.  The main loop owns one and lends it out by reference;
//! no component keeps its own copy.

use crate::config::DetectorConfig;
use crate::stats::DetectionStats;

pub struct Context {
    /// Live configuration.  Written only by console commands.
    pub config: DetectorConfig,
    /// Running statistics over validated samples.
    pub stats: DetectionStats,
    /// Last tick's range reading, `None` after start-up, an invalid
    /// reading, or recovery.
    pub previous_distance: Option<f32>,
    /// Ambient baseline from the last successful calibration.
    pub baseline: Option<f32>,
}

impl Context {
    pub fn new(config: DetectorConfig, start_ms: u64) -> Self {
        Self {
            config,
            stats: DetectionStats::new(start_ms),
            previous_distance: None,
            baseline: None,
        }
    }
}
