//! Statistics aggregator.
//!
//! Running counters and means over the validated sample stream.  Means are
//! incremental (`mean_n = mean_{n-1} + (x_n - mean_{n-1}) / n`) and each
//! metric keeps its own sample count, so a skipped input never skews the
//! weight of later ones.

use serde::Serialize;

/// Incremental arithmetic mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RunningMean {
    mean: f32,
    count: u32,
}

impl RunningMean {
    /// Fold in `x`.  Non-finite values are ignored.
    pub fn push(&mut self, x: f32) {
        if !x.is_finite() {
            return;
        }
        self.count = self.count.saturating_add(1);
        self.mean += (x - self.mean) / self.count as f32;
    }

    pub fn mean(&self) -> f32 {
        self.mean
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// Aggregated detection statistics.  Counters never decrease.
#[derive(Debug, Clone, Default)]
pub struct DetectionStats {
    start_ms: u64,
    uptime_ms: u64,
    samples: u64,
    total_detections: u32,
    error_count: u32,
    last_detection_ms: Option<u64>,
    distance: RunningMean,
    object_temp: RunningMean,
}

/// Read-only copy for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub uptime_ms: u64,
    pub samples: u64,
    pub total_detections: u32,
    pub error_count: u32,
    pub last_detection_ms: Option<u64>,
    pub average_distance: f32,
    pub average_object_temp: f32,
}

impl DetectionStats {
    pub fn new(start_ms: u64) -> Self {
        Self {
            start_ms,
            ..Self::default()
        }
    }

    /// Fold in one validated sample.
    pub fn record(&mut self, sample: &crate::sensors::SensorSample) {
        self.touch(sample.timestamp);
        self.samples += 1;
        if let Some(d) = sample.distance() {
            self.distance.push(d);
        }
        self.object_temp.push(sample.object_temp);
    }

    /// Count a new alert episode.
    pub fn record_detection(&mut self, now_ms: u64) {
        self.touch(now_ms);
        self.total_detections = self.total_detections.saturating_add(1);
        self.last_detection_ms = Some(now_ms);
    }

    /// Count an entry into `ErrorState`.
    pub fn record_error(&mut self, now_ms: u64) {
        self.touch(now_ms);
        self.error_count = self.error_count.saturating_add(1);
    }

    /// Refresh uptime without recording anything.
    pub fn touch(&mut self, now_ms: u64) {
        self.uptime_ms = self.uptime_ms.max(now_ms.saturating_sub(self.start_ms));
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            uptime_ms: self.uptime_ms,
            samples: self.samples,
            total_detections: self.total_detections,
            error_count: self.error_count,
            last_detection_ms: self.last_detection_ms,
            average_distance: self.distance.mean(),
            average_object_temp: self.object_temp.mean(),
        }
    }
}
