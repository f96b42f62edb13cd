//! Simulated sensor interface for host runs.
//!
//! A deterministic script: the room is empty except for a visitor who
//! crosses the field of view once every `period` motion reads, taking
//! `visit` reads to do so.  While crossing, the PIR zones light up left,
//! then both, then right; the object temperature rises above ambient; and
//! the range finder tracks the approach and retreat.
//!
//! Individual channels can be pinned with [`SimSensors::set_override`],
//! thermal faults injected for a number of reads, and the self-test forced
//! to fail.  The script advances once per `read_motion` call, which the
//! acquisition path makes exactly once per sample.

use log::info;

use crate::app::ports::SensorPort;
use crate::sensors::INVALID_DISTANCE;

const AMBIENT_C: f32 = 22.0;
const BODY_DELTA_C: f32 = 8.0;
const EMPTY_ROOM_CM: f32 = 250.0;
const CLOSEST_CM: f32 = 80.0;

/// Pinned channel values.  `None` follows the script.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimOverrides {
    pub motion: Option<(bool, bool)>,
    pub object_temp: Option<f32>,
    pub ambient_temp: Option<f32>,
    pub distance: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct SimSensors {
    period: u32,
    visit: u32,
    tick: u32,
    overrides: SimOverrides,
    /// Object reads left that return NaN.
    thermal_fault_reads: u32,
    self_test_ok: bool,
}

impl SimSensors {
    /// `period` reads between visits, `visit` reads per crossing.
    pub fn new(period: u32, visit: u32) -> Self {
        let period = period.max(1);
        Self {
            period,
            visit: visit.min(period),
            tick: 0,
            overrides: SimOverrides::default(),
            thermal_fault_reads: 0,
            self_test_ok: true,
        }
    }

    pub fn set_override(&mut self, overrides: SimOverrides) {
        self.overrides = overrides;
    }

    /// The next `reads` object-temperature reads return NaN.
    pub fn inject_thermal_fault(&mut self, reads: u32) {
        info!("SIM: injecting thermal fault for {reads} reads");
        self.thermal_fault_reads = reads;
    }

    pub fn set_self_test(&mut self, ok: bool) {
        self.self_test_ok = ok;
    }

    /// Position inside the current crossing, `None` when the room is empty.
    fn visit_phase(&self) -> Option<u32> {
        let pos = self.tick % self.period;
        let start = self.period - self.visit;
        (self.visit > 0 && pos >= start).then(|| pos - start)
    }

    /// Fraction of the crossing completed, in [0, 1).
    fn progress(&self) -> Option<f32> {
        self.visit_phase().map(|p| p as f32 / self.visit as f32)
    }
}

impl Default for SimSensors {
    /// A visit every 60 reads (12 s at 5 Hz) lasting 15 reads.
    fn default() -> Self {
        Self::new(60, 15)
    }
}

impl SensorPort for SimSensors {
    fn read_motion(&mut self) -> (bool, bool) {
        self.tick = self.tick.wrapping_add(1);
        if let Some(m) = self.overrides.motion {
            return m;
        }
        match self.progress() {
            Some(p) if p < 1.0 / 3.0 => (true, false),
            Some(p) if p < 2.0 / 3.0 => (true, true),
            Some(_) => (false, true),
            None => (false, false),
        }
    }

    fn read_object_temp(&mut self) -> f32 {
        if self.thermal_fault_reads > 0 {
            self.thermal_fault_reads -= 1;
            return f32::NAN;
        }
        if let Some(t) = self.overrides.object_temp {
            return t;
        }
        let ambient = self.overrides.ambient_temp.unwrap_or(AMBIENT_C);
        match self.progress() {
            Some(_) => ambient + BODY_DELTA_C,
            None => ambient + 0.5,
        }
    }

    fn read_ambient_temp(&mut self) -> f32 {
        self.overrides.ambient_temp.unwrap_or(AMBIENT_C)
    }

    fn read_distance(&mut self) -> f32 {
        if let Some(d) = self.overrides.distance {
            return d;
        }
        match self.progress() {
            // Approach then retreat: 250 → 80 → 250 cm.
            Some(p) => {
                let depth = 1.0 - (2.0 * p - 1.0).abs();
                EMPTY_ROOM_CM - depth * (EMPTY_ROOM_CM - CLOSEST_CM)
            }
            None => EMPTY_ROOM_CM,
        }
    }

    fn self_test(&mut self) -> bool {
        self.self_test_ok
    }
}

/// A range finder that never sees an echo.
pub fn no_echo() -> SimOverrides {
    SimOverrides {
        distance: Some(INVALID_DISTANCE),
        ..SimOverrides::default()
    }
}
