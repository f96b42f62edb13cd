//! Software heartbeat watchdog.
//!
//! The main loop calls `feed()` at the end of every tick.  `check()` reports
//! a stall once per silent episode when no feed has arrived within the
//! timeout.  It never resets anything; restart policy belongs to the host.

use log::warn;

#[derive(Debug, Clone)]
pub struct Heartbeat {
    timeout_ms: u64,
    last_feed: u64,
    /// A stall for the current silent episode was already reported.
    reported: bool,
}

impl Heartbeat {
    pub fn new(timeout_ms: u32, now_ms: u64) -> Self {
        Self {
            timeout_ms: u64::from(timeout_ms),
            last_feed: now_ms,
            reported: false,
        }
    }

    /// Record a heartbeat.  Ends any stall episode.
    pub fn feed(&mut self, now_ms: u64) {
        self.last_feed = now_ms;
        self.reported = false;
    }

    /// Milliseconds of silence if the heartbeat has just been found stalled,
    /// `None` otherwise (including repeat checks in the same episode).
    pub fn check(&mut self, now_ms: u64) -> Option<u64> {
        let silent = now_ms.saturating_sub(self.last_feed);
        if silent <= self.timeout_ms || self.reported {
            return None;
        }
        self.reported = true;
        warn!("Watchdog: no heartbeat for {silent} ms (timeout {} ms)", self.timeout_ms);
        Some(silent)
    }

    pub fn last_feed(&self) -> u64 {
        self.last_feed
    }
}
