//! Unified error types for the presence controller.
//!
//! Two layers:
//!
//! - [`ErrorCode`] is the operator-facing taxonomy.  It is paired 1:1 with
//!   entry into `ErrorState`, reported on the status channel, and cleared on
//!   successful recovery.
//! - [`Error`] is the crate-wide error enum for fallible library calls
//!   (config loading, sink failures).  Nothing on the per-tick path returns
//!   it; validation and fusion faults travel as values.

use core::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Operator-facing error code
// ---------------------------------------------------------------------------

/// Reason the controller is (or was last) in `ErrorState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorCode {
    #[default]
    None,
    /// Start-up sensor self-test failed.
    SensorInit,
    /// Baseline measurement failed or was cancelled.
    Calibration,
    /// Transient thermal read fault during monitoring.
    SensorRead,
    /// Reserved: resource exhaustion.
    Memory,
    /// Reserved: transport fault.
    Communication,
}

impl ErrorCode {
    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::SensorInit => write!(f, "sensor init failed"),
            Self::Calibration => write!(f, "calibration failed"),
            Self::SensorRead => write!(f, "sensor read failed"),
            Self::Memory => write!(f, "out of memory"),
            Self::Communication => write!(f, "communication failure"),
        }
    }
}

// ---------------------------------------------------------------------------
// Crate error
// ---------------------------------------------------------------------------

/// Every fallible library operation funnels into this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration is invalid or could not be loaded.
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Feedback errors
// ---------------------------------------------------------------------------

/// Failure reported by a feedback sink.  Never propagated into the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackError {
    /// LED strip did not accept the frame.
    LedWriteFailed,
    /// Tone output busy or unavailable.
    AudioUnavailable,
}

impl fmt::Display for FeedbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LedWriteFailed => write!(f, "LED write failed"),
            Self::AudioUnavailable => write!(f, "audio unavailable"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
