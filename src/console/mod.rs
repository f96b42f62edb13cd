//! Operator console: the byte-stream line codec and the reports the
//! console renders.  Command parsing lives in [`crate::app::commands`].

pub mod codec;
pub mod report;

pub use codec::LineDecoder;
