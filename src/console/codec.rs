//! Line codec for the console byte stream.
//!
//! ```text
//!  bytes ──▶ [ LineDecoder: buffer ≤ 64 B ] ──▶ complete lines
//!                 │ CR | LF | CRLF  → emit
//!                 │ buffer full     → drop until next terminator
//! ```
//!
//! A single transport read may carry part of a line, exactly one line, or
//! several lines back to back; the decoder accumulates across calls.
//! `\r\n` ends one line, not two.  Bytes are decoded as lossy UTF-8.

use crate::config::MAX_LINE_LEN;

/// Streaming line decoder.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buf: heapless::Vec<u8, MAX_LINE_LEN>,
    /// Line overflowed; input is being dropped until the terminator.
    truncating: bool,
    /// Previous byte was `\r`, so a following `\n` belongs to it.
    after_cr: bool,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte.  Returns a line when `byte` completes one.
    pub fn push(&mut self, byte: u8) -> Option<String> {
        let after_cr = core::mem::replace(&mut self.after_cr, byte == b'\r');
        match byte {
            b'\n' if after_cr => None,
            b'\r' | b'\n' => Some(self.take_line()),
            _ => {
                if self.buf.push(byte).is_err() && !self.truncating {
                    log::warn!("console: line exceeds {MAX_LINE_LEN} bytes, truncating");
                    self.truncating = true;
                }
                None
            }
        }
    }

    /// Feed a chunk, collecting every line it completes.
    pub fn feed(&mut self, data: &[u8]) -> Vec<String> {
        data.iter().filter_map(|&b| self.push(b)).collect()
    }

    /// Drop any partial line (e.g. after a transport reconnect).
    pub fn reset(&mut self) {
        self.buf.clear();
        self.truncating = false;
        self.after_cr = false;
    }

    fn take_line(&mut self) -> String {
        let line = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        self.truncating = false;
        line
    }
}
