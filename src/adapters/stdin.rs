//! Console transport over the process's standard input.
//!
//! A reader thread blocks on stdin and forwards raw chunks over a bounded
//! channel; the cooperative loop drains whatever has arrived without
//! blocking.  When the loop falls behind and the channel fills, further
//! chunks are dropped with a warning rather than queued without limit.
//! Line framing is the [`LineDecoder`](crate::console::LineDecoder)'s job.

use std::io::Read;
use std::thread;

use crossbeam_channel::{self as xch, TryRecvError, TrySendError};
use log::{debug, warn};

/// Chunks buffered between the reader thread and the loop.
pub const CHANNEL_DEPTH: usize = 16;

/// Bytes per read, and so the largest chunk.
const CHUNK_LEN: usize = 256;

pub struct StdinTransport {
    rx: xch::Receiver<Vec<u8>>,
    closed: bool,
}

impl StdinTransport {
    /// Spawn the reader thread on the process's stdin.
    pub fn spawn() -> std::io::Result<Self> {
        Self::from_reader(std::io::stdin())
    }

    /// Spawn the reader thread on any byte source.
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> std::io::Result<Self> {
        let (tx, rx) = xch::bounded(CHANNEL_DEPTH);
        thread::Builder::new().name("stdin".into()).spawn(move || {
            pump(reader, &tx);
            debug!("stdin: reader exiting");
        })?;
        Ok(Self { rx, closed: false })
    }

    /// Every byte received since the last call.  Never blocks.
    pub fn drain(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(chunk) => out.extend_from_slice(&chunk),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.closed = true;
                    break;
                }
            }
        }
        out
    }

    /// The input stream reached end-of-file and every chunk was drained.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Read `reader` to end-of-file, forwarding each chunk to `tx`.
/// Returns the number of chunks dropped because the channel was full.
fn pump(mut reader: impl Read, tx: &xch::Sender<Vec<u8>>) -> usize {
    let mut buf = [0u8; CHUNK_LEN];
    let mut dropped = 0;
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => match tx.try_send(buf[..n].to_vec()) {
                Ok(()) => {}
                Err(TrySendError::Full(chunk)) => {
                    dropped += 1;
                    warn!("stdin: channel full, dropping {} bytes", chunk.len());
                }
                Err(TrySendError::Disconnected(_)) => break,
            },
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => {
                warn!("stdin: read failed: {e}");
                break;
            }
        }
    }
    dropped
}
