//! Fuzz target: console line decoder and command grammar
//!
//! Drives arbitrary byte sequences through `LineDecoder::feed` and
//! `Command::parse` and checks:
//! - No panics under any byte sequence
//! - Lines never carry a terminator and stay within the buffer bound
//! - Feeding byte by byte yields the same lines as one chunk
//!
//! cargo fuzz run fuzz_console

#![no_main]

use libfuzzer_sys::fuzz_target;
use presence::app::commands::Command;
use presence::config::MAX_LINE_LEN;
use presence::console::LineDecoder;

fuzz_target!(|data: &[u8]| {
    let mut chunked = LineDecoder::new();
    let lines = chunked.feed(data);

    for line in &lines {
        assert!(!line.contains('\n') && !line.contains('\r'));
        // Lossy decoding may widen one byte to a 3-byte replacement char.
        assert!(line.len() <= MAX_LINE_LEN * 3);
        let _ = Command::parse(line);
    }

    let mut bytewise = LineDecoder::new();
    let split: Vec<String> = data.iter().filter_map(|&b| bytewise.push(b)).collect();
    assert_eq!(lines, split);
});
