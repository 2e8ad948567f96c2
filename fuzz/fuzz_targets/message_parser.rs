//! Fuzz target for line parsing and everything downstream of it.
//!
//! Parsed lines are also fed to a state tracker, so mode and NAMES handling
//! see arbitrary parameters too.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_client::line::LineBuffer;
use slirc_client::state::Tracker;
use slirc_client::Message;

fuzz_target!(|data: &[u8]| {
    let mut buf = LineBuffer::new();
    buf.extend_from_slice(data);
    buf.extend_from_slice(b"\n");

    let mut tracker = Tracker::new();
    while let Some(line) = buf.next_line() {
        // Should never panic
        if let Ok(msg) = Message::parse(&line) {
            let _ = tracker.feed("me", &msg);
        }
    }
});
