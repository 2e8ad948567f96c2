//! Newline framing for the receive side.
//!
//! Bytes are appended as they arrive; [`LineBuffer::next_line`] detaches one
//! complete line at a time and keeps any trailing fragment for later.

use bytes::BytesMut;

/// Longest unterminated fragment kept while waiting for its `\n`.
pub const MAX_LINE_LEN: usize = 8192;

/// Receive buffer that yields `\n`-terminated lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: BytesMut,
    /// Index of next byte to check for newline
    next_index: usize,
    /// Set while the rest of an overlong line is being thrown away.
    skipping: bool,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw buffer, for reading from a socket straight into it.
    pub fn buf_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Detach the next complete line, without its `\n` or `\r\n`.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn next_line(&mut self) -> Option<String> {
        let mut line = loop {
            let Some(offset) = self.buf[self.next_index..].iter().position(|b| *b == b'\n')
            else {
                self.next_index = self.buf.len();
                return None;
            };

            let line = self.buf.split_to(self.next_index + offset + 1);
            self.next_index = 0;
            if !self.skipping {
                break line;
            }
            self.skipping = false;
        };
        line.truncate(line.len() - 1);
        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }

        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// Drop an unterminated fragment longer than [`MAX_LINE_LEN`].
    ///
    /// Only acts once every complete line has been taken. The rest of the
    /// dropped line is discarded up to its `\n` as it arrives. Returns the
    /// number of bytes dropped.
    pub fn trim_overlong(&mut self) -> usize {
        if self.has_line() || (!self.skipping && self.buf.len() <= MAX_LINE_LEN) {
            return 0;
        }
        let dropped = self.buf.len();
        self.clear();
        self.skipping = true;
        dropped
    }

    /// Whether a complete line is buffered.
    pub fn has_line(&self) -> bool {
        self.buf.contains(&b'\n')
    }

    /// Bytes buffered, including any partial line.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.next_index = 0;
        self.skipping = false;
    }
}
