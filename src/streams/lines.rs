//! Line splitting for encoder diagnostic output
//!
//! The encoder redraws its status line with carriage returns, so lines end at
//! either `\r` or `\n`. Blank lines are skipped.

use std::collections::VecDeque;
use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};

const READ_CHUNK: usize = 4096;

/// Async reader yielding diagnostic lines
pub struct DiagnosticLines<R> {
    reader: R,
    pending: Vec<u8>,
    eof: bool,
}

impl<R: AsyncRead + Unpin> DiagnosticLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::with_capacity(READ_CHUNK),
            eof: false,
        }
    }

    /// Next non-blank line, or `None` at end of stream
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(pos) = self.pending.iter().position(|b| *b == b'\n' || *b == b'\r') {
                let raw: Vec<u8> = self.pending.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&raw[..raw.len() - 1]).into_owned();
                if line.trim().is_empty() {
                    continue;
                }
                return Ok(Some(line));
            }

            if self.eof {
                if self.pending.is_empty() {
                    return Ok(None);
                }
                let raw = std::mem::take(&mut self.pending);
                let line = String::from_utf8_lossy(&raw).into_owned();
                return Ok(if line.trim().is_empty() { None } else { Some(line) });
            }

            let n = self.reader.read(&mut chunk).await?;
            if n == 0 {
                self.eof = true;
            } else {
                self.pending.extend_from_slice(&chunk[..n]);
            }
        }
    }
}

/// Drain a diagnostic stream into one string
pub async fn read_all_text<R: AsyncRead + Unpin>(mut reader: R) -> io::Result<String> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Keeps the last few diagnostic lines for error reports
#[derive(Debug, Clone)]
pub struct DiagnosticTail {
    lines: VecDeque<String>,
    capacity: usize,
}

impl DiagnosticTail {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, line: &str) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.trim().to_string());
    }

    /// Most recent line, usually the encoder's own error summary
    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }
}

impl Default for DiagnosticTail {
    fn default() -> Self {
        Self::new(8)
    }
}
