//! Scripted transport for engine tests
//!
//! Bytes become readable either immediately ([`MockTransport::feed`]), once
//! the clock reaches a given time ([`MockTransport::at`]), or as the reply to
//! the next command written ([`MockTransport::reply`]). The clock only moves
//! when the engine pauses, one millisecond at a time.

use std::collections::VecDeque;
use std::vec::Vec;

use swarm_hal::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

#[derive(Debug, Default)]
pub struct MockTransport {
    now: u64,
    rx: VecDeque<u8>,
    timed: VecDeque<(u64, Vec<u8>)>,
    replies: VecDeque<Vec<u8>>,
    pub written: Vec<Vec<u8>>,
    pub fail_writes: bool,
    pub fail_reads: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make bytes readable now
    pub fn feed(&mut self, bytes: &[u8]) -> &mut Self {
        self.rx.extend(bytes);
        self
    }

    /// Make bytes readable once the clock reaches `at_ms`
    pub fn at(&mut self, at_ms: u64, bytes: &[u8]) -> &mut Self {
        self.timed.push_back((at_ms, bytes.to_vec()));
        self
    }

    /// Make bytes readable right after the next write
    pub fn reply(&mut self, bytes: &[u8]) -> &mut Self {
        self.replies.push_back(bytes.to_vec());
        self
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    /// Commands written so far, as text
    pub fn sent(&self) -> Vec<std::string::String> {
        self.written
            .iter()
            .map(|w| std::string::String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    fn release_due(&mut self) {
        while let Some((at, _)) = self.timed.front() {
            if *at > self.now {
                break;
            }
            if let Some((_, bytes)) = self.timed.pop_front() {
                self.rx.extend(bytes);
            }
        }
    }
}

impl Transport for MockTransport {
    type Error = MockError;

    fn bytes_available(&mut self) -> Result<usize, MockError> {
        if self.fail_reads {
            return Err(MockError);
        }
        self.release_due();
        Ok(self.rx.len())
    }

    fn read_byte(&mut self) -> Result<u8, MockError> {
        self.rx.pop_front().ok_or(MockError)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), MockError> {
        if self.fail_writes {
            return Err(MockError);
        }
        self.written.push(bytes.to_vec());
        if let Some(reply) = self.replies.pop_front() {
            self.rx.extend(reply);
        }
        Ok(())
    }

    fn now_millis(&mut self) -> u64 {
        self.now
    }

    fn pause(&mut self) {
        self.now += 1;
    }
}

/// Encode a line with a correct checksum, terminator included
pub fn line(body: &str) -> Vec<u8> {
    let checksum = body.bytes().fold(0u8, |acc, b| acc ^ b);
    std::format!("${}*{:02X}\n", body, checksum).into_bytes()
}
